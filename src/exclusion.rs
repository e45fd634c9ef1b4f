//! Suppression of configured error types before they are reported.

use crate::domain::ErrorObject;
use crate::domain::error_object::{names_match, normalize_type_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Ordered list of error type names that must never be reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionList(Vec<String>);

impl ExclusionList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Registry of error kinds the host knows about.
///
/// A permissive registry treats every name as resolvable; a strict one only
/// accepts registered names, so stray exclusion entries are skipped.
#[derive(Debug, Clone, Default)]
pub struct KnownKinds {
    names: Option<BTreeSet<String>>,
}

impl KnownKinds {
    pub fn permissive() -> Self {
        Self { names: None }
    }

    pub fn strict() -> Self {
        Self {
            names: Some(BTreeSet::new()),
        }
    }

    pub fn register<E: 'static>(&mut self) -> &mut Self {
        self.register_name(std::any::type_name::<E>())
    }

    pub fn register_name(&mut self, name: &str) -> &mut Self {
        self.names
            .get_or_insert_with(BTreeSet::new)
            .insert(normalize_type_name(name));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        match &self.names {
            None => !normalize_type_name(name).is_empty(),
            Some(names) => names.iter().any(|known| names_match(known, name)),
        }
    }
}

pub fn should_skip(
    error: Option<&ErrorObject>,
    exclusions: &ExclusionList,
    known: &KnownKinds,
) -> bool {
    let Some(error) = error else {
        return false;
    };
    exclusions
        .iter()
        .any(|name| known.contains(name) && error.is_instance_of(name))
}

/// Exclusion list resolved once against a registry at startup.
#[derive(Debug, Clone, Default)]
pub struct ExclusionMatcher {
    entries: Vec<String>,
}

impl ExclusionMatcher {
    pub fn resolve(exclusions: &ExclusionList, known: &KnownKinds) -> Self {
        let mut entries = Vec::with_capacity(exclusions.len());
        for name in exclusions.iter() {
            if known.contains(name) {
                entries.push(normalize_type_name(name));
            } else {
                debug!(exclusion = name, "Skipping unknown exclusion entry");
            }
        }
        Self { entries }
    }

    pub fn should_skip(&self, error: Option<&ErrorObject>) -> bool {
        let Some(error) = error else {
            return false;
        };
        self.entries.iter().any(|name| error.is_instance_of(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AccessDenied;

    fn not_found() -> ErrorObject {
        ErrorObject::new("app::http::NotFound", "no route").with_kind("app::http::HttpError")
    }

    #[test]
    fn test_empty_exclusions_never_skip() {
        let known = KnownKinds::permissive();
        assert!(!should_skip(Some(&not_found()), &ExclusionList::default(), &known));
    }

    #[test]
    fn test_absent_error_never_skips() {
        let exclusions = ExclusionList::new(["app::http::NotFound"]);
        assert!(!should_skip(None, &exclusions, &KnownKinds::permissive()));
    }

    #[test]
    fn test_matches_type_and_declared_kind() {
        let known = KnownKinds::permissive();
        assert!(should_skip(
            Some(&not_found()),
            &ExclusionList::new(["\\app\\http\\NotFound"]),
            &known
        ));
        assert!(should_skip(
            Some(&not_found()),
            &ExclusionList::new(["other::Error", "app::http::HttpError"]),
            &known
        ));
        assert!(!should_skip(
            Some(&not_found()),
            &ExclusionList::new(["app::db::Timeout"]),
            &known
        ));
    }

    #[test]
    fn test_std_errors_match_by_public_path_only() {
        let known = KnownKinds::permissive();
        let io = ErrorObject::from_error(&std::io::Error::other("refused"));
        let fmt = ErrorObject::from_error(&std::fmt::Error);

        let generic = ExclusionList::new(["Error"]);
        assert!(!should_skip(Some(&io), &generic, &known));
        assert!(!should_skip(Some(&fmt), &generic, &known));

        let io_only = ExclusionList::new(["std::io::Error"]);
        assert!(should_skip(Some(&io), &io_only, &known));
        assert!(!should_skip(Some(&fmt), &io_only, &known));
    }

    #[test]
    fn test_strict_registry_skips_unknown_names() {
        let mut known = KnownKinds::strict();
        known.register::<AccessDenied>();

        let exclusions = ExclusionList::new(["app::http::NotFound", "AccessDenied"]);
        assert!(!should_skip(Some(&not_found()), &exclusions, &known));

        let matcher = ExclusionMatcher::resolve(&exclusions, &known);
        assert_eq!(matcher.len(), 1);

        let denied = ErrorObject::new(std::any::type_name::<AccessDenied>(), "denied");
        assert!(matcher.should_skip(Some(&denied)));
        assert!(!matcher.should_skip(Some(&not_found())));
    }
}
