//! Capabilities the host can plug into the notifier.
//!
//! Configuration refers to providers by name (`person_fn`, `check_ignore`);
//! the names are resolved once against a [`Providers`] registry built by the
//! host. A name that does not resolve leaves the feature disabled.

use crate::domain::ReportPayload;
use crate::domain::error_object::normalize_type_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// The user affected by a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

pub trait PersonProvider: Send + Sync {
    fn person(&self) -> Option<Person>;
}

impl<F> PersonProvider for F
where
    F: Fn() -> Option<Person> + Send + Sync,
{
    fn person(&self) -> Option<Person> {
        self()
    }
}

/// Last-chance veto over a report; returning `true` drops it.
pub trait CheckIgnore: Send + Sync {
    fn check_ignore(&self, is_uncaught: bool, payload: &ReportPayload) -> bool;
}

impl<F> CheckIgnore for F
where
    F: Fn(bool, &ReportPayload) -> bool + Send + Sync,
{
    fn check_ignore(&self, is_uncaught: bool, payload: &ReportPayload) -> bool {
        self(is_uncaught, payload)
    }
}

#[derive(Clone, Default)]
pub struct Providers {
    persons: HashMap<String, Arc<dyn PersonProvider>>,
    check_ignores: HashMap<String, Arc<dyn CheckIgnore>>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_person_provider(
        mut self,
        name: &str,
        provider: impl PersonProvider + 'static,
    ) -> Self {
        self.persons
            .insert(normalize_type_name(name), Arc::new(provider));
        self
    }

    pub fn with_check_ignore(mut self, name: &str, policy: impl CheckIgnore + 'static) -> Self {
        self.check_ignores
            .insert(normalize_type_name(name), Arc::new(policy));
        self
    }

    pub fn resolve_person(&self, name: Option<&str>) -> Option<Arc<dyn PersonProvider>> {
        let name = name.filter(|n| !n.trim().is_empty())?;
        let resolved = self.persons.get(&normalize_type_name(name)).cloned();
        if resolved.is_none() {
            warn!(person_fn = name, "Person provider not registered, person data disabled");
        }
        resolved
    }

    pub fn resolve_check_ignore(&self, name: Option<&str>) -> Option<Arc<dyn CheckIgnore>> {
        let name = name.filter(|n| !n.trim().is_empty())?;
        let resolved = self.check_ignores.get(&normalize_type_name(name)).cloned();
        if resolved.is_none() {
            warn!(check_ignore = name, "Check-ignore policy not registered, policy disabled");
        }
        resolved
    }
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Providers")
            .field("persons", &self.persons.keys().collect::<Vec<_>>())
            .field("check_ignores", &self.check_ignores.keys().collect::<Vec<_>>())
            .finish()
    }
}
