use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

/// A single stack frame attached to a reported error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl Frame {
    pub fn new(filename: impl Into<String>, lineno: Option<u32>, method: Option<&str>) -> Self {
        Self {
            filename: filename.into(),
            lineno,
            method: method.map(str::to_string),
        }
    }
}

/// An error value handed to the pipeline.
///
/// Identified by its fully-qualified type name plus any additional kinds it
/// declares (trait-like names it "implements"). Exclusion matching and
/// sample rates are keyed on these names.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorObject {
    type_name: String,
    kinds: Vec<String>,
    message: String,
    trace: Option<Vec<Frame>>,
    causes: Vec<String>,
}

impl ErrorObject {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: normalize_type_name(&type_name.into()),
            kinds: Vec::new(),
            message: message.into(),
            trace: None,
            causes: Vec::new(),
        }
    }

    /// Captures the concrete type name, message and `source()` chain of an error.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: StdError + 'static,
    {
        let mut object = Self::new(std::any::type_name::<E>(), error.to_string());
        object.causes = source_chain(error);
        object
    }

    /// Builds an object from a type-erased error; the type name must be supplied.
    pub fn from_dyn_error(type_name: &str, error: &(dyn StdError + 'static)) -> Self {
        let mut object = Self::new(type_name, error.to_string());
        object.causes = source_chain(error);
        object
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kinds.push(normalize_type_name(&kind.into()));
        self
    }

    pub fn with_causes(mut self, causes: Vec<String>) -> Self {
        self.causes = causes;
        self
    }

    pub fn with_trace(mut self, frames: Vec<Frame>) -> Self {
        self.trace = Some(frames);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Last path segment of the type name, e.g. `NotFound` for `app::errors::NotFound`.
    pub fn short_name(&self) -> &str {
        last_segment(&self.type_name)
    }

    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> Option<&[Frame]> {
        self.trace.as_deref()
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// True when `name` denotes this error's type or one of its declared kinds.
    pub fn is_instance_of(&self, name: &str) -> bool {
        names_match(&self.type_name, name) || self.kinds.iter().any(|kind| names_match(kind, name))
    }
}

fn source_chain(error: &(dyn StdError + 'static)) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes
}

/// Normalises `\App\Error`, `::app::Error` and `app::Error` to `app::Error` form.
pub(crate) fn normalize_type_name(name: &str) -> String {
    name.trim()
        .replace('\\', "::")
        .trim_start_matches("::")
        .to_string()
}

fn last_segment(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Bare names too generic to identify a type; they only match exactly.
const AMBIGUOUS_NAMES: &[&str] = &["Error", "ErrorKind"];

/// `std` re-exports `core` and `alloc`, so the roots are interchangeable.
const STD_ROOTS: &[&str] = &["std", "core", "alloc"];

fn same_root(entry: &str, candidate: &str) -> bool {
    entry == candidate || (STD_ROOTS.contains(&entry) && STD_ROOTS.contains(&candidate))
}

fn is_subsequence(needle: &[&str], haystack: &[&str]) -> bool {
    let mut remaining = haystack.iter();
    needle.iter().all(|wanted| remaining.any(|segment| segment == wanted))
}

/// Whether the configured `entry` names the type `candidate`.
///
/// Exact names always match. A qualified entry also matches when it is a
/// path suffix of the candidate, or when it shares the crate root and the
/// final segment and its middle segments appear in order in the candidate's
/// path (`std::io::Error` names `std::io::error::Error`). An unqualified
/// entry matches the final segment unless it is one of `AMBIGUOUS_NAMES`.
pub(crate) fn names_match(candidate: &str, entry: &str) -> bool {
    let candidate = normalize_type_name(candidate);
    let entry = normalize_type_name(entry);
    if entry.is_empty() {
        return false;
    }
    if candidate == entry {
        return true;
    }

    let wanted: Vec<&str> = entry.split("::").collect();
    let actual: Vec<&str> = candidate.split("::").collect();
    match wanted.as_slice() {
        [name] => !AMBIGUOUS_NAMES.contains(name) && actual.last() == Some(name),
        [root, middle @ .., name] => {
            actual.ends_with(&wanted)
                || matches!(
                    actual.as_slice(),
                    [actual_root, actual_middle @ .., actual_name]
                        if same_root(root, actual_root)
                            && name == actual_name
                            && is_subsequence(middle, actual_middle)
                )
        }
        [] => false,
    }
}
