//! Field sanitizers applied before values leave the process.

/// Default limit for short text columns on the backend.
pub const DEFAULT_MAX_LENGTH: usize = 255;

/// Limit for deploy comments, sized to a large text column.
pub const COMMENT_MAX_LENGTH: usize = 21_800;

pub trait Filter {
    fn apply(&self, value: &str) -> String;
}

/// Truncates values to at most `max` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    pub max: usize,
}

impl Length {
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl Filter for Length {
    fn apply(&self, value: &str) -> String {
        match value.char_indices().nth(self.max) {
            Some((byte_index, _)) => value[..byte_index].to_string(),
            None => value.to_string(),
        }
    }
}

/// Runs `filter` over an optional value; missing values become empty strings.
pub fn process(value: Option<&str>, filter: &dyn Filter) -> String {
    match value {
        Some(value) if !value.is_empty() => filter.apply(value),
        _ => String::new(),
    }
}

pub fn truncate(value: Option<&str>, max_length: usize) -> String {
    process(value, &Length::new(max_length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_truncate_long_comment() {
        let long = "a".repeat(50_000);
        assert_eq!(truncate(Some(&long), COMMENT_MAX_LENGTH).len(), 21_800);
    }

    #[test]
    fn test_short_value_unchanged() {
        assert_eq!(truncate(Some("short"), DEFAULT_MAX_LENGTH), "short");
    }

    #[test]
    fn test_missing_value_is_empty() {
        assert_eq!(truncate(None, DEFAULT_MAX_LENGTH), "");
        assert_eq!(truncate(Some(""), DEFAULT_MAX_LENGTH), "");
    }

    #[test]
    fn test_multibyte_characters_are_not_split() {
        let value = "é".repeat(300);
        let truncated = process(Some(&value), &Length::default());
        assert_eq!(truncated.chars().count(), DEFAULT_MAX_LENGTH);
        assert_eq!(truncated.len(), DEFAULT_MAX_LENGTH * 2);
    }

    proptest! {
        #[test]
        fn prop_truncate_never_exceeds_limit(value in ".{0,400}", max in 0usize..300) {
            let truncated = truncate(Some(&value), max);
            prop_assert!(truncated.chars().count() <= max);
            prop_assert!(value.starts_with(&truncated));
        }
    }
}
