use super::error::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Host log severity, ordered from least to most severe.
///
/// This is distinct from `app::LogLevel` (used for configuring the bridge's own
/// tracing output). `Severity` is the level attached to reported log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Severity {
    pub const ALL: [Severity; 8] = [
        Severity::Debug,
        Severity::Info,
        Severity::Notice,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
        Severity::Alert,
        Severity::Emergency,
    ];

    /// Numeric code as used by PSR-3 style loggers (100..=600).
    pub fn code(self) -> u16 {
        match self {
            Severity::Debug => 100,
            Severity::Info => 200,
            Severity::Notice => 250,
            Severity::Warning => 300,
            Severity::Error => 400,
            Severity::Critical => 500,
            Severity::Alert => 550,
            Severity::Emergency => 600,
        }
    }

    /// Upper-case level name, preserved verbatim in reports.
    pub fn name(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Alert => "ALERT",
            Severity::Emergency => "EMERGENCY",
        }
    }

    pub fn from_code(code: u16) -> Result<Self, BridgeError> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.code() == code)
            .ok_or_else(|| BridgeError::Config(format!("Unknown severity code: {code}")))
    }

    pub fn from_name(name: &str) -> Result<Self, BridgeError> {
        let trimmed = name.trim();
        Self::ALL
            .into_iter()
            .find(|severity| severity.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| BridgeError::Config(format!("Unknown severity: {name}")))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Severity {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Backend severity level of a report item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Notice => "notice",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
            Level::Alert => "alert",
            Level::Emergency => "emergency",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn map_level(severity: Severity) -> Level {
    match severity {
        Severity::Debug => Level::Debug,
        Severity::Info => Level::Info,
        Severity::Notice => Level::Notice,
        Severity::Warning => Level::Warning,
        Severity::Error => Level::Error,
        Severity::Critical => Level::Critical,
        Severity::Alert => Level::Alert,
        Severity::Emergency => Level::Emergency,
    }
}

/// Maps a raw numeric severity code, rejecting codes outside the known set.
pub fn map_level_code(code: u16) -> Result<Level, BridgeError> {
    Severity::from_code(code).map(map_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_map_level_is_injective() {
        let mapped: HashSet<Level> = Severity::ALL.into_iter().map(map_level).collect();
        assert_eq!(mapped.len(), Severity::ALL.len());
    }

    #[test]
    fn test_map_level_keeps_names() {
        for severity in Severity::ALL {
            assert_eq!(
                map_level(severity).as_str(),
                severity.name().to_lowercase()
            );
        }
    }

    #[test]
    fn test_unknown_code_is_configuration_error() {
        let err = map_level_code(450).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
        assert_eq!(map_level_code(550).unwrap(), Level::Alert);
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(Severity::from_name("critical").unwrap(), Severity::Critical);
        assert_eq!(" Warning ".parse::<Severity>().unwrap(), Severity::Warning);
        assert!(Severity::from_name("fatal").is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Emergency > Severity::Alert);
        assert!(Severity::Debug < Severity::Info);
    }
}
