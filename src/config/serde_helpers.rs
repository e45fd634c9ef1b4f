use serde::{Deserialize, Deserializer, Serialize};

/// Helper function to load and parse an environment variable.
/// Returns Ok(()) if the variable doesn't exist (keeps default).
pub fn load_env_var<T>(name: &str, target: &mut T) -> Result<(), super::ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(value) = std::env::var(name) {
        *target = value
            .parse()
            .map_err(|e| super::ConfigError::EnvError(format!("Invalid {name}: {e}")))?;
    }
    Ok(())
}

/// Helper function to load a string environment variable.
pub fn load_env_string(name: &str, target: &mut String) {
    if let Ok(value) = std::env::var(name) {
        *target = value;
    }
}

/// Helper function to load an optional string environment variable.
pub fn load_env_string_opt(name: &str, target: &mut Option<String>) {
    if let Ok(value) = std::env::var(name) {
        *target = Some(value);
    }
}

/// A sample rate entry, written either as `0.5` or `{ rate = 0.5 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleRate {
    pub rate: Option<f64>,
}

impl<'de> Deserialize<'de> for SampleRate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bare(f64),
            Table {
                #[serde(default)]
                rate: Option<f64>,
            },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bare(rate) => SampleRate { rate: Some(rate) },
            Raw::Table { rate } => SampleRate { rate },
        })
    }
}
