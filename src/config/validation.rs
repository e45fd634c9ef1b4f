use super::{BridgeConfig, ConfigError};
use url::Url;

impl BridgeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = &self.rollbar;

        // Validate endpoint URL
        let base = server.api_base();
        Url::parse(&base)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint URL '{base}': {e}")))?;

        if let Some(proxy) = server.proxy.as_deref().filter(|p| !p.is_empty()) {
            Url::parse(proxy)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy URL '{proxy}': {e}")))?;
        }

        // Validate timeouts
        if server.timeout == 0 {
            return Err(ConfigError::InvalidConfig(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if server.batch_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        // Validate sample rates
        let rates = server
            .exception_sample_rates
            .iter()
            .chain(server.error_sample_rates.iter());
        for (name, entry) in rates {
            if let Some(rate) = entry.rate
                && !(0.0..=1.0).contains(&rate)
            {
                return Err(ConfigError::InvalidConfig(format!(
                    "Sample rate for '{name}' must be within [0, 1], got {rate}"
                )));
            }
        }

        if self.rollbar_js.items_per_minute == 0 {
            return Err(ConfigError::InvalidConfig(
                "rollbar_js.itemsPerMinute must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
