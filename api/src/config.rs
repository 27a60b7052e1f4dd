//! Layered configuration loading for the server binary
//!
//! Sources, lowest to highest precedence:
//!
//! 1. Presets for the detected environment plus the plain environment
//!    variables read by [`AppConfig::from_env`]
//! 2. An optional TOML file named by `Environment::config_file`
//! 3. `RUO__`-prefixed variables addressing nested keys, e.g.
//!    `RUO__OTP__LENGTH=8` or `RUO__STORE__BACKEND=external`

use anyhow::Context;
use config::{Config, Environment, File};

use ro_shared::AppConfig;

/// Prefix of the nested-key environment overrides
pub const ENV_PREFIX: &str = "RUO";

/// Load and validate the application configuration
pub fn load_config() -> anyhow::Result<AppConfig> {
    let base = AppConfig::from_env();
    let file = base.environment.config_file().to_string();

    let config = layer(base, Some(&file))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Apply the file and prefixed-env layers on top of `base`
pub fn layer(base: AppConfig, file: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut builder = Config::builder()
        .add_source(Config::try_from(&base).context("Failed to serialize base configuration")?);

    if let Some(file) = file {
        builder = builder.add_source(File::with_name(file).required(false));
    }

    builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to load configuration")?
        .try_deserialize::<AppConfig>()
        .context("Failed to parse configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ro_shared::StoreBackend;

    #[test]
    fn test_layer_keeps_base_values() {
        let mut base = AppConfig::development();
        base.otp.length = 8;
        base.store.backend = StoreBackend::External;

        let config = layer(base, None).unwrap();
        assert_eq!(config.otp.length, 8);
        assert_eq!(config.store.backend, StoreBackend::External);
        assert_eq!(config.rate_limit.quota, 6);
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let config = layer(AppConfig::default(), Some("does-not-exist.toml")).unwrap();
        assert!(config.validate().is_ok());
    }
}
