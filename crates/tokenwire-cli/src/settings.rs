//! Settings loading
//!
//! Settings are layered: built-in defaults, then an optional configuration file
//! (format chosen by extension), then `TOKENWIRE_*` environment variables with
//! `__` separating nested keys, e.g. `TOKENWIRE_CODEC__REALM=api`.

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tokenwire::{CodecConfig, TokenCodec};

use crate::error::CliResult;

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "TOKENWIRE";

/// CLI settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Token codec configuration
    pub codec: CodecConfig,
}

impl Settings {
    /// Load settings from `path` and the environment
    ///
    /// # Errors
    /// Fails if `path` is given but cannot be read or parsed, or if the merged
    /// codec settings do not validate.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load settings using a custom environment variable prefix
    ///
    /// # Errors
    /// See [`Settings::load`].
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> CliResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.codec.validate()?;
        tracing::debug!(
            realm = settings.codec.realm.as_deref(),
            value_bytes = settings.codec.value_bytes,
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Build the token codec for these settings
    ///
    /// # Errors
    /// Fails if the codec settings do not validate.
    pub fn codec(&self) -> CliResult<TokenCodec> {
        Ok(TokenCodec::new(self.codec.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokenwire::SchemeErrorPolicy;

    const TEST_PREFIX: &str = "TOKENWIRE_SETTINGS_UNIT_TEST";

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load_with_prefix(None, TEST_PREFIX).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[codec]\nrealm = \"api\"\nvalue_bytes = 48\nscheme_errors = \"uniform\""
        )
        .unwrap();

        let settings = Settings::load_with_prefix(Some(file.path()), TEST_PREFIX).unwrap();
        assert_eq!(settings.codec.realm.as_deref(), Some("api"));
        assert_eq!(settings.codec.value_bytes, 48);
        assert_eq!(settings.codec.scheme_errors, SchemeErrorPolicy::Uniform);
    }

    #[test]
    fn test_invalid_value_bytes_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"codec": {{"value_bytes": 1}}}}"#).unwrap();

        assert!(Settings::load_with_prefix(Some(file.path()), TEST_PREFIX).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(Settings::load_with_prefix(Some(&missing), TEST_PREFIX).is_err());
    }
}
