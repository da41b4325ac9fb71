//! # CLI Configuration
//!
//! Settings shared by every subcommand.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --locale fr-FR --divisor 5 --mode random --seed 42                 │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     COINAGE_LOCALE, COINAGE_DIVISOR, COINAGE_MODE,                     │
//! │     COINAGE_SEED, COINAGE_MAX_CHANGE                                   │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/coinage/coinage.toml (Linux)                             │
//! │     ~/Library/Application Support/com.coinage.coinage/coinage.toml     │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     en-US, divisor 3, mode auto                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # coinage.toml
//! locale = "en-US"
//! divisor = 3
//! mode = "auto"                    # auto | optimal | random
//! max_change_minor_units = 10000000
//! seed = 42                        # omit for a fresh seed every run
//! divisor_scope = "all"            # or { at_least = 100 }
//! ```

use std::path::{Path, PathBuf};

use coinage_core::{
    DenominationCatalog, DivisorScope, EngineSettings, ModePolicy, DEFAULT_DIVISOR,
    DEFAULT_LOCALE, MAX_CHANGE_MINOR_UNITS,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// Config Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Hard ceiling for `max_change_minor_units`.
///
/// The optimal DP holds six bytes per minor unit, so this caps a single
/// table at roughly 600 MB.
pub const MAX_CONFIGURABLE_CHANGE: i64 = 100_000_000;

// =============================================================================
// Coinage Configuration
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoinageConfig {
    /// Locale used when none is given on the command line.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Random-mode divisor.
    #[serde(default = "default_divisor")]
    pub divisor: i64,

    #[serde(default)]
    pub mode: ModePolicy,

    /// Ceiling on change the optimal DP will handle.
    #[serde(default = "default_max_change")]
    pub max_change_minor_units: i64,

    /// Fixed RNG seed. `None` draws a fresh seed from the OS per run.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub divisor_scope: DivisorScope,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_divisor() -> i64 {
    DEFAULT_DIVISOR
}

fn default_max_change() -> i64 {
    MAX_CHANGE_MINOR_UNITS
}

impl Default for CoinageConfig {
    fn default() -> Self {
        CoinageConfig {
            locale: default_locale(),
            divisor: default_divisor(),
            mode: ModePolicy::default(),
            max_change_minor_units: default_max_change(),
            seed: None,
            divisor_scope: DivisorScope::default(),
        }
    }
}

/// Per-invocation overrides taken from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub locale: Option<String>,
    pub divisor: Option<i64>,
    pub mode: Option<ModePolicy>,
    pub seed: Option<u64>,
}

impl CoinageConfig {
    /// Loads configuration from every source, then validates the result.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (coinage.toml)
    /// 3. Environment variables
    /// 4. Command-line flags
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// file in the platform directory just means defaults.
    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.with_overrides(overrides)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `COINAGE_*` overrides read through `lookup`.
    ///
    /// Unparseable numeric or mode values are logged and ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(locale) = lookup("COINAGE_LOCALE") {
            debug!(locale = %locale, "Overriding locale from environment");
            self.locale = locale;
        }

        if let Some(divisor) = lookup("COINAGE_DIVISOR") {
            match divisor.trim().parse::<i64>() {
                Ok(d) => self.divisor = d,
                Err(_) => warn!(value = %divisor, "Ignoring non-numeric COINAGE_DIVISOR"),
            }
        }

        if let Some(mode) = lookup("COINAGE_MODE") {
            match mode.parse::<ModePolicy>() {
                Ok(m) => self.mode = m,
                Err(e) => warn!(error = %e, "Ignoring COINAGE_MODE"),
            }
        }

        if let Some(seed) = lookup("COINAGE_SEED") {
            match seed.trim().parse::<u64>() {
                Ok(s) => self.seed = Some(s),
                Err(_) => warn!(value = %seed, "Ignoring non-numeric COINAGE_SEED"),
            }
        }

        if let Some(max) = lookup("COINAGE_MAX_CHANGE") {
            match max.trim().parse::<i64>() {
                Ok(m) => self.max_change_minor_units = m,
                Err(_) => warn!(value = %max, "Ignoring non-numeric COINAGE_MAX_CHANGE"),
            }
        }
    }

    /// Applies command-line flags and re-validates.
    pub fn with_overrides(mut self, overrides: Overrides) -> ConfigResult<Self> {
        if let Some(locale) = overrides.locale {
            self.locale = locale;
        }
        if let Some(divisor) = overrides.divisor {
            self.divisor = divisor;
        }
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.divisor < 1 {
            return Err(ConfigError::Invalid(format!(
                "divisor must be at least 1, got {}",
                self.divisor
            )));
        }

        if self.max_change_minor_units <= 0
            || self.max_change_minor_units > MAX_CONFIGURABLE_CHANGE
        {
            return Err(ConfigError::Invalid(format!(
                "max_change_minor_units must be between 1 and {}, got {}",
                MAX_CONFIGURABLE_CHANGE, self.max_change_minor_units
            )));
        }

        let catalog = DenominationCatalog::builtin();
        if catalog.locale(&self.locale).is_err() {
            return Err(ConfigError::Invalid(format!(
                "unsupported locale '{}'. Valid options: {}",
                self.locale,
                catalog.locale_ids().join(", ")
            )));
        }

        Ok(())
    }

    /// Engine settings derived from this config.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            max_change_minor_units: self.max_change_minor_units,
            divisor_scope: self.divisor_scope,
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "coinage", "coinage")
            .map(|dirs| dirs.config_dir().join("coinage.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CoinageConfig::default();
        assert_eq!(config.locale, "en-US");
        assert_eq!(config.divisor, 3);
        assert_eq!(config.mode, ModePolicy::Auto);
        assert_eq!(config.max_change_minor_units, 10_000_000);
        assert_eq!(config.seed, None);
        assert_eq!(config.divisor_scope, DivisorScope::All);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
locale = "fr-FR"
divisor = 5
mode = "random"
seed = 42
divisor_scope = {{ at_least = 100 }}
"#
        )
        .unwrap();

        let config = CoinageConfig::from_file(file.path()).unwrap();
        assert_eq!(config.locale, "fr-FR");
        assert_eq!(config.divisor, 5);
        assert_eq!(config.mode, ModePolicy::Random);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.divisor_scope, DivisorScope::AtLeast(100));
        assert_eq!(config.max_change_minor_units, 10_000_000);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = CoinageConfig::from_file(file.path()).unwrap();
        assert_eq!(config, CoinageConfig::default());
    }

    #[test]
    fn test_bad_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "divisor = \"three\"").unwrap();
        assert!(matches!(
            CoinageConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));

        let missing = tempfile::tempdir().unwrap().path().join("nope.toml");
        assert!(matches!(
            CoinageConfig::load(Some(&missing), Overrides::default()),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CoinageConfig::default();
        config.apply_env_overrides(env(&[
            ("COINAGE_LOCALE", "fr-FR"),
            ("COINAGE_DIVISOR", "4"),
            ("COINAGE_MODE", "optimal"),
            ("COINAGE_SEED", "7"),
            ("COINAGE_MAX_CHANGE", "5000"),
        ]));
        assert_eq!(config.locale, "fr-FR");
        assert_eq!(config.divisor, 4);
        assert_eq!(config.mode, ModePolicy::Optimal);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_change_minor_units, 5000);
    }

    #[test]
    fn test_env_max_change_above_ceiling_is_rejected() {
        let mut config = CoinageConfig::default();
        config.apply_env_overrides(env(&[("COINAGE_MAX_CHANGE", "9223372036854775807")]));
        assert_eq!(config.max_change_minor_units, i64::MAX);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_change_minor_units must be between 1 and"));
    }

    #[test]
    fn test_env_garbage_is_ignored() {
        let mut config = CoinageConfig::default();
        config.apply_env_overrides(env(&[("COINAGE_DIVISOR", "x"), ("COINAGE_MODE", "greedy")]));
        assert_eq!(config.divisor, 3);
        assert_eq!(config.mode, ModePolicy::Auto);
    }

    #[test]
    fn test_overrides_win_and_revalidate() {
        let config = CoinageConfig::default()
            .with_overrides(Overrides {
                locale: Some("fr-FR".to_string()),
                divisor: Some(2),
                mode: Some(ModePolicy::Random),
                seed: Some(1),
            })
            .unwrap();
        assert_eq!(config.locale, "fr-FR");
        assert_eq!(config.divisor, 2);
        assert_eq!(config.seed, Some(1));

        let err = CoinageConfig::default()
            .with_overrides(Overrides {
                divisor: Some(0),
                ..Overrides::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("divisor must be at least 1"));
    }

    #[test]
    fn test_validation() {
        let mut config = CoinageConfig::default();
        config.locale = "de-DE".to_string();
        assert!(config.validate().is_err());

        let mut config = CoinageConfig::default();
        config.max_change_minor_units = 0;
        assert!(config.validate().is_err());

        let mut config = CoinageConfig::default();
        config.max_change_minor_units = MAX_CONFIGURABLE_CHANGE;
        assert!(config.validate().is_ok());
        config.max_change_minor_units = MAX_CONFIGURABLE_CHANGE + 1;
        assert!(config.validate().is_err());
    }
}
