//! Settings loader
//!
//! `defaults/tagext.default.toml` is embedded into the library so that the documented
//! defaults and runtime behavior stay in sync. Applications layer their own files and
//! overrides on top via [`Loader`] before deserializing into [`Settings`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/tagext.default.toml");

/// Top-level settings consumed by the environment and the default runtime hooks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub l10n: L10nSettings,
    pub assets: AssetSettings,
    pub csrf: CsrfSettings,
}

/// Which finalizers the localization extension installs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct L10nSettings {
    /// Convert datetimes to the current timezone before output
    pub use_tz: bool,
    /// Format values with locale-aware rules before output
    pub use_l10n: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssetSettings {
    /// Prefix joined onto `{% static %}` paths by the default resolver
    pub static_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CsrfSettings {
    /// Form field name used by the default `{% csrf_token %}` renderer
    pub field_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            l10n: L10nSettings {
                use_tz: false,
                use_l10n: false,
            },
            assets: AssetSettings {
                static_url: "/static/".to_string(),
            },
            csrf: CsrfSettings {
                field_name: "csrfmiddlewaretoken".to_string(),
            },
        }
    }
}

/// Dotted keys accepted by [`Loader::set_override`]
pub const SETTING_KEYS: &[&str] = &[
    "l10n.use_tz",
    "l10n.use_l10n",
    "assets.static_url",
    "csrf.field_name",
];

/// Settings sources, lowest precedence first: the embedded defaults, TOML files in the
/// order given, then single-key overrides.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Loader {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Layer a TOML settings file, which must exist
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        let file = File::from(path.as_ref()).format(FileFormat::Toml);
        Loader {
            builder: self.builder.add_source(file),
        }
    }

    /// Override one setting. Unknown keys are rejected instead of silently ignored.
    pub fn set_override(
        self,
        key: &str,
        value: impl Into<ValueKind>,
    ) -> Result<Self, ConfigError> {
        if !SETTING_KEYS.contains(&key) {
            return Err(ConfigError::Message(format!(
                "unknown setting '{}', expected one of: {}",
                key,
                SETTING_KEYS.join(", ")
            )));
        }
        Ok(Loader {
            builder: self.builder.set_override(key, value)?,
        })
    }

    /// Apply a `key=value` assignment, as passed to `tagext --set`
    pub fn assign(self, entry: &str) -> Result<Self, ConfigError> {
        let (key, value) = entry.split_once('=').ok_or_else(|| {
            ConfigError::Message(format!("invalid override '{}', expected key=value", entry))
        })?;
        self.set_override(key.trim(), value.trim().to_string())
    }

    pub fn build(self) -> Result<Settings, ConfigError> {
        let settings: Settings = self.builder.build()?.try_deserialize()?;
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
