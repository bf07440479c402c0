//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The stock defaults
//! are serialized to a TOML table and the user's file is deep-merged on top of
//! it, so a config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! my-site/
//! ├── config.toml              # Site config (optional)
//! └── routes/                  # Route files (see `scan`)
//!     ├── index.toml
//!     └── blog/
//!         └── [slug].toml
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! routes_dir = "routes"       # Directory holding route files
//! route_extension = "toml"    # Extension of route files
//! title = ""                  # Site title, appended to page titles
//!
//! [i18n]
//! locales = ["en"]            # Ordered locale codes
//! default_locale = "en"
//! strategy = "except-default" # "always" | "except-default"
//!
//! [i18n.translations.en]
//! greeting = "Hello {{name}}"
//!
//! [output]
//! index_file = "index.html"   # File name appended to directory-like permalinks
//!
//! [processing]
//! max_processes = 4           # Max parallel data loaders (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding route files, relative to the project root.
    pub routes_dir: String,
    /// Extension (without the dot) that marks a file as a route file.
    pub route_extension: String,
    /// Site title, used by the default renderer.
    pub title: String,
    /// Locales, default locale, prefix strategy and translations.
    pub i18n: I18nConfig,
    /// Output file naming.
    pub output: OutputConfig,
    /// Parallel data loading settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            routes_dir: "routes".to_string(),
            route_extension: "toml".to_string(),
            title: String::new(),
            i18n: I18nConfig::default(),
            output: OutputConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.route_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Validation(
                "route_extension must not be empty".into(),
            ));
        }
        if self.i18n.locales.is_empty() {
            return Err(ConfigError::Validation(
                "i18n.locales must not be empty".into(),
            ));
        }
        for (idx, locale) in self.i18n.locales.iter().enumerate() {
            if locale.is_empty() || locale.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "i18n.locales contains an invalid locale code \"{locale}\""
                )));
            }
            if self.i18n.locales[..idx].contains(locale) {
                return Err(ConfigError::Validation(format!(
                    "i18n.locales lists \"{locale}\" more than once"
                )));
            }
        }
        if !self.i18n.locales.contains(&self.i18n.default_locale) {
            return Err(ConfigError::Validation(format!(
                "i18n.default_locale \"{}\" is not listed in i18n.locales",
                self.i18n.default_locale
            )));
        }
        if self.output.index_file.is_empty() || self.output.index_file.contains('/') {
            return Err(ConfigError::Validation(
                "output.index_file must be a plain file name".into(),
            ));
        }
        Ok(())
    }
}

/// How permalinks of localized routes are prefixed with their locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum I18nStrategy {
    /// Every locale gets a `/{locale}` prefix, the default locale included.
    #[serde(alias = "prefix")]
    Always,
    /// The default locale is served unprefixed; every other locale is prefixed.
    #[default]
    #[serde(alias = "prefix-except-default")]
    ExceptDefault,
}

/// Internationalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct I18nConfig {
    /// Ordered locale codes. Localized routes get one instance per entry.
    pub locales: Vec<String>,
    pub default_locale: String,
    pub strategy: I18nStrategy,
    /// Per-locale translation tables; nested tables form dotted keys.
    pub translations: BTreeMap<String, toml::Table>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locales: vec!["en".to_string()],
            default_locale: "en".to_string(),
            strategy: I18nStrategy::default(),
            translations: BTreeMap::new(),
        }
    }
}

/// Output file naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// File name given to directory-like permalinks (`/about/` → `/about/index.html`).
    pub index_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            index_file: "index.html".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel data-loading workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sitemill configuration
# ======================
# Every key is optional. Values shown are the defaults.

# Directory holding route files, relative to this file.
# Each file's path is its URL: routes/blog/[slug].toml → /blog/[slug]
routes_dir = "routes"

# Extension of route files (without the dot).
route_extension = "toml"

# Site title, appended to every page title by the default renderer.
title = ""

# ---------------------------------------------------------------------------
# Internationalization
# ---------------------------------------------------------------------------
[i18n]
# Ordered list of locale codes. Routes with i18n enabled (the default)
# produce one page per locale.
locales = ["en"]

# Must be one of `locales`.
default_locale = "en"

# "except-default": /about/ for the default locale, /es/about/ for others.
# "always":         every locale is prefixed, /en/about/ included.
strategy = "except-default"

# Translation tables, looked up with dotted keys from templates.
# [i18n.translations.en]
# nav = { home = "Home" }
# greeting = "Hello {{name}}"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Appended to directory-like permalinks: /about/ → /about/index.html
index_file = "index.html"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel data loaders. Omit to use every CPU core.
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_single_english_locale() {
        let config = SiteConfig::default();
        assert_eq!(config.i18n.locales, vec!["en"]);
        assert_eq!(config.i18n.default_locale, "en");
        assert_eq!(config.i18n.strategy, I18nStrategy::ExceptDefault);
    }

    #[test]
    fn default_config_paths() {
        let config = SiteConfig::default();
        assert_eq!(config.routes_dir, "routes");
        assert_eq!(config.route_extension, "toml");
        assert_eq!(config.output.index_file, "index.html");
    }

    #[test]
    fn default_config_is_valid() {
        SiteConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[i18n]
locales = ["en", "es"]
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.i18n.locales, vec!["en", "es"]);
        assert_eq!(config.i18n.default_locale, "en");
        assert_eq!(config.routes_dir, "routes");
    }

    #[test]
    fn parse_strategy_names() {
        let always: SiteConfig = toml::from_str("[i18n]\nstrategy = \"always\"").unwrap();
        assert_eq!(always.i18n.strategy, I18nStrategy::Always);

        let except: SiteConfig =
            toml::from_str("[i18n]\nstrategy = \"except-default\"").unwrap();
        assert_eq!(except.i18n.strategy, I18nStrategy::ExceptDefault);

        let alias: SiteConfig = toml::from_str("[i18n]\nstrategy = \"prefix\"").unwrap();
        assert_eq!(alias.i18n.strategy, I18nStrategy::Always);
    }

    #[test]
    fn parse_translations() {
        let toml = r#"
[i18n.translations.en]
greeting = "Hello"
nav = { home = "Home" }
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        let en = &config.i18n.translations["en"];
        assert_eq!(en["greeting"].as_str(), Some("Hello"));
        assert_eq!(en["nav"]["home"].as_str(), Some("Home"));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn default_locale_must_be_listed() {
        let mut config = SiteConfig::default();
        config.i18n.default_locale = "fr".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("\"fr\""));
    }

    #[test]
    fn empty_locales_rejected() {
        let mut config = SiteConfig::default();
        config.i18n.locales.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn duplicate_locales_rejected() {
        let mut config = SiteConfig::default();
        config.i18n.locales = vec!["en".into(), "es".into(), "en".into()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn index_file_with_slash_rejected() {
        let mut config = SiteConfig::default();
        config.output.index_file = "a/index.html".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_route_extension_rejected() {
        let mut config = SiteConfig::default();
        config.route_extension = ".".into();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Processing tests
    // =========================================================================

    #[test]
    fn default_processing_config() {
        let config = ProcessingConfig::default();
        assert_eq!(config.max_processes, None);
    }

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let threads = effective_threads(&config);
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(threads, cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_never_zero() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.i18n.locales, vec!["en"]);
        assert_eq!(config.output.index_file, "index.html");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
title = "My Site"

[i18n]
locales = ["en", "es", "fr"]
strategy = "always"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "My Site");
        assert_eq!(config.i18n.locales, vec!["en", "es", "fr"]);
        assert_eq!(config.i18n.strategy, I18nStrategy::Always);
        // Unspecified values should be defaults
        assert_eq!(config.i18n.default_locale, "en");
        assert_eq!(config.routes_dir, "routes");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_config_runs_validation() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[i18n]\nlocales = [\"es\"]\n",
        )
        .unwrap();
        // default_locale stays "en", which is no longer listed
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"title = "a""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"title = "b""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("title").unwrap().as_str(), Some("b"));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[i18n]
locales = ["en"]
default_locale = "en"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[i18n]
locales = ["en", "es"]
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let i18n = merged.get("i18n").unwrap();
        // arrays are replaced, not concatenated
        assert_eq!(i18n.get("locales").unwrap().as_array().unwrap().len(), 2);
        assert_eq!(i18n.get("default_locale").unwrap().as_str(), Some("en"));
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r#"
[i18n.translations.en]
home = "Home"
about = "About"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[i18n.translations.en]
home = "Start"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let en = &merged["i18n"]["translations"]["en"];
        assert_eq!(en.get("home").unwrap().as_str(), Some("Start"));
        assert_eq!(en.get("about").unwrap().as_str(), Some("About"));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[i18n]
locale = ["en"]
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[outputs]\nindex_file = \"a\"");
        assert!(result.is_err());
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.routes_dir, SiteConfig::default().routes_dir);
        assert_eq!(config.i18n.strategy, I18nStrategy::ExceptDefault);
    }

    #[test]
    fn stock_defaults_roundtrip() {
        let config = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(config.i18n.locales, vec!["en"]);
    }
}
