//! Studio configuration module.
//!
//! Handles loading, validating, and merging `studio.toml`. Stock defaults
//! are overridden by whatever the user's file specifies; everything else
//! keeps its default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [generator]
//! output_path = "dist"               # Where generated files are written
//! base_url = "http://localhost:3000" # Absolute URL used for sitemap and canonical links
//! environment = "production"         # development | staging | production
//! debug = false                      # Dump the in-memory log next to the output
//!
//! [options]
//! parallel = true      # Render blocks on a worker pool
//! # workers = 4        # Max workers (omit for auto = CPU cores)
//! cache = true         # Memoize renders and skip rewriting unchanged files
//! verbose = false      # Log every block render
//! dry_run = false      # Compute everything, write nothing
//!
//! [logging]
//! max_entries = 1000   # Ring buffer capacity (oldest evicted first)
//! level = "info"       # debug | info | warn | error
//!
//! [theme]
//! radius = "0.5rem"
//!
//! [theme.colors]
//! primary = "#2563eb"
//! secondary = "#7c3aed"
//! accent = "#f59e0b"
//! background = "#ffffff"
//! text = "#111827"
//! muted = "#6b7280"
//! border = "#e5e7eb"
//!
//! [theme.fonts]
//! heading = "Inter, system-ui, sans-serif"
//! body = "Inter, system-ui, sans-serif"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [theme.colors]
//! primary = "#0f766e"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::escape::is_safe_css_value;
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum::{Display, EnumString};
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

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "studio.toml";

/// Studio configuration loaded from `studio.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Where and for whom the site is generated.
    pub generator: GeneratorConfig,
    /// Generator behavior switches.
    pub options: GeneratorOptions,
    /// In-memory log settings.
    pub logging: LoggingConfig,
    /// Site-wide theme; projects may override it with their branding.
    pub theme: ThemeConfig,
}

impl StudioConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator.output_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "generator.output_path must not be empty".into(),
            ));
        }
        if !self.generator.base_url.starts_with("http://")
            && !self.generator.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(
                "generator.base_url must start with http:// or https://".into(),
            ));
        }
        if self.options.workers == Some(0) {
            return Err(ConfigError::Validation(
                "options.workers must be at least 1".into(),
            ));
        }
        if self.logging.max_entries == 0 {
            return Err(ConfigError::Validation(
                "logging.max_entries must be at least 1".into(),
            ));
        }
        if let Some((key, value)) = self.theme.invalid_values().into_iter().next() {
            return Err(ConfigError::Validation(format!(
                "theme.{key} is not a valid CSS value: {value:?}"
            )));
        }
        Ok(())
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

/// Output location and deployment target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(alias = "outputPath")]
    pub output_path: String,
    /// Absolute site URL without trailing slash.
    #[serde(alias = "baseUrl")]
    pub base_url: String,
    pub environment: Environment,
    /// Write the in-memory log to `studio-log.json` in the output directory.
    pub debug: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_path: "dist".to_string(),
            base_url: "http://localhost:3000".to_string(),
            environment: Environment::Production,
            debug: false,
        }
    }
}

impl GeneratorConfig {
    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Generator behavior switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorOptions {
    /// Render blocks on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Maximum number of render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub workers: Option<usize>,
    /// Memoize identical renders and skip rewriting unchanged files.
    pub cache: bool,
    /// Log every block render at info level.
    pub verbose: bool,
    /// Compute files and metrics without touching the output directory.
    #[serde(alias = "dryRun")]
    pub dry_run: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            workers: None,
            cache: true,
            verbose: false,
            dry_run: false,
        }
    }
}

/// Resolve the effective worker count.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(workers: Option<usize>) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    workers.map(|n| n.clamp(1, cores)).unwrap_or(cores)
}

/// In-memory log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Ring buffer capacity; oldest entries are evicted first.
    pub max_entries: usize,
    /// Entries below this level are dropped.
    pub level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            level: LogLevel::Info,
        }
    }
}

/// Site theme: colors, fonts, corner radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub colors: ThemeColors,
    pub fonts: ThemeFonts,
    /// Base corner radius (CSS length).
    pub radius: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            colors: ThemeColors::default(),
            fonts: ThemeFonts::default(),
            radius: "0.5rem".to_string(),
        }
    }
}

impl ThemeConfig {
    /// Layer sparse JSON overrides (a project's branding) over this theme.
    pub fn with_overrides(&self, overrides: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let base = serde_json::to_value(self)?;
        serde_json::from_value(merge_json(base, overrides.clone()))
    }

    /// Every `(key, value)` that cannot be embedded in CSS safely.
    pub fn invalid_values(&self) -> Vec<(&'static str, String)> {
        let c = &self.colors;
        let candidates = [
            ("colors.primary", &c.primary),
            ("colors.secondary", &c.secondary),
            ("colors.accent", &c.accent),
            ("colors.background", &c.background),
            ("colors.text", &c.text),
            ("colors.muted", &c.muted),
            ("colors.border", &c.border),
            ("fonts.heading", &self.fonts.heading),
            ("fonts.body", &self.fonts.body),
            ("radius", &self.radius),
        ];
        candidates
            .into_iter()
            .filter(|(_, v)| !is_safe_css_value(v))
            .map(|(k, v)| (k, v.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
    /// Secondary text: subtitles, captions, footer.
    pub muted: String,
    pub border: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: "#2563eb".to_string(),
            secondary: "#7c3aed".to_string(),
            accent: "#f59e0b".to_string(),
            background: "#ffffff".to_string(),
            text: "#111827".to_string(),
            muted: "#6b7280".to_string(),
            border: "#e5e7eb".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeFonts {
    pub heading: String,
    pub body: String,
}

impl Default for ThemeFonts {
    fn default() -> Self {
        Self {
            heading: "Inter, system-ui, sans-serif".to_string(),
            body: "Inter, system-ui, sans-serif".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(StudioConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
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

/// [`merge_toml`] for JSON values: objects merge key-by-key, anything else
/// in the overlay replaces the base.
pub fn merge_json(base: serde_json::Value, overlay: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => merge_json(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StudioConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StudioConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file path.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<StudioConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `studio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Site Studio Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Generator target
# ---------------------------------------------------------------------------
[generator]
# Directory the generated site is written to.
output_path = "dist"

# Absolute URL the site is served from (used in sitemap.xml and canonical links).
base_url = "http://localhost:3000"

# development | staging | production
# Non-production builds emit a robots.txt that disallows crawling.
environment = "production"

# Write the in-memory log to studio-log.json in the output directory.
debug = false

# ---------------------------------------------------------------------------
# Generator behavior
# ---------------------------------------------------------------------------
[options]
# Render blocks on a worker pool.
parallel = true

# Maximum render workers. Omit to auto-detect (= number of CPU cores).
# workers = 4

# Memoize identical block renders and skip rewriting unchanged files.
cache = true

# Log every block render.
verbose = false

# Compute files and metrics without writing anything.
dry_run = false

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# Ring buffer capacity. Oldest entries are evicted first.
max_entries = 1000

# debug | info | warn | error
level = "info"

# ---------------------------------------------------------------------------
# Theme (projects can override with their branding)
# ---------------------------------------------------------------------------
[theme]
radius = "0.5rem"

[theme.colors]
primary = "#2563eb"
secondary = "#7c3aed"
accent = "#f59e0b"
background = "#ffffff"
text = "#111827"
muted = "#6b7280"      # Subtitles, captions, footer
border = "#e5e7eb"

[theme.fonts]
heading = "Inter, system-ui, sans-serif"
body = "Inter, system-ui, sans-serif"
"##
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --color-primary: {primary};
    --color-secondary: {secondary};
    --color-accent: {accent};
    --color-background: {background};
    --color-text: {text};
    --color-muted: {muted};
    --color-border: {border};
    --font-heading: {heading};
    --font-body: {body};
    --radius: {radius};
}}"#,
        primary = theme.colors.primary,
        secondary = theme.colors.secondary,
        accent = theme.colors.accent,
        background = theme.colors.background,
        text = theme.colors.text,
        muted = theme.colors.muted,
        border = theme.colors.border,
        heading = theme.fonts.heading,
        body = theme.fonts.body,
        radius = theme.radius,
    )
}
