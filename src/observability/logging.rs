//! Structured logging configuration.

use std::path::PathBuf;

use crate::config::LoggingSettings;

/// Default filter when neither settings nor `RUST_LOG` provide one.
const DEFAULT_FILTER: &str = "info";

/// Filter used for `--verbose`.
const VERBOSE_FILTER: &str = "monitoring_synth=debug,info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format name. Unknown names fall back to pretty output.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directives.
    pub filter: String,
    /// Optional file to append logs to.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: DEFAULT_FILTER.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from config settings with env overrides.
    ///
    /// Precedence, lowest first: defaults, config file, `--verbose`,
    /// `MONITORING_SYNTH_LOG_FORMAT` / `MONITORING_SYNTH_LOG_FILE` / `RUST_LOG`.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::resolve(settings, verbose, |key| std::env::var(key).ok())
    }

    fn resolve(
        settings: Option<&LoggingSettings>,
        verbose: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = Self::default();

        if let Some(settings) = settings {
            if let Some(format) = settings.format.as_deref() {
                config.format = LogFormat::parse(format);
            }
            if let Some(filter) = settings.filter.as_deref().filter(|f| !f.trim().is_empty()) {
                config.filter = filter.to_string();
            }
            if let Some(file) = settings.file.as_deref().filter(|f| !f.trim().is_empty()) {
                config.file = Some(PathBuf::from(file));
            }
        }

        if verbose {
            config.filter = VERBOSE_FILTER.to_string();
        }

        apply_env_overrides(&mut config, lookup);
        config
    }
}

fn apply_env_overrides(config: &mut LoggingConfig, lookup: impl Fn(&str) -> Option<String>) {
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(format) = lookup("MONITORING_SYNTH_LOG_FORMAT") {
        config.format = LogFormat::parse(&format);
    }
    if let Some(file) = lookup("MONITORING_SYNTH_LOG_FILE") {
        config.file = Some(PathBuf::from(file));
    }
    if let Some(filter) = lookup("RUST_LOG") {
        config.filter = filter;
    }
}
