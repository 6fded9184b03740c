//! Configuration management.
//!
//! Configuration covers the fallback values used when a `Monitoring`
//! resource leaves a field unset, and logging. The reserved exporter names
//! are fixed and deliberately not configurable.

use serde::Deserialize;
use std::path::Path;

/// Main configuration for monitoring synth.
#[derive(Debug, Clone, Default)]
pub struct SynthConfig {
    /// Fallback template values.
    pub defaults: TemplateDefaults,
    /// Logging settings from the config file.
    pub logging: LoggingSettings,
}

/// Fallback values for template keys the resource does not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDefaults {
    /// Metrics backend replicas.
    pub replicas: i64,
    /// Metrics storage volume size.
    pub storage_size: String,
    /// Metrics retention period.
    pub storage_retention: String,
    /// Metrics backend CPU limit.
    pub cpu_limit: String,
    /// Metrics backend memory limit.
    pub memory_limit: String,
    /// Metrics backend CPU request.
    pub cpu_request: String,
    /// Metrics backend memory request.
    pub memory_request: String,
    /// Trace storage backend.
    pub traces_backend: String,
    /// Trace retention period.
    pub traces_retention: String,
    /// Trace sampling ratio.
    pub sample_ratio: String,
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self {
            replicas: 2,
            storage_size: "5Gi".to_string(),
            storage_retention: "90d".to_string(),
            cpu_limit: "500m".to_string(),
            memory_limit: "512Mi".to_string(),
            cpu_request: "100m".to_string(),
            memory_request: "256Mi".to_string(),
            traces_backend: "pv".to_string(),
            traces_retention: "2160h".to_string(),
            sample_ratio: "0.1".to_string(),
        }
    }
}

/// Logging section of the config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directives, e.g. `monitoring_synth=debug`.
    pub filter: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Template defaults.
    pub defaults: Option<ConfigFileDefaults>,
    /// Logging configuration.
    pub logging: Option<LoggingSettings>,
}

/// Defaults section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileDefaults {
    /// Replicas.
    pub replicas: Option<i64>,
    /// Storage size.
    pub storage_size: Option<String>,
    /// Storage retention.
    pub storage_retention: Option<String>,
    /// CPU limit.
    pub cpu_limit: Option<String>,
    /// Memory limit.
    pub memory_limit: Option<String>,
    /// CPU request.
    pub cpu_request: Option<String>,
    /// Memory request.
    pub memory_request: Option<String>,
    /// Traces backend.
    pub traces_backend: Option<String>,
    /// Traces retention.
    pub traces_retention: Option<String>,
    /// Sample ratio.
    pub sample_ratio: Option<String>,
}

impl SynthConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/monitoring-synth/` on macOS)
    /// 2. XDG config dir (`~/.config/monitoring-synth/`)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs
                .config_dir()
                .join("monitoring-synth")
                .join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("monitoring-synth")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|path| path.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                },
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `SynthConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(defaults) = file.defaults {
            let target = &mut config.defaults;
            if let Some(v) = defaults.replicas {
                target.replicas = v;
            }
            let string_fields = [
                (defaults.storage_size, &mut target.storage_size),
                (defaults.storage_retention, &mut target.storage_retention),
                (defaults.cpu_limit, &mut target.cpu_limit),
                (defaults.memory_limit, &mut target.memory_limit),
                (defaults.cpu_request, &mut target.cpu_request),
                (defaults.memory_request, &mut target.memory_request),
                (defaults.traces_backend, &mut target.traces_backend),
                (defaults.traces_retention, &mut target.traces_retention),
                (defaults.sample_ratio, &mut target.sample_ratio),
            ];
            for (value, slot) in string_fields {
                if let Some(value) = value {
                    *slot = value;
                }
            }
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SynthConfig::new();
        assert_eq!(config.defaults.replicas, 2);
        assert_eq!(config.defaults.storage_size, "5Gi");
        assert_eq!(config.defaults.sample_ratio, "0.1");
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_from_toml_partial_override() {
        let config = SynthConfig::from_toml(
            r#"
[defaults]
replicas = 3
storage_retention = "30d"

[logging]
format = "json"
"#,
        )
        .unwrap();

        assert_eq!(config.defaults.replicas, 3);
        assert_eq!(config.defaults.storage_retention, "30d");
        assert_eq!(config.defaults.storage_size, "5Gi");
        assert_eq!(config.logging.format.as_deref(), Some("json"));
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_from_toml_empty() {
        let config = SynthConfig::from_toml("").unwrap();
        assert_eq!(config.defaults, TemplateDefaults::default());
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let err = SynthConfig::from_toml("[defaults]\nreplicas = \"three\"\n").unwrap_err();
        assert!(err.to_string().contains("parse_config_file"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\ncpu_limit = \"2\"").unwrap();

        let config = SynthConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.defaults.cpu_limit, "2");
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SynthConfig::load_from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("read_config_file"));
    }
}
