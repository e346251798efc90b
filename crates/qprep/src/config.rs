//! Pipeline configuration.
//!
//! Loaded from YAML; every field has a default, so an empty document is a
//! valid configuration:
//!
//! ```yaml
//! kernel_name: kernel
//! norm_tolerance: 1.0e-6
//! optimization_level: 1
//! optimizer:
//!   zero_tolerance: 1.0e-9
//! emit:
//!   generator: qprep
//!   include: qelib1.inc
//!   register_prefix: var
//! logging:
//!   level: info
//!   format: console
//! ```

use std::path::{Path, PathBuf};

use qprep_compile::{DEFAULT_NORM_TOLERANCE, DEFAULT_ZERO_TOLERANCE};
use qprep_qasm2::EmitOptions;
use serde::{Deserialize, Serialize};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Kernel name, declared as an empty gate in the listing
    #[serde(default = "default_kernel_name")]
    pub kernel_name: String,

    /// Allowed deviation of the input's total probability from 1
    #[serde(default = "default_norm_tolerance")]
    pub norm_tolerance: f64,

    /// 0 emits the decomposer output verbatim, 1 removes redundant gates
    #[serde(default = "default_optimization_level")]
    pub optimization_level: u8,

    /// Gate sequence optimizer settings
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Listing settings
    #[serde(default)]
    pub emit: EmitConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gate sequence optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Rotations with `|θ|` at or below this are removed
    #[serde(default = "default_zero_tolerance")]
    pub zero_tolerance: f64,
}

/// Listing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitConfig {
    /// Tool name in the leading comment
    #[serde(default = "default_generator")]
    pub generator: String,

    /// Gate library named in the `include` line
    #[serde(default = "default_include")]
    pub include: String,

    /// Register name prefix
    #[serde(default = "default_register_prefix")]
    pub register_prefix: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "console" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_kernel_name() -> String {
    "kernel".to_string()
}

fn default_norm_tolerance() -> f64 {
    DEFAULT_NORM_TOLERANCE
}

fn default_optimization_level() -> u8 {
    1
}

fn default_zero_tolerance() -> f64 {
    DEFAULT_ZERO_TOLERANCE
}

fn default_generator() -> String {
    "qprep".to_string()
}

fn default_include() -> String {
    "qelib1.inc".to_string()
}

fn default_register_prefix() -> String {
    "var".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            kernel_name: default_kernel_name(),
            norm_tolerance: default_norm_tolerance(),
            optimization_level: default_optimization_level(),
            optimizer: OptimizerConfig::default(),
            emit: EmitConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            zero_tolerance: default_zero_tolerance(),
        }
    }
}

impl Default for EmitConfig {
    fn default() -> Self {
        EmitConfig {
            generator: default_generator(),
            include: default_include(),
            register_prefix: default_register_prefix(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CompileConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: CompileConfig = serde_yaml_ng::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Emitter options derived from this configuration.
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            kernel_name: self.kernel_name.clone(),
            generator: self.emit.generator.clone(),
            include: self.emit.include.clone(),
            register_prefix: self.emit.register_prefix.clone(),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_tolerance("norm_tolerance", self.norm_tolerance)?;
        check_tolerance("optimizer.zero_tolerance", self.optimizer.zero_tolerance)?;

        if self.optimization_level > 1 {
            return Err(ConfigError::Validation(format!(
                "optimization_level must be 0 or 1, got {}",
                self.optimization_level
            )));
        }

        check_line("kernel_name", &self.kernel_name)?;
        check_line("emit.generator", &self.emit.generator)?;
        check_line("emit.include", &self.emit.include)?;
        if self.emit.include.contains('"') {
            return Err(ConfigError::Validation(
                "emit.include must not contain quotes".to_string(),
            ));
        }

        let prefix = &self.emit.register_prefix;
        let is_identifier = prefix.starts_with(|c: char| c.is_ascii_alphabetic())
            && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !is_identifier {
            return Err(ConfigError::Validation(format!(
                "emit.register_prefix must be an identifier, got {prefix:?}"
            )));
        }

        // Validate log level
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        // Validate log format
        match self.logging.format.as_str() {
            "console" | "json" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "Invalid log format: {other}"
                )));
            }
        }

        Ok(())
    }
}

fn check_tolerance(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{field} must be finite and non-negative, got {value}"
        )))
    }
}

fn check_line(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.contains(['\n', '\r']) {
        Err(ConfigError::Validation(format!(
            "{field} must be a non-empty single line"
        )))
    } else {
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
