//! Configuration management for schema comparison
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-compare.toml)
//! - Environment variables (SCHEMA_COMPARE__*)
//!
//! ## Example config file (schema-compare.toml):
//! ```toml
//! [compare]
//! ignore_optional = false
//! ignore_nullable = false
//! ignore_branded = false
//! ignore_intersection_operand_order = true
//!
//! [report]
//! audit_trail = true
//! output_format = "json"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::options::CompareOptions;

/// Main configuration for the comparison CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Comparison laxities
    #[serde(default)]
    pub compare: CompareSettings,

    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// The serializable part of [`CompareOptions`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareSettings {
    #[serde(default)]
    pub ignore_optional: bool,

    #[serde(default)]
    pub ignore_nullable: bool,

    #[serde(default)]
    pub ignore_branded: bool,

    /// Defaults to the preset comparators' commutative intersections
    #[serde(default = "default_true")]
    pub ignore_intersection_operand_order: bool,
}

/// Report configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Print the per-rule audit trail
    #[serde(default)]
    pub audit_trail: bool,

    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

fn default_true() -> bool {
    true
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            ignore_optional: false,
            ignore_nullable: false,
            ignore_branded: false,
            ignore_intersection_operand_order: true,
        }
    }
}

impl CompareConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding a required file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-compare.toml",
            ".schema-compare.toml",
            "config/schema-compare.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "familiar", "schema-compare") {
            let xdg_config = dirs.config_dir().join("schema-compare.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SCHEMA_COMPARE__COMPARE__IGNORE_OPTIONAL=true
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_COMPARE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let loaded: Self = config.try_deserialize()?;
        tracing::debug!(?loaded, "loaded configuration");
        Ok(loaded)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Options for building rule sets (no interceptor)
    pub fn options(&self) -> CompareOptions {
        CompareOptions {
            ignore_optional: self.compare.ignore_optional,
            ignore_nullable: self.compare.ignore_nullable,
            ignore_branded: self.compare.ignore_branded,
            ignore_intersection_operand_order: self.compare.ignore_intersection_operand_order,
            interceptor: None,
        }
    }
}
