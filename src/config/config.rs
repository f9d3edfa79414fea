use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::data::datatable::DataColumn;
use crate::data::filter::{FilterControls, InvalidDatePolicy};
use crate::data::table_engine::EngineOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub table: TableConfig,
    pub filters: FilterControls,

    /// Declared column schema; columns not listed here are inferred on load
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<DataColumn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for sort markers
    pub use_glyphs: bool,

    /// Show each row's load position
    pub show_row_numbers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Page size, fixed for the lifetime of a table
    pub rows_per_page: usize,

    /// "pass" keeps rows with unparseable dates in a date range, "exclude" drops them
    pub invalid_dates: InvalidDatePolicy,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_row_numbers: false,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            rows_per_page: 10,
            invalid_dates: InvalidDatePolicy::Pass,
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            debug!(target: "config", "No config at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file {:?}", path))?;
        info!(target: "config", "Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("agrimeet-table").join("config.toml"))
    }

    /// Engine settings derived from this config
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            rows_per_page: self.table.rows_per_page,
            filters: self.filters.clone(),
            invalid_dates: self.table.invalid_dates,
        }
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# agrimeet-table configuration
# Location: ~/.config/agrimeet-table/config.toml (Linux)
#           ~/Library/Application Support/agrimeet-table/config.toml (macOS)
#           %APPDATA%\agrimeet-table\config.toml (Windows)

[display]
# Use Unicode arrows for sort markers (false = ASCII)
use_glyphs = true

# Show each row's original position
show_row_numbers = false

[table]
# Rows per page
rows_per_page = 10

# Date range filter and unparseable dates:
#   "pass"    - keep the row (default)
#   "exclude" - drop the row while a bound is set
invalid_dates = "pass"

[filters]
# Free-text search across every cell of a row
search = true

# Columns that get an exact-match select filter
selects = []

# Column the date range filter applies to
# date_column = "created"

# Declared column types. Columns not listed are inferred from the data.
# data_type is one of "string", "date", "currency".
# [[columns]]
# name = "amount"
# data_type = "currency"
# sortable = true
"#
        .to_string()
    }
}
