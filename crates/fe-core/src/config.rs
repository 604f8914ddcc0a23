use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::memory::arena::{DEFAULT_PAGE_ALIGN, DEFAULT_PAGE_SIZE};

/// Top-level configuration for a front end built on this crate.
///
/// Every field has a default, so an empty TOML document is a valid config:
///
/// ```toml
/// [arena]
/// page_size = 65536
///
/// [pool]
/// initial_capacity = 1024
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeConfig {
    /// General purpose arenas (AST nodes, scratch buffers)
    #[serde(default)]
    pub arena: ArenaConfig,

    /// The arena and hash set backing a `SymPool`
    #[serde(default)]
    pub pool: PoolConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Size of a freshly created page. Oversized requests get a page of their own.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Minimum alignment of every page buffer; must be a power of two.
    #[serde(default = "default_page_align")]
    pub page_align: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_align: default_page_align(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Page size of the arena holding long-string records
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Number of long strings the hash set can hold before rehashing
    #[serde(default)]
    pub initial_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            initial_capacity: 0,
        }
    }
}

impl PoolConfig {
    pub fn arena(&self) -> ArenaConfig {
        ArenaConfig {
            page_size: self.page_size,
            page_align: default_page_align(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_page_align() -> usize {
    DEFAULT_PAGE_ALIGN
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

impl ArenaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("arena.page_size must be > 0".into()));
        }
        if !self.page_align.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "arena.page_align must be a power of two, got {}",
                self.page_align
            )));
        }
        Ok(())
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("pool.page_size must be > 0".into()));
        }
        Ok(())
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.level must be one of {:?}, got {:?}",
                LOG_LEVELS, self.level
            )));
        }
        if !LOG_FORMATS.contains(&self.format.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be one of {:?}, got {:?}",
                LOG_FORMATS, self.format
            )));
        }
        Ok(())
    }
}

impl FeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arena.validate()?;
        self.pool.validate()?;
        self.logging.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(
            arena_page_size = config.arena.page_size,
            pool_page_size = config.pool.page_size,
            "Loaded configuration from {}",
            path.display()
        );
        Ok(config)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
