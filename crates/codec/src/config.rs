//! Codec configuration.

use scrt_core::ScrtError;

/// Smallest accepted `max_page_bytes`.
pub const MIN_PAGE_BYTES: usize = 64;

/// Writer and reader configuration parameters.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Maximum rows per page (default: 1024).
    ///
    /// The writer flushes a page as soon as it holds this many rows.
    pub page_rows: usize,

    /// Largest page a reader accepts, in bytes (default: 64MB).
    ///
    /// A length prefix above this is treated as corruption instead of being
    /// allocated.
    pub max_page_bytes: usize,

    /// Whether writers draw page builders from the shared pool (default: true).
    pub pooling: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            page_rows: 1024,
            max_page_bytes: 64 * 1024 * 1024, // 64MB
            pooling: true,
        }
    }
}

impl CodecConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page row limit (builder pattern).
    pub fn with_page_rows(mut self, rows: usize) -> Self {
        self.page_rows = rows;
        self
    }

    /// Set the reader page size limit (builder pattern).
    pub fn with_max_page_bytes(mut self, bytes: usize) -> Self {
        self.max_page_bytes = bytes;
        self
    }

    /// Enable or disable builder pooling (builder pattern).
    pub fn with_pooling(mut self, pooling: bool) -> Self {
        self.pooling = pooling;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_rows == 0 {
            return Err(ConfigError::PageRowsZero);
        }
        if self.max_page_bytes < MIN_PAGE_BYTES {
            return Err(ConfigError::MaxPageBytesTooSmall);
        }
        Ok(())
    }

    /// Create a configuration optimized for testing (tiny pages, no pool).
    pub fn for_testing() -> Self {
        CodecConfig {
            page_rows: 4,
            max_page_bytes: 1024 * 1024, // 1MB
            pooling: false,
        }
    }
}

/// Codec configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A page must hold at least one row.
    #[error("Page row limit must be at least 1")]
    PageRowsZero,

    /// Page size limit is below the minimum.
    #[error("Max page bytes must be at least 64")]
    MaxPageBytesTooSmall,
}

impl From<ConfigError> for ScrtError {
    fn from(e: ConfigError) -> Self {
        ScrtError::InvalidConfig(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.page_rows, 1024);
        assert_eq!(config.max_page_bytes, 64 * 1024 * 1024);
        assert!(config.pooling);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = CodecConfig::new()
            .with_page_rows(10)
            .with_max_page_bytes(4096)
            .with_pooling(false);
        assert_eq!(config.page_rows, 10);
        assert_eq!(config.max_page_bytes, 4096);
        assert!(!config.pooling);
    }

    #[test]
    fn test_validation() {
        let config = CodecConfig::new().with_page_rows(0);
        assert_eq!(config.validate(), Err(ConfigError::PageRowsZero));

        let config = CodecConfig::new().with_max_page_bytes(10);
        assert_eq!(config.validate(), Err(ConfigError::MaxPageBytesTooSmall));

        assert!(CodecConfig::for_testing().validate().is_ok());
    }

    #[test]
    fn test_config_error_converts() {
        let err: ScrtError = ConfigError::PageRowsZero.into();
        assert!(matches!(err, ScrtError::InvalidConfig(_)));
    }
}
