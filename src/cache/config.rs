// Cache configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Construction-time settings for a [`DiskCache`](crate::cache::disk::DiskCache)
///
/// Read once by the constructor; changing it afterwards has no effect on a live cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Base directory holding the entry files (created if absent)
    pub directory: PathBuf,
    /// Store entries gzip-compressed (`.gzip`) instead of plain (`.cache`)
    #[serde(default)]
    pub use_compression: bool,
    /// Milliseconds between janitor sweeps, 0 disables the janitor
    #[serde(default)]
    pub cleanup_interval_ms: u64,
    /// gzip level used when `use_compression` is set (0-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

fn default_compression_level() -> u32 {
    6
}

impl CacheConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            use_compression: false,
            cleanup_interval_ms: 0,
            compression_level: default_compression_level(),
        }
    }

    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set the janitor interval; sub-millisecond remainders round up so any
    /// nonzero interval keeps the janitor enabled
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        let millis = interval.as_millis() + u128::from(interval.subsec_nanos() % 1_000_000 > 0);
        self.cleanup_interval_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    /// Janitor interval, None when the janitor is disabled
    pub fn cleanup_interval(&self) -> Option<Duration> {
        if self.cleanup_interval_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.cleanup_interval_ms))
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.directory.as_os_str().is_empty() {
            return Err("directory cannot be empty".to_string());
        }
        if self.compression_level > 9 {
            return Err(format!(
                "compression_level ({}) must be between 0 and 9",
                self.compression_level
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = CacheConfig::new("/tmp/cache");
        assert_eq!(config.directory, PathBuf::from("/tmp/cache"));
        assert!(!config.use_compression);
        assert_eq!(config.cleanup_interval_ms, 0);
        assert_eq!(config.compression_level, 6);
        assert!(config.cleanup_interval().is_none());
    }

    #[test]
    fn test_can_deserialize_minimal_config_from_yaml() {
        let yaml = r#"
directory: "/var/cache/app"
"#;
        let config: CacheConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config, CacheConfig::new("/var/cache/app"));
    }

    #[test]
    fn test_directory_is_required() {
        let yaml = r#"
use_compression: true
"#;
        let result: Result<CacheConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_can_deserialize_full_config() {
        let yaml = r#"
directory: "/data/cache"
use_compression: true
cleanup_interval_ms: 30000
compression_level: 9
"#;
        let config: CacheConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.use_compression);
        assert_eq!(config.cleanup_interval(), Some(Duration::from_secs(30)));
        assert_eq!(config.compression_level, 9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_directory() {
        let config = CacheConfig::new("");
        let err = config.validate().unwrap_err();
        assert!(err.contains("directory"));
    }

    #[test]
    fn test_validate_rejects_compression_level_out_of_range() {
        let mut config = CacheConfig::new("/tmp/cache");
        config.compression_level = 12;
        let err = config.validate().unwrap_err();
        assert!(err.contains("compression_level"));
    }

    #[test]
    fn test_builders() {
        let config = CacheConfig::new("/tmp/cache")
            .with_compression(true)
            .with_cleanup_interval(Duration::from_secs(5));
        assert!(config.use_compression);
        assert_eq!(config.cleanup_interval_ms, 5000);
    }

    #[test]
    fn test_sub_second_interval_keeps_janitor_enabled() {
        let config = CacheConfig::new("/tmp/cache").with_cleanup_interval(Duration::from_millis(500));
        assert_eq!(config.cleanup_interval(), Some(Duration::from_millis(500)));

        let config = CacheConfig::new("/tmp/cache").with_cleanup_interval(Duration::from_millis(1999));
        assert_eq!(config.cleanup_interval(), Some(Duration::from_millis(1999)));
    }

    #[test]
    fn test_sub_millisecond_interval_rounds_up() {
        let config = CacheConfig::new("/tmp/cache").with_cleanup_interval(Duration::from_micros(10));
        assert_eq!(config.cleanup_interval(), Some(Duration::from_millis(1)));

        let config =
            CacheConfig::new("/tmp/cache").with_cleanup_interval(Duration::from_micros(2_500));
        assert_eq!(config.cleanup_interval(), Some(Duration::from_millis(3)));
    }

    #[test]
    fn test_zero_interval_disables_janitor() {
        let config = CacheConfig::new("/tmp/cache").with_cleanup_interval(Duration::ZERO);
        assert!(config.cleanup_interval().is_none());
    }
}
