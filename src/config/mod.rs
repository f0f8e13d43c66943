//! Configuration for jobscout

mod daemon;
mod domains;
mod enrichment;
mod logging;
mod scraping;

pub use daemon::{HttpConfig, StorageConfig};
pub use domains::{load_terms, ConfigLoadError, DomainConfig, DomainRegistry, SEARCH_TERM_PLACEHOLDER};
pub use enrichment::{EnrichmentConfig, API_KEY_ENV_VARS};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use scraping::{default_link_denylist, CrawlConfig, FetchSettings};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Desktop browser user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "jobscout.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Crawl controller configuration
    #[serde(default)]
    pub crawl: CrawlConfig,
    /// HTTP fetcher configuration
    #[serde(default)]
    pub fetch: FetchSettings,
    /// AI enrichment configuration
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// HTTP API server configuration
    #[serde(default)]
    pub http: HttpConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Relative CSV paths are resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Load from `path` if given, else `jobscout.toml` in the working
    /// directory if present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.crawl.domains_file,
            &mut self.crawl.terms_file,
            &mut self.storage.data_dir,
        ] {
            if path.is_relative() && !base.as_os_str().is_empty() {
                *path = base.join(&*path);
            }
        }
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Fetch validation
        if self.fetch.max_attempts == 0 {
            errors.push("fetch max_attempts must be positive".to_string());
        }
        if self.fetch.timeout_secs == 0 {
            errors.push("fetch timeout_secs must be positive".to_string());
        }
        if self.fetch.delay_min_ms > self.fetch.delay_max_ms {
            errors.push(format!(
                "fetch delay_min_ms ({}) must not exceed delay_max_ms ({})",
                self.fetch.delay_min_ms, self.fetch.delay_max_ms
            ));
        }
        if self.fetch.user_agent.trim().is_empty() {
            errors.push("fetch user_agent must not be empty".to_string());
        }

        // Crawl validation
        if self.crawl.job_delay_min_ms > self.crawl.job_delay_max_ms {
            errors.push(format!(
                "crawl job_delay_min_ms ({}) must not exceed job_delay_max_ms ({})",
                self.crawl.job_delay_min_ms, self.crawl.job_delay_max_ms
            ));
        }

        // Enrichment validation
        if self.enrichment.enabled && self.enrichment.active_endpoint().is_none() {
            errors.push("enrichment is enabled but no endpoint is configured".to_string());
        }
        if self.enrichment.enabled && self.enrichment.timeout_secs == 0 {
            errors.push("enrichment timeout_secs must be positive".to_string());
        }

        // HTTP config validation
        if !self.http.listen_addr.is_empty() {
            if let Some(port_str) = self.http.listen_addr.rsplit(':').next() {
                if let Ok(port) = port_str.parse::<u32>() {
                    if port == 0 || port > 65535 {
                        errors.push(format!(
                            "HTTP listen port must be between 1 and 65535, got {}",
                            port
                        ));
                    }
                }
            }
        }

        // Storage validation
        if self.storage.data_dir.as_os_str().is_empty() {
            errors.push("data_dir must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Helper: build a valid default config for mutation-based testing
    // ========================================================================

    fn valid_config() -> Config {
        Config::default()
    }

    // ========================================================================
    // Config::validate – happy path
    // ========================================================================

    #[test]
    fn default_config_passes_validation() {
        let cfg = valid_config();
        assert!(cfg.validate().is_ok(), "default config should be valid");
    }

    // ========================================================================
    // Config::validate – fetch and crawl errors
    // ========================================================================

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut cfg = valid_config();
        cfg.fetch.max_attempts = 0;
        let err = cfg.validate().unwrap_err();
        assert!(
            err.to_string().contains("max_attempts must be positive"),
            "unexpected error message: {}",
            err
        );
    }

    #[test]
    fn validate_rejects_inverted_delay_range() {
        let mut cfg = valid_config();
        cfg.fetch.delay_min_ms = 5000;
        cfg.fetch.delay_max_ms = 1000;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("delay_min_ms (5000)"));
    }

    #[test]
    fn validate_rejects_inverted_job_delay_range() {
        let mut cfg = valid_config();
        cfg.crawl.job_delay_min_ms = 4000;
        cfg.crawl.job_delay_max_ms = 100;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_fixed_delay() {
        let mut cfg = valid_config();
        cfg.fetch.delay_min_ms = 0;
        cfg.fetch.delay_max_ms = 0;
        assert!(cfg.validate().is_ok());
    }

    // ========================================================================
    // Config::validate – enrichment
    // ========================================================================

    #[test]
    fn validate_rejects_enrichment_without_endpoint() {
        let mut cfg = valid_config();
        cfg.enrichment.enabled = true;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("no endpoint"));
    }

    #[test]
    fn validate_accepts_enrichment_with_endpoint() {
        let mut cfg = valid_config();
        cfg.enrichment.enabled = true;
        cfg.enrichment.endpoint = Some("http://localhost:11434/v1/chat/completions".to_string());
        assert!(cfg.validate().is_ok());
    }

    // ========================================================================
    // Config::validate – HTTP port errors
    // ========================================================================

    #[test]
    fn validate_rejects_http_port_zero() {
        let mut cfg = valid_config();
        cfg.http.listen_addr = "0.0.0.0:0".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("HTTP listen port must be between 1 and 65535"));
    }

    #[test]
    fn validate_rejects_http_port_too_large() {
        let mut cfg = valid_config();
        cfg.http.listen_addr = "0.0.0.0:70000".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("HTTP listen port must be between 1 and 65535"));
    }

    // ========================================================================
    // Config::validate – multiple errors collected
    // ========================================================================

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = valid_config();
        cfg.fetch.max_attempts = 0;
        cfg.fetch.timeout_secs = 0;
        cfg.storage.data_dir = PathBuf::from("");
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("max_attempts must be positive"));
        assert!(msg.contains("timeout_secs must be positive"));
        assert!(msg.contains("data_dir must not be empty"));
    }

    // ========================================================================
    // Config::load
    // ========================================================================

    #[test]
    fn load_resolves_relative_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("jobscout.toml");
        std::fs::write(
            &path,
            "[crawl]\ndomains_file = \"sites.csv\"\n\n[fetch]\nmax_attempts = 5\n",
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.crawl.domains_file, tmp.path().join("sites.csv"));
        assert_eq!(cfg.crawl.terms_file, tmp.path().join("terms.csv"));
        assert_eq!(cfg.fetch.max_attempts, 5);
        assert_eq!(cfg.fetch.backoff_base_ms, 500);
    }

    #[test]
    fn load_reports_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.toml");
        std::fs::write(&path, "[fetch\nmax_attempts = ").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    // ========================================================================
    // Default implementations – spot-check important values
    // ========================================================================

    #[test]
    fn default_fetch_settings_values() {
        let f = FetchSettings::default();
        assert_eq!(f.timeout_secs, 30);
        assert_eq!(f.max_attempts, 3);
        assert_eq!(f.retry_statuses, vec![500, 502, 503, 504]);
        assert_eq!((f.delay_min_ms, f.delay_max_ms), (1000, 3000));
        assert!(f.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn default_crawl_config_values() {
        let c = CrawlConfig::default();
        assert_eq!((c.job_delay_min_ms, c.job_delay_max_ms), (1500, 3500));
        assert!(c.link_denylist.iter().any(|p| p == "/login"));
        assert_eq!(c.min_description_chars, 50);
    }
}
