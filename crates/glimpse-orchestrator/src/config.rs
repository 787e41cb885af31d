//! Configuration for batch runs and the combined Glimpse config file

use crate::error::ConfigError;
use glimpse_classifier::ClassifierConfig;
use glimpse_domain::ContentType;
use glimpse_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest accepted reconcile interval (one week)
pub const MAX_RECONCILE_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Configuration for the Batch Orchestrator
///
/// # Examples
///
/// ```
/// use glimpse_orchestrator::OrchestratorConfig;
///
/// let config = OrchestratorConfig::default();
/// assert_eq!(config.progress_interval_ms, 100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Minimum time between progress events (milliseconds)
    /// Default: 100, i.e. at most ten updates per second
    pub progress_interval_ms: u64,

    /// How often the reconcile worker runs (minutes)
    /// Default: every 60 minutes, at most `MAX_RECONCILE_INTERVAL_MINUTES`
    pub reconcile_interval_minutes: u64,

    /// Maximum time for one metadata lookup (seconds)
    pub lookup_timeout_secs: u64,

    /// Maximum time for routing one item (seconds)
    pub route_timeout_secs: u64,
}

impl OrchestratorConfig {
    /// Progress throttle interval as a Duration
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Reconcile interval as a Duration
    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_minutes.saturating_mul(60))
    }

    /// Lookup timeout as a Duration
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    /// Routing timeout as a Duration
    pub fn route_timeout(&self) -> Duration {
        Duration::from_secs(self.route_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.progress_interval_ms == 0 {
            return Err("progress_interval_ms must be greater than 0".to_string());
        }
        if self.reconcile_interval_minutes == 0 {
            return Err("reconcile_interval_minutes must be greater than 0".to_string());
        }
        if self.reconcile_interval_minutes > MAX_RECONCILE_INTERVAL_MINUTES {
            return Err(format!(
                "reconcile_interval_minutes must be at most {}",
                MAX_RECONCILE_INTERVAL_MINUTES
            ));
        }
        if self.lookup_timeout_secs == 0 || self.route_timeout_secs == 0 {
            return Err("timeouts must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: 100,
            reconcile_interval_minutes: 60,
            lookup_timeout_secs: 15,
            route_timeout_secs: 15,
        }
    }
}

/// Per-type extractor configuration (`[extractor.music]`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfigs {
    /// Music extractor
    pub music: ExtractorConfig,
    /// Movie extractor
    pub movie: ExtractorConfig,
    /// Book extractor
    pub book: ExtractorConfig,
}

impl Default for ExtractorConfigs {
    fn default() -> Self {
        Self {
            music: ExtractorConfig::for_type(ContentType::Music),
            movie: ExtractorConfig::for_type(ContentType::Movie),
            book: ExtractorConfig::for_type(ContentType::Book),
        }
    }
}

/// The complete Glimpse configuration file
///
/// ```toml
/// [classifier]
/// min_semantic_confidence = 0.6
///
/// [extractor.music]
/// confidence_threshold = 0.7
///
/// [orchestrator]
/// progress_interval_ms = 100
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlimpseConfig {
    /// Classifier section
    pub classifier: ClassifierConfig,
    /// Extractor sections
    pub extractor: ExtractorConfigs,
    /// Orchestrator section
    pub orchestrator: OrchestratorConfig,
}

impl GlimpseConfig {
    /// Parse and validate a TOML document; missing sections use defaults
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sections = [
            ("classifier", self.classifier.validate()),
            ("extractor.music", self.extractor.music.validate()),
            ("extractor.movie", self.extractor.movie.validate()),
            ("extractor.book", self.extractor.book.validate()),
            ("orchestrator", self.orchestrator.validate()),
        ];
        for (section, result) in sections {
            result.map_err(|e| ConfigError::Invalid(format!("[{}] {}", section, e)))?;
        }
        Ok(())
    }
}
