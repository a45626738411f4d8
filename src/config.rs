// ABOUTME: Engine configuration for byte limits, point rates, balance warnings and dispatch pacing
// ABOUTME: Loadable from TOML with per-section defaults, or built in code with with_* methods

//! Engine configuration
//!
//! Every section is optional; missing keys fall back to the carrier defaults.
//!
//! ```toml
//! [limits]
//! sms_max_bytes = 90
//! page_max_bytes = 2000
//!
//! [rates]
//! sms = 1
//! lms = 4
//! mms = 15
//!
//! [balance]
//! low_balance = { points = 100 }
//! max_age_secs = 300
//!
//! [dispatch]
//! inter_page_delay_ms = 500
//! max_recipients = 1000
//! ```

use crate::billing::{BalanceCacheConfig, BalanceGuard, CostModel, LowBalanceThreshold, RateTable};
use crate::datatypes::{Classifier, LMS_PAGE_MAX_BYTES, SMS_MAX_BYTES};
use crate::dispatch::{DEFAULT_MAX_RECIPIENTS, SequencerOptions};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Classification byte limits
    pub limits: LimitsConfig,

    /// Points per page of each class
    pub rates: RateTable,

    /// Balance warnings and caching
    pub balance: BalanceConfig,

    /// Sequencer pacing and caps
    pub dispatch: DispatchConfig,
}

/// Byte limits used by the classifier
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub sms_max_bytes: usize,
    pub page_max_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            sms_max_bytes: SMS_MAX_BYTES,
            page_max_bytes: LMS_PAGE_MAX_BYTES,
        }
    }
}

/// Balance warning floor and cache staleness
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Remaining balance under which a send warns
    pub low_balance: LowBalanceThreshold,

    /// Age in seconds after which the cached balance is stale; unset means never
    pub max_age_secs: Option<u64>,
}

/// Sequencer settings
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Pause between pages in milliseconds
    pub inter_page_delay_ms: u64,

    /// Largest recipient batch per send
    pub max_recipients: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            inter_page_delay_ms: 500,
            max_recipients: DEFAULT_MAX_RECIPIENTS,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject limits the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.page_max_bytes < 2 {
            return Err(ConfigError::Invalid(format!(
                "page_max_bytes must be at least 2, got {}",
                self.limits.page_max_bytes
            )));
        }
        if self.limits.sms_max_bytes >= self.limits.page_max_bytes {
            return Err(ConfigError::Invalid(format!(
                "sms_max_bytes ({}) must be below page_max_bytes ({})",
                self.limits.sms_max_bytes, self.limits.page_max_bytes
            )));
        }
        if self.dispatch.max_recipients == 0 {
            return Err(ConfigError::Invalid("max_recipients must be positive".to_string()));
        }
        if let LowBalanceThreshold::Percent(pct) = self.balance.low_balance {
            if pct > 100 {
                return Err(ConfigError::Invalid(format!(
                    "low_balance percent must be 0-100, got {}",
                    pct
                )));
            }
        }
        Ok(())
    }

    pub fn with_limits(mut self, sms_max_bytes: usize, page_max_bytes: usize) -> Self {
        self.limits = LimitsConfig {
            sms_max_bytes,
            page_max_bytes,
        };
        self
    }

    pub fn with_rates(mut self, rates: RateTable) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_low_balance(mut self, threshold: LowBalanceThreshold) -> Self {
        self.balance.low_balance = threshold;
        self
    }

    /// Delays beyond `u64::MAX` milliseconds saturate
    pub fn with_inter_page_delay(mut self, delay: Duration) -> Self {
        self.dispatch.inter_page_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_recipients(mut self, max: usize) -> Self {
        self.dispatch.max_recipients = max;
        self
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.limits.sms_max_bytes, self.limits.page_max_bytes)
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.rates)
    }

    pub fn balance_guard(&self) -> BalanceGuard {
        BalanceGuard::new(self.balance.low_balance)
    }

    pub fn balance_cache_config(&self) -> BalanceCacheConfig {
        let config = BalanceCacheConfig::default();
        match self.balance.max_age_secs {
            Some(secs) => config.with_max_age(Duration::from_secs(secs)),
            None => config,
        }
    }

    pub fn sequencer_options(&self) -> SequencerOptions {
        SequencerOptions {
            inter_page_delay: Duration::from_millis(self.dispatch.inter_page_delay_ms),
            max_recipients: self.dispatch.max_recipients,
            classifier: self.classifier(),
        }
    }
}
