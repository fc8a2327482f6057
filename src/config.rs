//! Session tuning
//!
//! All timings are milliseconds on the host clock. Mini-game tuning lives in
//! each game's `consts` module instead.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetConfig {
    /// How often the decay check runs
    pub decay_period_ms: u64,
    /// Debounce before stat changes are saved
    pub stats_save_delay_ms: u64,
    /// Debounce before coin and best-score changes are saved
    pub coins_save_delay_ms: u64,
    /// Upper bound on how long a change may wait for its save
    pub max_save_defer_ms: u64,
    /// Coins spent per feeding
    pub feed_cost: u32,
    pub message_ms: u64,
    pub warning_ms: u64,
    /// Delay after a nap before the pet wakes up
    pub wake_delay_ms: u64,
    /// Seed for message selection and mini-game RNGs
    pub rng_seed: u64,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            decay_period_ms: 6_000,
            stats_save_delay_ms: 1_000,
            coins_save_delay_ms: 500,
            max_save_defer_ms: 5_000,
            feed_cost: 20,
            message_ms: 3_000,
            warning_ms: 4_000,
            wake_delay_ms: 5_000,
            rng_seed: 0x5EED_1234,
        }
    }
}

impl PetConfig {
    /// Parse a (possibly partial) JSON config; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PetConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decay_period_ms == 0 {
            return Err(ConfigError::Invalid("decay_period_ms must be positive".into()));
        }
        if self.max_save_defer_ms < self.stats_save_delay_ms.max(self.coins_save_delay_ms) {
            return Err(ConfigError::Invalid(
                "max_save_defer_ms must be at least the save delays".into(),
            ));
        }
        Ok(())
    }
}
