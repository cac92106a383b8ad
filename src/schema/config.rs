//! Configuration types for the discovery engine.

use serde::{Deserialize, Serialize};

use super::{MAX_DIFFICULTY, MIN_DIFFICULTY};

fn default_retention_ms() -> f64 {
    120_000.0
}
fn default_max_events() -> usize {
    500
}
fn default_inactivity_timeout_ms() -> f64 {
    30_000.0
}
fn default_noise_floor() -> f32 {
    0.1
}
fn default_near_miss_margin() -> f32 {
    0.15
}
fn default_history_len() -> usize {
    16
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum age of buffered events.
    #[serde(default = "default_retention_ms")]
    pub retention_ms: f64,
    /// Hard cap on buffered events, enforced on every append.
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    /// Trackers with no nonzero score for this long are dropped.
    #[serde(default = "default_inactivity_timeout_ms")]
    pub inactivity_timeout_ms: f64,
    /// Confidence above which an evaluation counts as an attempt.
    #[serde(default = "default_noise_floor")]
    pub noise_floor: f32,
    /// Distance below threshold that still counts as a near miss.
    #[serde(default = "default_near_miss_margin")]
    pub near_miss_margin: f32,
    /// Number of recent confidences kept per tracker.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    /// Discovery threshold per difficulty tier.
    #[serde(default)]
    pub thresholds: DifficultyThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retention_ms: default_retention_ms(),
            max_events: default_max_events(),
            inactivity_timeout_ms: default_inactivity_timeout_ms(),
            noise_floor: default_noise_floor(),
            near_miss_margin: default_near_miss_margin(),
            history_len: default_history_len(),
            thresholds: DifficultyThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.retention_ms.is_finite() || self.retention_ms <= 0.0 {
            return Err(ConfigError::InvalidRetention);
        }
        if self.max_events == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        if !self.inactivity_timeout_ms.is_finite() || self.inactivity_timeout_ms <= 0.0 {
            return Err(ConfigError::InvalidInactivityTimeout);
        }
        if !(0.0..1.0).contains(&self.noise_floor) {
            return Err(ConfigError::InvalidNoiseFloor(self.noise_floor));
        }
        if !(0.0..=1.0).contains(&self.near_miss_margin) {
            return Err(ConfigError::InvalidNearMissMargin(self.near_miss_margin));
        }
        if self.history_len == 0 {
            return Err(ConfigError::InvalidHistoryLength);
        }
        self.thresholds.validate()
    }
}

/// Discovery thresholds indexed by difficulty tier.
///
/// Harder patterns are given more slack, so thresholds never increase
/// with the tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct DifficultyThresholds {
    tiers: [f32; MAX_DIFFICULTY as usize],
}

impl Default for DifficultyThresholds {
    fn default() -> Self {
        Self {
            tiers: [0.9, 0.85, 0.8, 0.75, 0.7],
        }
    }
}

impl DifficultyThresholds {
    /// Build from explicit per-tier values (tier 1 first).
    pub fn new(tiers: [f32; MAX_DIFFICULTY as usize]) -> Result<Self, ConfigError> {
        let thresholds = Self { tiers };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Threshold for a tier; out-of-range tiers are clamped.
    #[inline]
    pub fn for_tier(&self, difficulty: u8) -> f32 {
        let tier = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        self.tiers[(tier - MIN_DIFFICULTY) as usize]
    }

    /// All tiers, tier 1 first.
    pub fn tiers(&self) -> &[f32] {
        &self.tiers
    }

    /// Check range and monotonicity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, &t) in self.tiers.iter().enumerate() {
            if !(t > 0.0 && t <= 1.0) {
                return Err(ConfigError::InvalidThreshold {
                    tier: i as u8 + MIN_DIFFICULTY,
                    value: t,
                });
            }
        }
        for (i, pair) in self.tiers.windows(2).enumerate() {
            if pair[1] > pair[0] {
                return Err(ConfigError::NonMonotonicThresholds {
                    tier: i as u8 + MIN_DIFFICULTY + 1,
                });
            }
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Retention window must be positive")]
    InvalidRetention,
    #[error("Event buffer capacity must be non-zero")]
    InvalidCapacity,
    #[error("Inactivity timeout must be positive")]
    InvalidInactivityTimeout,
    #[error("Noise floor {0} outside 0.0-1.0")]
    InvalidNoiseFloor(f32),
    #[error("Near-miss margin {0} outside 0.0-1.0")]
    InvalidNearMissMargin(f32),
    #[error("Confidence history length must be non-zero")]
    InvalidHistoryLength,
    #[error("Threshold {value} for tier {tier} outside (0.0, 1.0]")]
    InvalidThreshold { tier: u8, value: f32 },
    #[error("Threshold for tier {tier} exceeds the easier tier before it")]
    NonMonotonicThresholds { tier: u8 },
}
