//! Tunable economy configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

/// Errors raised when economy configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("character roster must name at least one character")]
    EmptyRoster,
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("character cost growth must exceed 1.0 (got {0:.2})")]
    ShrinkingCostCurve(f64),
}

/// Balance knobs for the whole economy. Missing JSON fields fall back to the
/// shipped defaults, so a config file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    #[serde(default = "EconomyConfig::default_characters")]
    pub characters: Vec<String>,
    #[serde(default = "EconomyConfig::default_max_level")]
    pub max_level: u8,
    #[serde(default = "EconomyConfig::default_max_earn_upgrade")]
    pub max_earn_upgrade: u8,
    #[serde(default = "EconomyConfig::default_upgrade_base_cost")]
    pub upgrade_base_cost: u64,
    #[serde(default = "EconomyConfig::default_character_base_cost")]
    pub character_base_cost: u64,
    #[serde(default = "EconomyConfig::default_character_level_step")]
    pub character_level_step: u64,
    #[serde(default = "EconomyConfig::default_character_cost_growth")]
    pub character_cost_growth: f64,
    #[serde(default = "EconomyConfig::default_boost_cost")]
    pub boost_cost: u64,
    #[serde(default = "EconomyConfig::default_boost_duration_secs")]
    pub boost_duration_secs: u64,
    #[serde(default = "EconomyConfig::default_boost_multiplier")]
    pub boost_multiplier: u64,
    #[serde(default = "EconomyConfig::default_crit_chance")]
    pub crit_chance: f64,
    #[serde(default = "EconomyConfig::default_crit_multiplier")]
    pub crit_multiplier: u64,
    #[serde(default = "EconomyConfig::default_daily_cooldown_secs")]
    pub daily_cooldown_secs: u64,
    #[serde(default = "EconomyConfig::default_daily_base_reward")]
    pub daily_base_reward: u64,
    #[serde(default = "EconomyConfig::default_daily_streak_bonus")]
    pub daily_streak_bonus: u64,
    #[serde(default = "EconomyConfig::default_daily_streak_cap")]
    pub daily_streak_cap: u32,
}

impl EconomyConfig {
    fn default_characters() -> Vec<String> {
        constants::CHARACTER_ROSTER
            .iter()
            .map(|name| (*name).to_string())
            .collect()
    }

    const fn default_max_level() -> u8 {
        constants::MAX_CHARACTER_LEVEL
    }

    const fn default_max_earn_upgrade() -> u8 {
        constants::MAX_EARN_UPGRADE
    }

    const fn default_upgrade_base_cost() -> u64 {
        constants::EARN_UPGRADE_BASE_COST
    }

    const fn default_character_base_cost() -> u64 {
        constants::CHARACTER_BASE_COST
    }

    const fn default_character_level_step() -> u64 {
        constants::CHARACTER_LEVEL_STEP
    }

    const fn default_character_cost_growth() -> f64 {
        constants::CHARACTER_COST_GROWTH
    }

    const fn default_boost_cost() -> u64 {
        constants::BOOST_COST
    }

    const fn default_boost_duration_secs() -> u64 {
        constants::BOOST_DURATION_SECS
    }

    const fn default_boost_multiplier() -> u64 {
        constants::BOOST_MULTIPLIER
    }

    const fn default_crit_chance() -> f64 {
        constants::CRIT_CHANCE
    }

    const fn default_crit_multiplier() -> u64 {
        constants::CRIT_MULTIPLIER
    }

    const fn default_daily_cooldown_secs() -> u64 {
        constants::DAILY_COOLDOWN_SECS
    }

    const fn default_daily_base_reward() -> u64 {
        constants::DAILY_BASE_REWARD
    }

    const fn default_daily_streak_bonus() -> u64 {
        constants::DAILY_STREAK_BONUS
    }

    const fn default_daily_streak_cap() -> u32 {
        constants::DAILY_STREAK_CAP
    }

    /// Parse a configuration document. Fields absent from the JSON keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Number of character slots every player record carries.
    #[must_use]
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Display name for a roster slot.
    #[must_use]
    pub fn character_name(&self, index: usize) -> Option<&str> {
        self.characters.get(index).map(String::as_str)
    }

    /// Check the invariants the economy math relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.characters.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        Self::ensure_min("max_level", u64::from(self.max_level), 1)?;
        Self::ensure_min("upgrade_base_cost", self.upgrade_base_cost, 1)?;
        Self::ensure_min("character_base_cost", self.character_base_cost, 1)?;
        Self::ensure_min("character_level_step", self.character_level_step, 1)?;
        Self::ensure_min("boost_multiplier", self.boost_multiplier, 1)?;
        Self::ensure_min("crit_multiplier", self.crit_multiplier, 1)?;
        Self::ensure_min("daily_cooldown_secs", self.daily_cooldown_secs, 1)?;
        Self::ensure_min("daily_streak_cap", u64::from(self.daily_streak_cap), 1)?;
        if !(0.0..=1.0).contains(&self.crit_chance) {
            return Err(ConfigError::RangeViolation {
                field: "crit_chance",
                min: 0.0,
                max: 1.0,
                value: self.crit_chance,
            });
        }
        // Equal growth would price every slot the same, so the curve must compound.
        if !self.character_cost_growth.is_finite() || self.character_cost_growth <= 1.0 {
            return Err(ConfigError::ShrinkingCostCurve(self.character_cost_growth));
        }
        Ok(())
    }

    const fn ensure_min(field: &'static str, value: u64, min: u64) -> Result<(), ConfigError> {
        if value < min {
            return Err(ConfigError::MinViolation { field, min, value });
        }
        Ok(())
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            characters: Self::default_characters(),
            max_level: Self::default_max_level(),
            max_earn_upgrade: Self::default_max_earn_upgrade(),
            upgrade_base_cost: Self::default_upgrade_base_cost(),
            character_base_cost: Self::default_character_base_cost(),
            character_level_step: Self::default_character_level_step(),
            character_cost_growth: Self::default_character_cost_growth(),
            boost_cost: Self::default_boost_cost(),
            boost_duration_secs: Self::default_boost_duration_secs(),
            boost_multiplier: Self::default_boost_multiplier(),
            crit_chance: Self::default_crit_chance(),
            crit_multiplier: Self::default_crit_multiplier(),
            daily_cooldown_secs: Self::default_daily_cooldown_secs(),
            daily_base_reward: Self::default_daily_base_reward(),
            daily_streak_bonus: Self::default_daily_streak_bonus(),
            daily_streak_cap: Self::default_daily_streak_cap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = EconomyConfig::default();
        assert_eq!(cfg.character_count(), 7);
        assert_eq!(cfg.character_name(0), Some("Gitin"));
        assert_eq!(cfg.character_name(7), None);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EconomyConfig::from_json(r#"{ "boost_cost": 50, "characters": ["A", "B"] }"#)
            .unwrap();
        assert_eq!(cfg.boost_cost, 50);
        assert_eq!(cfg.character_count(), 2);
        assert_eq!(cfg.max_level, 10);
        assert_eq!(cfg.daily_cooldown_secs, 86_400);
    }

    #[test]
    fn validate_rejects_broken_invariants() {
        let cfg = EconomyConfig {
            characters: Vec::new(),
            ..EconomyConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyRoster));

        let cfg = EconomyConfig {
            crit_chance: 1.5,
            ..EconomyConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::RangeViolation {
                field: "crit_chance",
                ..
            })
        ));

        let cfg = EconomyConfig {
            character_cost_growth: 1.0,
            ..EconomyConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ShrinkingCostCurve(1.0)));

        let cfg = EconomyConfig {
            daily_streak_cap: 0,
            ..EconomyConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::MinViolation {
                field: "daily_streak_cap",
                min: 1,
                value: 0,
            })
        );
    }
}
