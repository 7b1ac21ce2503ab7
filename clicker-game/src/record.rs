//! Per-player state and the identity handed over by front ends.
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

use crate::config::EconomyConfig;
use crate::numbers::floor_f64_to_u64;

/// Unix timestamp in whole seconds.
pub type Timestamp = u64;

/// Level of every character slot, in roster order.
pub type CharacterLevels = SmallVec<[u8; 8]>;

/// Who is acting, as resolved by the front end before it calls into the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerIdentity {
    pub id: String,
    pub display_name: String,
}

impl PlayerIdentity {
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Identity with the fallback name used when the front end knows no better.
    #[must_use]
    pub fn anonymous(id: impl Into<String>) -> Self {
        let id = id.into();
        let display_name = format!("Player_{id}");
        Self { id, display_name }
    }
}

/// Persistent progress of a single player.
///
/// Every field carries a serde default so records written by older builds
/// (including the legacy bot's field names) keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlayerRecord {
    #[serde(default)]
    pub coins: u64,
    #[serde(default, alias = "levels")]
    pub character_levels: CharacterLevels,
    #[serde(default, alias = "current_char")]
    pub current_character_index: usize,
    #[serde(default, alias = "earn_upgrade")]
    pub earn_upgrade_level: u8,
    #[serde(
        default,
        alias = "latyao_until",
        deserialize_with = "deserialize_timestamp"
    )]
    pub boost_active_until: Timestamp,
    #[serde(default, alias = "name")]
    pub display_name: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Timestamp,
    #[serde(
        default,
        alias = "last_daily",
        deserialize_with = "deserialize_timestamp"
    )]
    pub last_daily_claim: Timestamp,
    #[serde(default)]
    pub daily_streak: u32,
    #[serde(default, alias = "achievements")]
    pub unlocked_achievements: BTreeSet<String>,
}

impl PlayerRecord {
    /// Fresh record for a first-contact player.
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        created_at: Timestamp,
        cfg: &EconomyConfig,
    ) -> Self {
        Self {
            character_levels: std::iter::repeat_n(0, cfg.character_count()).collect(),
            display_name: display_name.into(),
            created_at,
            ..Self::default()
        }
    }

    /// Level of the currently selected character.
    #[must_use]
    pub fn current_level(&self) -> u8 {
        self.level_of(self.current_character_index)
    }

    /// Level of an arbitrary slot, 0 when the slot does not exist.
    #[must_use]
    pub fn level_of(&self, index: usize) -> u8 {
        self.character_levels.get(index).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn has_achievement(&self, key: &str) -> bool {
        self.unlocked_achievements.contains(key)
    }

    /// Sum of every character level, used as a leaderboard tie-break.
    #[must_use]
    pub fn total_levels(&self) -> u32 {
        self.character_levels.iter().map(|lvl| u32::from(*lvl)).sum()
    }

    /// Repair a record loaded from storage so it satisfies the current roster
    /// and caps. Returns `true` when anything had to change.
    pub fn normalize(&mut self, cfg: &EconomyConfig) -> bool {
        let before = self.clone();
        self.character_levels.resize(cfg.character_count(), 0);
        for level in &mut self.character_levels {
            *level = (*level).min(cfg.max_level);
        }
        self.earn_upgrade_level = self.earn_upgrade_level.min(cfg.max_earn_upgrade);
        let max_unlocked = crate::economy::max_unlocked_character_index(self, cfg);
        if self.current_character_index > max_unlocked {
            self.current_character_index = max_unlocked;
        }
        *self != before
    }
}

/// Accept integer or fractional second counts; legacy saves wrote floats.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Whole(u64),
        Fractional(f64),
    }

    Ok(match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Whole(secs) => secs,
        RawTimestamp::Fractional(secs) => floor_f64_to_u64(secs),
    })
}
