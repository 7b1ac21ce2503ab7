//! Read-only views front ends render: the stats sheet and the roster.
use serde::Serialize;

use crate::config::EconomyConfig;
use crate::daily::{DailyAvailability, daily_availability};
use crate::economy::{
    base_earn_per_action, boost_remaining_secs, character_level_cost, effective_earn_per_action,
    max_unlocked_character_index, next_upgrade_cost,
};
use crate::record::{PlayerRecord, Timestamp};

/// One roster slot as seen by a particular player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterSlot {
    pub index: usize,
    pub name: String,
    pub level: u8,
    pub unlocked: bool,
    pub selected: bool,
    /// Price of the next level, `None` once maxed.
    pub next_level_cost: Option<u64>,
}

/// Everything the stats screen shows, computed from one `now` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStatus {
    pub display_name: String,
    pub coins: u64,
    pub earn_upgrade_level: u8,
    pub max_earn_upgrade: u8,
    pub base_earn: u64,
    pub effective_earn: u64,
    pub next_upgrade_cost: Option<u64>,
    pub boost_remaining_secs: u64,
    pub current_character: CharacterSlot,
    pub max_level: u8,
    pub max_unlocked_index: usize,
    pub daily: DailyAvailability,
    pub daily_streak: u32,
    pub created_at: Timestamp,
}

impl PlayerStatus {
    #[must_use]
    pub fn of(record: &PlayerRecord, now: Timestamp, cfg: &EconomyConfig) -> Self {
        let max_unlocked_index = max_unlocked_character_index(record, cfg);
        let current_character =
            slot(record, record.current_character_index, max_unlocked_index, cfg);
        Self {
            display_name: record.display_name.clone(),
            coins: record.coins,
            earn_upgrade_level: record.earn_upgrade_level,
            max_earn_upgrade: cfg.max_earn_upgrade,
            base_earn: base_earn_per_action(record.earn_upgrade_level),
            effective_earn: effective_earn_per_action(record, now, cfg),
            next_upgrade_cost: next_upgrade_cost(record.earn_upgrade_level, cfg),
            boost_remaining_secs: boost_remaining_secs(record, now),
            current_character,
            max_level: cfg.max_level,
            max_unlocked_index,
            daily: daily_availability(record, now, cfg),
            daily_streak: record.daily_streak,
            created_at: record.created_at,
        }
    }
}

fn slot(
    record: &PlayerRecord,
    index: usize,
    max_unlocked: usize,
    cfg: &EconomyConfig,
) -> CharacterSlot {
    let level = record.level_of(index);
    CharacterSlot {
        index,
        name: cfg
            .character_name(index)
            .map_or_else(|| format!("#{}", index + 1), str::to_string),
        level,
        unlocked: index <= max_unlocked,
        selected: index == record.current_character_index,
        next_level_cost: (level < cfg.max_level)
            .then(|| character_level_cost(index, level + 1, cfg)),
    }
}

/// The full roster in order, flagged with unlock and selection state.
#[must_use]
pub fn character_roster(record: &PlayerRecord, cfg: &EconomyConfig) -> Vec<CharacterSlot> {
    let max_unlocked = max_unlocked_character_index(record, cfg);
    (0..cfg.character_count())
        .map(|index| slot(record, index, max_unlocked, cfg))
        .collect()
}
