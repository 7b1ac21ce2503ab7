//! One-time achievements and their coin rewards.
//!
//! Coin thresholds are derived from the record. Event achievements are
//! granted by the operation that witnessed the event (buying a boost, maxing
//! a character); the call site is the authority for those, not the record.
use serde::Serialize;

use crate::constants::{
    ACHIEVEMENT_COINS_1000, ACHIEVEMENT_COINS_10000, ACHIEVEMENT_FIRST_BOOST,
    ACHIEVEMENT_FIRST_MAX_CHARACTER, COIN_THRESHOLD_KEYS,
};
use crate::record::PlayerRecord;

/// Something an operation observed that can satisfy an event achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementEvent {
    BoostPurchased,
    CharacterMaxed,
}

/// How an achievement decides whether it is earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    CoinsAtLeast(u64),
    Event(AchievementEvent),
}

impl Predicate {
    fn holds(self, record: &PlayerRecord, event: Option<AchievementEvent>) -> bool {
        match self {
            Self::CoinsAtLeast(threshold) => record.coins >= threshold,
            Self::Event(expected) => event == Some(expected),
        }
    }
}

/// Static catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementDefinition {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub reward: u64,
    pub predicate: Predicate,
}

/// Catalog entry paired with the player's unlock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementStatus {
    pub definition: &'static AchievementDefinition,
    pub unlocked: bool,
}

pub static ACHIEVEMENTS: [AchievementDefinition; 4] = [
    AchievementDefinition {
        key: ACHIEVEMENT_COINS_1000,
        title: "Fat Start",
        description: "Hold 1 000 coins on your balance.",
        reward: 200,
        predicate: Predicate::CoinsAtLeast(1_000),
    },
    AchievementDefinition {
        key: ACHIEVEMENT_COINS_10000,
        title: "Local Oligarch",
        description: "Hold 10 000 coins on your balance.",
        reward: 1_000,
        predicate: Predicate::CoinsAtLeast(10_000),
    },
    AchievementDefinition {
        key: ACHIEVEMENT_FIRST_BOOST,
        title: "Spice Lover",
        description: "Buy a boost at least once.",
        reward: 500,
        predicate: Predicate::Event(AchievementEvent::BoostPurchased),
    },
    AchievementDefinition {
        key: ACHIEVEMENT_FIRST_MAX_CHARACTER,
        title: "First Maximum",
        description: "Raise any character to the maximum level.",
        reward: 1_000,
        predicate: Predicate::Event(AchievementEvent::CharacterMaxed),
    },
];

#[must_use]
pub fn find_achievement(key: &str) -> Option<&'static AchievementDefinition> {
    ACHIEVEMENTS.iter().find(|def| def.key == key)
}

/// Unlock `key` if it is known, not yet held, and its predicate holds.
///
/// Credits the reward and returns the definition on a fresh unlock; any
/// repeated call is a no-op returning `None`.
pub fn evaluate_and_unlock(
    record: &mut PlayerRecord,
    key: &str,
    event: Option<AchievementEvent>,
) -> Option<&'static AchievementDefinition> {
    let definition = find_achievement(key)?;
    if record.has_achievement(key) || !definition.predicate.holds(record, event) {
        return None;
    }
    record.unlocked_achievements.insert(key.to_string());
    record.coins = record.coins.saturating_add(definition.reward);
    log::info!("achievement `{key}` unlocked (+{} coins)", definition.reward);
    Some(definition)
}

/// Re-check the coin-threshold achievements in catalog order.
pub fn check_coin_thresholds(record: &mut PlayerRecord) -> Vec<&'static AchievementDefinition> {
    COIN_THRESHOLD_KEYS
        .iter()
        .filter_map(|key| evaluate_and_unlock(record, key, None))
        .collect()
}

/// Every catalog entry with the player's unlock flag.
#[must_use]
pub fn list_achievements(record: &PlayerRecord) -> Vec<AchievementStatus> {
    ACHIEVEMENTS
        .iter()
        .map(|definition| AchievementStatus {
            definition,
            unlocked: record.has_achievement(definition.key),
        })
        .collect()
}

/// Number of catalog achievements the player holds.
#[must_use]
pub fn unlocked_count(record: &PlayerRecord) -> usize {
    ACHIEVEMENTS
        .iter()
        .filter(|def| record.has_achievement(def.key))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_unlock_is_idempotent() {
        let mut record = PlayerRecord {
            coins: 1_000,
            ..PlayerRecord::default()
        };
        let first = evaluate_and_unlock(&mut record, ACHIEVEMENT_COINS_1000, None);
        assert_eq!(first.map(|def| def.key), Some(ACHIEVEMENT_COINS_1000));
        assert_eq!(record.coins, 1_200);

        assert!(evaluate_and_unlock(&mut record, ACHIEVEMENT_COINS_1000, None).is_none());
        assert_eq!(record.coins, 1_200);
        assert_eq!(record.unlocked_achievements.len(), 1);
    }

    #[test]
    fn threshold_below_limit_stays_locked() {
        let mut record = PlayerRecord {
            coins: 999,
            ..PlayerRecord::default()
        };
        assert!(check_coin_thresholds(&mut record).is_empty());
        assert_eq!(record.coins, 999);
    }

    #[test]
    fn reward_can_cascade_into_next_threshold() {
        let mut record = PlayerRecord {
            coins: 9_850,
            ..PlayerRecord::default()
        };
        let unlocked: Vec<&str> = check_coin_thresholds(&mut record)
            .into_iter()
            .map(|def| def.key)
            .collect();
        assert_eq!(unlocked, vec![ACHIEVEMENT_COINS_1000, ACHIEVEMENT_COINS_10000]);
        assert_eq!(record.coins, 9_850 + 200 + 1_000);
    }

    #[test]
    fn event_achievements_need_their_event() {
        let mut record = PlayerRecord::default();
        assert!(evaluate_and_unlock(&mut record, ACHIEVEMENT_FIRST_BOOST, None).is_none());
        assert!(
            evaluate_and_unlock(
                &mut record,
                ACHIEVEMENT_FIRST_BOOST,
                Some(AchievementEvent::CharacterMaxed)
            )
            .is_none()
        );
        let unlocked = evaluate_and_unlock(
            &mut record,
            ACHIEVEMENT_FIRST_BOOST,
            Some(AchievementEvent::BoostPurchased),
        );
        assert_eq!(unlocked.map(|def| def.reward), Some(500));
        assert_eq!(record.coins, 500);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut record = PlayerRecord {
            coins: 50_000,
            ..PlayerRecord::default()
        };
        assert!(evaluate_and_unlock(&mut record, "coins_1000000", None).is_none());
        assert_eq!(record.coins, 50_000);
        assert!(record.unlocked_achievements.is_empty());
    }

    #[test]
    fn listing_reports_unlock_flags() {
        let mut record = PlayerRecord::default();
        record
            .unlocked_achievements
            .insert(ACHIEVEMENT_FIRST_MAX_CHARACTER.to_string());
        record.unlocked_achievements.insert("retired_key".to_string());
        let listing = list_achievements(&record);
        assert_eq!(listing.len(), ACHIEVEMENTS.len());
        let flags: Vec<bool> = listing.iter().map(|status| status.unlocked).collect();
        assert_eq!(flags, vec![false, false, false, true]);
        assert_eq!(unlocked_count(&record), 1);
    }
}
