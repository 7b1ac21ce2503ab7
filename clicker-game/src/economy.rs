//! Earn rates, price curves and boost state.
//!
//! Everything here is a pure function of a [`PlayerRecord`], the
//! [`EconomyConfig`] and, where it matters, the caller's `now` snapshot.
use crate::config::EconomyConfig;
use crate::constants::{FIRST_UPGRADE_EARN_PER_ACTION, UNUPGRADED_EARN_PER_ACTION};
use crate::numbers::{floor_f64_to_u64, index_to_f64, u64_to_f64};
use crate::ports::RandomSource;
use crate::record::{PlayerRecord, Timestamp};

/// Coins a single action yields at `level`, before boosts and crits.
///
/// Level 0 pays 1; the first upgrade jumps to 25 and each further level adds 1.
#[must_use]
pub const fn base_earn_per_action(level: u8) -> u64 {
    if level == 0 {
        return UNUPGRADED_EARN_PER_ACTION;
    }
    FIRST_UPGRADE_EARN_PER_ACTION + (level as u64 - 1)
}

#[must_use]
pub const fn is_boost_active(record: &PlayerRecord, now: Timestamp) -> bool {
    now < record.boost_active_until
}

/// Seconds of boost left at `now`, zero when inactive.
#[must_use]
pub const fn boost_remaining_secs(record: &PlayerRecord, now: Timestamp) -> u64 {
    record.boost_active_until.saturating_sub(now)
}

/// Per-action yield including an active boost.
#[must_use]
pub fn effective_earn_per_action(
    record: &PlayerRecord,
    now: Timestamp,
    cfg: &EconomyConfig,
) -> u64 {
    let base = base_earn_per_action(record.earn_upgrade_level);
    if is_boost_active(record, now) {
        base.saturating_mul(cfg.boost_multiplier)
    } else {
        base
    }
}

/// Price of the next earn upgrade, or `None` once `level` reached the cap.
#[must_use]
pub fn next_upgrade_cost(level: u8, cfg: &EconomyConfig) -> Option<u64> {
    if level >= cfg.max_earn_upgrade {
        return None;
    }
    Some(cfg.upgrade_base_cost.saturating_mul(u64::from(level) + 1))
}

/// Price of raising character `char_index` to `target_level`.
///
/// Linear in the target level, compounding per roster slot.
#[must_use]
pub fn character_level_cost(char_index: usize, target_level: u8, cfg: &EconomyConfig) -> u64 {
    let steps = u64::from(target_level.saturating_sub(1));
    let base = cfg
        .character_base_cost
        .saturating_add(steps.saturating_mul(cfg.character_level_step));
    let factor = cfg.character_cost_growth.powf(index_to_f64(char_index));
    floor_f64_to_u64(u64_to_f64(base) * factor)
}

/// Highest roster slot the player may select.
///
/// Slot `i + 1` opens once slot `i` is maxed; the scan stops at the first
/// slot below the cap.
#[must_use]
pub fn max_unlocked_character_index(record: &PlayerRecord, cfg: &EconomyConfig) -> usize {
    let last = cfg.character_count().saturating_sub(1);
    record
        .character_levels
        .iter()
        .take(last)
        .take_while(|level| **level >= cfg.max_level)
        .count()
}

/// Result of a single crit roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CritRoll {
    pub amount: u64,
    pub crit: bool,
}

/// Roll the crit chance once and scale `base` on success.
pub fn roll_crit(base: u64, cfg: &EconomyConfig, rng: &mut dyn RandomSource) -> CritRoll {
    let crit = rng.roll() < cfg.crit_chance;
    let amount = if crit {
        base.saturating_mul(cfg.crit_multiplier)
    } else {
        base
    };
    CritRoll { amount, crit }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FixedRoll;

    fn record_with_levels(levels: &[u8]) -> PlayerRecord {
        let cfg = EconomyConfig::default();
        let mut record = PlayerRecord::new("t", 0, &cfg);
        for (slot, level) in levels.iter().enumerate() {
            record.character_levels[slot] = *level;
        }
        record
    }

    #[test]
    fn base_earn_follows_upgrade_ladder() {
        assert_eq!(base_earn_per_action(0), 1);
        assert_eq!(base_earn_per_action(1), 25);
        assert_eq!(base_earn_per_action(2), 26);
        assert_eq!(base_earn_per_action(25), 49);
    }

    #[test]
    fn boost_doubles_until_expiry() {
        let cfg = EconomyConfig::default();
        let mut record = record_with_levels(&[]);
        record.earn_upgrade_level = 3;
        record.boost_active_until = 1_000;
        assert_eq!(effective_earn_per_action(&record, 999, &cfg), 54);
        assert_eq!(boost_remaining_secs(&record, 999), 1);
        assert_eq!(effective_earn_per_action(&record, 1_000, &cfg), 27);
        assert_eq!(boost_remaining_secs(&record, 1_500), 0);
    }

    #[test]
    fn upgrade_cost_is_linear_and_capped() {
        let cfg = EconomyConfig::default();
        assert_eq!(next_upgrade_cost(0, &cfg), Some(250));
        assert_eq!(next_upgrade_cost(1, &cfg), Some(500));
        assert_eq!(next_upgrade_cost(24, &cfg), Some(6_250));
        assert_eq!(next_upgrade_cost(25, &cfg), None);

        let costs: Vec<u64> = (0..cfg.max_earn_upgrade)
            .filter_map(|lvl| next_upgrade_cost(lvl, &cfg))
            .collect();
        assert!(costs.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn character_costs_match_price_table() {
        let cfg = EconomyConfig::default();
        assert_eq!(character_level_cost(0, 1, &cfg), 1_500);
        assert_eq!(character_level_cost(0, 2, &cfg), 2_000);
        assert_eq!(character_level_cost(0, 10, &cfg), 6_000);
        assert_eq!(character_level_cost(1, 1, &cfg), 1_800);
        assert_eq!(character_level_cost(2, 1, &cfg), 2_160);
    }

    #[test]
    fn character_costs_strictly_increase_on_both_axes() {
        let cfg = EconomyConfig::default();
        for slot in 0..cfg.character_count() {
            for target in 1..=cfg.max_level {
                let cost = character_level_cost(slot, target, &cfg);
                if target < cfg.max_level {
                    assert!(cost < character_level_cost(slot, target + 1, &cfg));
                }
                if slot + 1 < cfg.character_count() {
                    assert!(cost < character_level_cost(slot + 1, target, &cfg));
                }
            }
        }
    }

    #[test]
    fn unlock_frontier_requires_contiguous_maxed_slots() {
        let cfg = EconomyConfig::default();
        assert_eq!(max_unlocked_character_index(&record_with_levels(&[]), &cfg), 0);
        assert_eq!(
            max_unlocked_character_index(&record_with_levels(&[10]), &cfg),
            1
        );
        assert_eq!(
            max_unlocked_character_index(&record_with_levels(&[10, 9, 10]), &cfg),
            1
        );
        assert_eq!(
            max_unlocked_character_index(&record_with_levels(&[10; 7]), &cfg),
            6
        );
    }

    #[test]
    fn crit_roll_respects_threshold() {
        let cfg = EconomyConfig::default();
        let hit = roll_crit(26, &cfg, &mut FixedRoll::new(0.01));
        assert_eq!(hit, CritRoll { amount: 130, crit: true });
        let miss = roll_crit(26, &cfg, &mut FixedRoll::new(0.05));
        assert_eq!(miss, CritRoll { amount: 26, crit: false });
    }
}
