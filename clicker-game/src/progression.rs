//! Record-level operations: actions, purchases and character progression.
//!
//! Each operation validates against the record before touching it, so a
//! refused call leaves the record exactly as it was.
use serde::Serialize;

use crate::achievements::{
    AchievementDefinition, AchievementEvent, check_coin_thresholds, evaluate_and_unlock,
};
use crate::config::EconomyConfig;
use crate::constants::{ACHIEVEMENT_FIRST_BOOST, ACHIEVEMENT_FIRST_MAX_CHARACTER};
use crate::economy::{
    base_earn_per_action, boost_remaining_secs, character_level_cost, effective_earn_per_action,
    is_boost_active, max_unlocked_character_index, next_upgrade_cost, roll_crit,
};
use crate::error::EngineError;
use crate::ports::RandomSource;
use crate::record::{PlayerRecord, Timestamp};

/// Achievements granted as a side effect of an operation.
pub type Unlocks = Vec<&'static AchievementDefinition>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub credited: u64,
    pub crit: bool,
    pub boost_active: bool,
    pub unlocked: Unlocks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeOutcome {
    pub cost: u64,
    pub new_level: u8,
    pub base_earn: u64,
    pub next_cost: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelUpOutcome {
    pub character_index: usize,
    pub cost: u64,
    pub new_level: u8,
    pub maxed: bool,
    /// Slot opened by this level-up, if any.
    pub unlocked_character: Option<usize>,
    pub unlocked: Unlocks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoostOutcome {
    pub cost: u64,
    pub active_until: Timestamp,
    pub remaining_secs: u64,
    /// True when the purchase stacked onto a boost that was still running.
    pub extended: bool,
    pub unlocked: Unlocks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOutcome {
    pub character_index: usize,
    pub level: u8,
}

/// Refuse when `cost` exceeds the balance.
fn ensure_affordable(record: &PlayerRecord, cost: u64) -> Result<(), EngineError> {
    if record.coins < cost {
        return Err(EngineError::InsufficientFunds {
            required: cost,
            available: record.coins,
        });
    }
    Ok(())
}

/// One accrual action. Never fails.
pub fn perform_action(
    record: &mut PlayerRecord,
    now: Timestamp,
    cfg: &EconomyConfig,
    rng: &mut dyn RandomSource,
) -> ActionOutcome {
    let boost_active = is_boost_active(record, now);
    let per_action = effective_earn_per_action(record, now, cfg);
    let roll = roll_crit(per_action, cfg, rng);
    record.coins = record.coins.saturating_add(roll.amount);
    let unlocked = check_coin_thresholds(record);
    ActionOutcome {
        credited: roll.amount,
        crit: roll.crit,
        boost_active,
        unlocked,
    }
}

/// Buy the next earn-rate level.
///
/// # Errors
///
/// `AlreadyMaxed` at the cap, `InsufficientFunds` when the price is out of reach.
pub fn purchase_earn_upgrade(
    record: &mut PlayerRecord,
    cfg: &EconomyConfig,
) -> Result<UpgradeOutcome, EngineError> {
    let cost = next_upgrade_cost(record.earn_upgrade_level, cfg).ok_or(EngineError::AlreadyMaxed)?;
    ensure_affordable(record, cost)?;

    record.coins -= cost;
    record.earn_upgrade_level += 1;
    Ok(UpgradeOutcome {
        cost,
        new_level: record.earn_upgrade_level,
        base_earn: base_earn_per_action(record.earn_upgrade_level),
        next_cost: next_upgrade_cost(record.earn_upgrade_level, cfg),
    })
}

/// Raise the selected character by one level.
///
/// # Errors
///
/// `CharacterMaxed` at the cap, `InsufficientFunds` when the price is out of
/// reach, `LockedCharacter` if the selection points outside the roster.
pub fn level_up_character(
    record: &mut PlayerRecord,
    cfg: &EconomyConfig,
) -> Result<LevelUpOutcome, EngineError> {
    let index = record.current_character_index;
    let Some(current) = record.character_levels.get(index).copied() else {
        return Err(EngineError::LockedCharacter {
            requested: index,
            max_unlocked: max_unlocked_character_index(record, cfg),
        });
    };
    if current >= cfg.max_level {
        return Err(EngineError::CharacterMaxed);
    }
    let target = current + 1;
    let cost = character_level_cost(index, target, cfg);
    ensure_affordable(record, cost)?;

    let frontier_before = max_unlocked_character_index(record, cfg);
    record.coins -= cost;
    record.character_levels[index] = target;

    let maxed = target == cfg.max_level;
    let mut unlocked_character = None;
    let mut unlocked = Unlocks::new();
    if maxed {
        let frontier = max_unlocked_character_index(record, cfg);
        if frontier > frontier_before && frontier > index {
            log::info!("character slot {frontier} unlocked");
            unlocked_character = Some(frontier);
        }
        unlocked.extend(evaluate_and_unlock(
            record,
            ACHIEVEMENT_FIRST_MAX_CHARACTER,
            Some(AchievementEvent::CharacterMaxed),
        ));
    }
    Ok(LevelUpOutcome {
        character_index: index,
        cost,
        new_level: target,
        maxed,
        unlocked_character,
        unlocked,
    })
}

/// Buy a boost, stacking onto any boost still running at `now`.
///
/// # Errors
///
/// `InsufficientFunds` when the boost price is out of reach.
pub fn purchase_boost(
    record: &mut PlayerRecord,
    now: Timestamp,
    cfg: &EconomyConfig,
) -> Result<BoostOutcome, EngineError> {
    ensure_affordable(record, cfg.boost_cost)?;

    record.coins -= cfg.boost_cost;
    let extended = is_boost_active(record, now);
    let start = if extended {
        record.boost_active_until
    } else {
        now
    };
    record.boost_active_until = start.saturating_add(cfg.boost_duration_secs);
    let unlocked: Unlocks = evaluate_and_unlock(
        record,
        ACHIEVEMENT_FIRST_BOOST,
        Some(AchievementEvent::BoostPurchased),
    )
    .into_iter()
    .collect();
    Ok(BoostOutcome {
        cost: cfg.boost_cost,
        active_until: record.boost_active_until,
        remaining_secs: boost_remaining_secs(record, now),
        extended,
        unlocked,
    })
}

/// Switch the active character.
///
/// # Errors
///
/// `LockedCharacter` when `index` lies beyond the unlock frontier.
pub fn select_character(
    record: &mut PlayerRecord,
    index: usize,
    cfg: &EconomyConfig,
) -> Result<SelectOutcome, EngineError> {
    let max_unlocked = max_unlocked_character_index(record, cfg);
    if index > max_unlocked {
        return Err(EngineError::LockedCharacter {
            requested: index,
            max_unlocked,
        });
    }
    record.current_character_index = index;
    Ok(SelectOutcome {
        character_index: index,
        level: record.level_of(index),
    })
}
