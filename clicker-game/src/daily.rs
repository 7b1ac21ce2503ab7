//! Daily bonus claims with streak accounting.
use serde::Serialize;

use crate::achievements::check_coin_thresholds;
use crate::config::EconomyConfig;
use crate::error::EngineError;
use crate::progression::Unlocks;
use crate::record::{PlayerRecord, Timestamp};

/// Result of a successful claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyOutcome {
    pub reward: u64,
    pub streak: u32,
    pub unlocked: Unlocks,
}

/// Whether a claim is possible at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DailyAvailability {
    Ready,
    Cooldown { remaining_secs: u64 },
}

/// Cooldown check shared by claims and status views.
#[must_use]
pub const fn daily_availability(
    record: &PlayerRecord,
    now: Timestamp,
    cfg: &EconomyConfig,
) -> DailyAvailability {
    if record.last_daily_claim == 0 {
        return DailyAvailability::Ready;
    }
    let elapsed = now.saturating_sub(record.last_daily_claim);
    if elapsed < cfg.daily_cooldown_secs {
        return DailyAvailability::Cooldown {
            remaining_secs: cfg.daily_cooldown_secs - elapsed,
        };
    }
    DailyAvailability::Ready
}

/// Streak after a claim at `now`; assumes the cooldown already passed.
///
/// Claims up to two cooldowns after the previous one continue the streak,
/// anything later starts over.
#[must_use]
pub const fn next_streak(record: &PlayerRecord, now: Timestamp, cfg: &EconomyConfig) -> u32 {
    if record.last_daily_claim == 0 {
        return 1;
    }
    let elapsed = now.saturating_sub(record.last_daily_claim);
    if elapsed <= cfg.daily_cooldown_secs.saturating_mul(2) {
        record.daily_streak.saturating_add(1)
    } else {
        1
    }
}

/// Reward for a claim landing on `streak`; growth stops at the streak cap.
#[must_use]
pub fn daily_reward(streak: u32, cfg: &EconomyConfig) -> u64 {
    let effective = streak.clamp(1, cfg.daily_streak_cap.max(1));
    cfg.daily_base_reward
        .saturating_add(u64::from(effective - 1).saturating_mul(cfg.daily_streak_bonus))
}

/// Claim the daily bonus using a single `now` snapshot.
///
/// # Errors
///
/// `TooEarly` while the cooldown is still running; the record is not touched.
pub fn claim_daily(
    record: &mut PlayerRecord,
    now: Timestamp,
    cfg: &EconomyConfig,
) -> Result<DailyOutcome, EngineError> {
    if let DailyAvailability::Cooldown { remaining_secs } = daily_availability(record, now, cfg) {
        return Err(EngineError::TooEarly { remaining_secs });
    }
    let streak = next_streak(record, now, cfg);
    let reward = daily_reward(streak, cfg);

    record.daily_streak = streak;
    record.last_daily_claim = now;
    record.coins = record.coins.saturating_add(reward);
    let unlocked = check_coin_thresholds(record);
    Ok(DailyOutcome {
        reward,
        streak,
        unlocked,
    })
}
