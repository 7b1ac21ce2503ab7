//! Clicker Game Engine
//!
//! Platform-agnostic economy rules for a clicker game: coin accrual, earn
//! upgrades, character progression, timed boosts, daily bonuses, achievements
//! and the leaderboard. Front ends supply storage, a clock and randomness.

pub mod achievements;
pub mod config;
pub mod constants;
pub mod daily;
pub mod economy;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod numbers;
pub mod ports;
pub mod progression;
pub mod record;
pub mod status;
pub mod store;

// Re-export commonly used types
pub use achievements::{
    ACHIEVEMENTS, AchievementDefinition, AchievementEvent, AchievementStatus, Predicate,
    check_coin_thresholds, evaluate_and_unlock, find_achievement, list_achievements,
    unlocked_count,
};
pub use config::{ConfigError, EconomyConfig};
pub use daily::{DailyAvailability, DailyOutcome, claim_daily, daily_availability, daily_reward};
pub use economy::{
    CritRoll, base_earn_per_action, boost_remaining_secs, character_level_cost,
    effective_earn_per_action, is_boost_active, max_unlocked_character_index, next_upgrade_cost,
    roll_crit,
};
pub use engine::{ClickerEngine, Committed};
pub use error::EngineError;
pub use leaderboard::{LeaderboardView, Power, RankedEntry, position_of, rank};
pub use ports::{Clock, FixedClock, FixedRoll, RandomSource, ScriptedRoll, SeededRoll, SystemClock};
pub use progression::{
    ActionOutcome, BoostOutcome, LevelUpOutcome, SelectOutcome, Unlocks, UpgradeOutcome,
    level_up_character, perform_action, purchase_boost, purchase_earn_upgrade, select_character,
};
pub use record::{CharacterLevels, PlayerIdentity, PlayerRecord, Timestamp};
pub use status::{CharacterSlot, PlayerStatus, character_roster};
pub use store::{MemoryStore, PlayerStore};
