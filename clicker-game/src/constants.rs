//! Centralized balance and tuning constants for the clicker economy.
//!
//! These values are the defaults behind [`crate::EconomyConfig`]. Keeping them
//! together means the shipped balance can only change through reviewed code,
//! while operators can still override individual knobs with a config file.

// Roster --------------------------------------------------------------------
pub(crate) const CHARACTER_ROSTER: [&str; 7] = [
    "Gitin", "Abus", "Makhach", "Dzhamal", "Azamat", "Omarov", "Zaipa",
];
pub(crate) const MAX_CHARACTER_LEVEL: u8 = 10;

// Earn-rate upgrades --------------------------------------------------------
pub(crate) const MAX_EARN_UPGRADE: u8 = 25;
pub(crate) const EARN_UPGRADE_BASE_COST: u64 = 250;
pub(crate) const UNUPGRADED_EARN_PER_ACTION: u64 = 1;
pub(crate) const FIRST_UPGRADE_EARN_PER_ACTION: u64 = 25;

// Character level pricing ---------------------------------------------------
pub(crate) const CHARACTER_BASE_COST: u64 = 1_500;
pub(crate) const CHARACTER_LEVEL_STEP: u64 = 500;
pub(crate) const CHARACTER_COST_GROWTH: f64 = 1.2;

// Boost ---------------------------------------------------------------------
pub(crate) const BOOST_COST: u64 = 1_000;
pub(crate) const BOOST_DURATION_SECS: u64 = 5 * 60;
pub(crate) const BOOST_MULTIPLIER: u64 = 2;

// Critical actions ----------------------------------------------------------
pub(crate) const CRIT_CHANCE: f64 = 0.05;
pub(crate) const CRIT_MULTIPLIER: u64 = 5;

// Daily bonus ---------------------------------------------------------------
pub(crate) const DAILY_COOLDOWN_SECS: u64 = 24 * 60 * 60;
pub(crate) const DAILY_BASE_REWARD: u64 = 500;
pub(crate) const DAILY_STREAK_BONUS: u64 = 250;
pub(crate) const DAILY_STREAK_CAP: u32 = 7;

// Achievement keys ----------------------------------------------------------
pub const ACHIEVEMENT_COINS_1000: &str = "coins_1000";
pub const ACHIEVEMENT_COINS_10000: &str = "coins_10000";
pub const ACHIEVEMENT_FIRST_BOOST: &str = "first_latyao";
pub const ACHIEVEMENT_FIRST_MAX_CHARACTER: &str = "first_max_char";

/// Coin-threshold achievements, checked in this order after every credit.
pub const COIN_THRESHOLD_KEYS: [&str; 2] = [ACHIEVEMENT_COINS_1000, ACHIEVEMENT_COINS_10000];
