//! Plain-text rendering of engine results.
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use clicker_game::{
    AchievementDefinition, AchievementStatus, ActionOutcome, BoostOutcome, CharacterSlot,
    DailyAvailability, DailyOutcome, EconomyConfig, EngineError, LeaderboardView, LevelUpOutcome,
    PlayerStatus, SelectOutcome, UpgradeOutcome,
};

/// `M min S sec`, used for boost timers.
#[must_use]
pub fn minutes_seconds(secs: u64) -> String {
    format!("{} min {} sec", secs / 60, secs % 60)
}

/// `HH:MM:SS`, used for the daily cooldown.
#[must_use]
pub fn clock(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3_600, (secs % 3_600) / 60, secs % 60)
}

fn date(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map_or_else(|| "unknown".to_string(), |dt| dt.format("%Y-%m-%d").to_string())
}

fn character_name(cfg: &EconomyConfig, index: usize) -> String {
    cfg.character_name(index)
        .map_or_else(|| format!("#{}", index + 1), str::to_string)
}

#[must_use]
pub fn action(outcome: &ActionOutcome, balance: u64) -> String {
    let mut extra = String::new();
    if outcome.crit {
        extra.push_str(" (critical hit!)");
    }
    if outcome.boost_active {
        extra.push_str(" (boost active)");
    }
    format!(
        "You clicked and earned {} coins{extra}.\nBalance: {balance} coins.",
        outcome.credited
    )
}

/// Summary for a batch of clicks.
#[must_use]
pub fn action_batch(clicks: u32, credited: u64, crits: u32, balance: u64) -> String {
    format!(
        "{clicks} clicks earned {credited} coins ({crits} critical).\nBalance: {balance} coins."
    )
}

#[must_use]
pub fn upgrade(outcome: &UpgradeOutcome, cfg: &EconomyConfig, balance: u64) -> String {
    let mut out = format!(
        "Earn upgrade bought for {} coins: level {}/{}, {} coins per click.",
        outcome.cost, outcome.new_level, cfg.max_earn_upgrade, outcome.base_earn
    );
    match outcome.next_cost {
        Some(cost) => {
            let _ = write!(out, "\nNext level costs {cost} coins.");
        }
        None => out.push_str("\nEarnings are now at the maximum level."),
    }
    let _ = write!(out, "\nBalance: {balance} coins.");
    out
}

#[must_use]
pub fn level_up(outcome: &LevelUpOutcome, cfg: &EconomyConfig, balance: u64) -> String {
    let name = character_name(cfg, outcome.character_index);
    let mut out = format!(
        "{name} raised to level {}/{} for {} coins.\nBalance: {balance} coins.",
        outcome.new_level, cfg.max_level, outcome.cost
    );
    if outcome.maxed {
        let _ = write!(out, "\n\nYou fully levelled {name}!");
    }
    if let Some(next) = outcome.unlocked_character {
        let _ = write!(
            out,
            "\nNext character unlocked: {}.",
            character_name(cfg, next)
        );
    }
    out
}

#[must_use]
pub fn boost(outcome: &BoostOutcome, balance: u64) -> String {
    let verb = if outcome.extended {
        "Boost extended"
    } else {
        "Boost active"
    };
    format!(
        "{verb}: earnings doubled for {}.\nBalance: {balance} coins.",
        minutes_seconds(outcome.remaining_secs)
    )
}

#[must_use]
pub fn select(outcome: &SelectOutcome, cfg: &EconomyConfig) -> String {
    format!(
        "You now play as {} (level {}/{}).",
        character_name(cfg, outcome.character_index),
        outcome.level,
        cfg.max_level
    )
}

#[must_use]
pub fn daily(outcome: &DailyOutcome, balance: u64) -> String {
    format!(
        "Daily bonus!\nStreak: {} days in a row.\nReward: {} coins.\nBalance: {balance} coins.",
        outcome.streak, outcome.reward
    )
}

/// Message for an expected refusal.
#[must_use]
pub fn refusal(err: &EngineError) -> String {
    match err {
        EngineError::InsufficientFunds {
            required,
            available,
        } => format!("Not enough coins: need {required}, you have {available}."),
        EngineError::AlreadyMaxed => "Earnings are already at the maximum level.".to_string(),
        EngineError::CharacterMaxed => {
            "This character is already at the maximum level.".to_string()
        }
        EngineError::LockedCharacter { requested, .. } => format!(
            "Character {} is locked. Max out the previous one first.",
            requested.saturating_add(1)
        ),
        EngineError::TooEarly { remaining_secs } => format!(
            "Daily bonus already claimed. Next one in {}.",
            clock(*remaining_secs)
        ),
        other => other.to_string(),
    }
}

/// Notice for every achievement unlocked by an operation.
#[must_use]
pub fn unlocks(unlocked: &[&AchievementDefinition], balance: u64) -> Option<String> {
    if unlocked.is_empty() {
        return None;
    }
    let notices: Vec<String> = unlocked
        .iter()
        .map(|def| {
            format!(
                "New achievement: {}\n{}\nReward: {} coins.",
                def.title, def.description, def.reward
            )
        })
        .collect();
    Some(format!("{}\nBalance: {balance} coins.", notices.join("\n\n")))
}

#[must_use]
pub fn stats(status: &PlayerStatus) -> String {
    let boost = if status.boost_remaining_secs > 0 {
        format!("active for {}", minutes_seconds(status.boost_remaining_secs))
    } else {
        "inactive".to_string()
    };
    let daily = match status.daily {
        DailyAvailability::Ready => "ready".to_string(),
        DailyAvailability::Cooldown { remaining_secs } => format!("in {}", clock(remaining_secs)),
    };
    let next_upgrade = status
        .next_upgrade_cost
        .map_or_else(|| "maxed".to_string(), |cost| format!("{cost} coins"));
    let current = &status.current_character;
    let mut out = String::new();
    let _ = writeln!(out, "Name: {}", status.display_name);
    let _ = writeln!(out, "Coins: {}", status.coins);
    let _ = writeln!(
        out,
        "Character: {} (level {}/{})",
        current.name, current.level, status.max_level
    );
    let _ = writeln!(
        out,
        "Earn upgrade: {}/{}, next {next_upgrade}",
        status.earn_upgrade_level, status.max_earn_upgrade
    );
    let _ = writeln!(out, "Base earn: {} coins/click", status.base_earn);
    let _ = writeln!(out, "Current earn: {} coins/click", status.effective_earn);
    let _ = writeln!(out, "Boost: {boost}");
    let _ = writeln!(out, "Daily bonus: {daily}, streak {} days", status.daily_streak);
    let _ = write!(out, "Playing since: {}", date(status.created_at));
    out
}

#[must_use]
pub fn characters(roster: &[CharacterSlot], cfg: &EconomyConfig) -> String {
    roster
        .iter()
        .map(|slot| {
            let marker = if slot.selected {
                ">"
            } else if slot.unlocked {
                " "
            } else {
                "x"
            };
            let cost = slot
                .next_level_cost
                .map_or_else(|| "maxed".to_string(), |cost| format!("next {cost}"));
            format!(
                "{marker} {}. {} (level {}/{}, {cost})",
                slot.index + 1,
                slot.name,
                slot.level,
                cfg.max_level
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn achievements(list: &[AchievementStatus]) -> String {
    let mut out = String::new();
    for status in list {
        let mark = if status.unlocked { "✅" } else { "❌" };
        let def = status.definition;
        let _ = writeln!(
            out,
            "{mark} {}\n   {}\n   Reward: {} coins",
            def.title, def.description, def.reward
        );
    }
    let unlocked = list.iter().filter(|status| status.unlocked).count();
    let _ = write!(out, "\nUnlocked: {unlocked} of {}.", list.len());
    out
}

#[must_use]
pub fn leaderboard(view: &LeaderboardView, cfg: &EconomyConfig) -> String {
    if view.entries.is_empty() {
        return "Nobody has played yet.".to_string();
    }
    let mut out = String::new();
    for entry in &view.entries {
        let _ = writeln!(
            out,
            "{}. {} - {} (level {}), total levels: {}, coins: {}",
            entry.position,
            entry.record.display_name,
            character_name(cfg, entry.power.best_character),
            entry.power.best_character_level,
            entry.power.total_levels,
            entry.power.coins
        );
    }
    if let Some(position) = view.viewer_position {
        let _ = write!(out, "\nYour position: {position} of {}.", view.total_players);
    }
    out.trim_end().to_string()
}
