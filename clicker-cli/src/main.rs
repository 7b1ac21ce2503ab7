mod file_store;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use clicker_game::{
    AchievementDefinition, ClickerEngine, Committed, EconomyConfig, EngineError, PlayerIdentity,
    SeededRoll, SystemClock,
};
use file_store::JsonFileStore;

type Engine = ClickerEngine<JsonFileStore, SystemClock, SeededRoll>;

/// Exit status for an expected refusal such as "not enough coins".
const REFUSED_EXIT_CODE: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "clicker", version)]
#[command(about = "Play the clicker game economy from the terminal")]
struct Args {
    /// Player data file, shared by every player
    #[arg(long, default_value = "game_data.json")]
    data: PathBuf,

    /// Player id
    #[arg(long)]
    player: String,

    /// Display name (defaults to Player_<id>)
    #[arg(long)]
    name: Option<String>,

    /// Economy config JSON overriding the default balance
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for crit rolls (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Earn coins
    Click {
        /// Number of clicks to perform
        #[arg(
            long,
            default_value_t = 1,
            value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..)
        )]
        times: u32,
    },
    /// Buy the next earn upgrade
    Upgrade,
    /// Level up the selected character
    LevelUp,
    /// Buy a boost that doubles earnings for a while
    Boost,
    /// Switch to another unlocked character (numbered from 1)
    Select {
        #[arg(value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        slot: usize,
    },
    /// Claim the daily bonus
    Daily,
    /// Show your stats
    Stats,
    /// List achievements
    Achievements,
    /// List characters
    Characters,
    /// Show the top players
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let store = JsonFileStore::open(&args.data)
        .with_context(|| format!("failed to open {}", args.data.display()))?;
    let _session = store
        .lock_session()
        .with_context(|| format!("failed to lock {}", args.data.display()))?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("crit seed {seed}");
    let engine = ClickerEngine::with_config(
        store,
        SystemClock,
        SeededRoll::from_user_seed(seed),
        config,
    )
    .context("invalid economy configuration")?;

    let identity = match args.name.clone() {
        Some(name) => PlayerIdentity::new(args.player.clone(), name),
        None => PlayerIdentity::anonymous(args.player.clone()),
    };

    match run(&engine, &identity, &args.command) {
        Ok(()) => Ok(()),
        Err(err) if err.is_domain() => {
            println!("{}", render::refusal(&err).yellow());
            std::process::exit(REFUSED_EXIT_CODE);
        }
        Err(err) => Err(err.into()),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: Option<&Path>) -> Result<EconomyConfig> {
    let Some(path) = path else {
        return Ok(EconomyConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    EconomyConfig::from_json(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

/// Print the save warning, if any, and any achievement notices.
fn settle<T>(committed: &Committed<T>, unlocked: &[&AchievementDefinition]) {
    if let Some(notice) = render::unlocks(unlocked, committed.record.coins) {
        println!("\n{}", notice.bright_green());
    }
    if let Some(warning) = &committed.warning {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
}

fn run(engine: &Engine, identity: &PlayerIdentity, command: &Command) -> Result<(), EngineError> {
    let cfg = engine.config();
    match command {
        Command::Click { times } => click(engine, identity, *times)?,
        Command::Upgrade => {
            let committed = engine.purchase_earn_upgrade(identity)?;
            println!("{}", render::upgrade(&committed.value, cfg, committed.record.coins));
            settle(&committed, &[]);
        }
        Command::LevelUp => {
            let committed = engine.level_up_character(identity)?;
            println!("{}", render::level_up(&committed.value, cfg, committed.record.coins));
            settle(&committed, &committed.value.unlocked);
        }
        Command::Boost => {
            let committed = engine.purchase_boost(identity)?;
            println!("{}", render::boost(&committed.value, committed.record.coins));
            settle(&committed, &committed.value.unlocked);
        }
        Command::Select { slot } => {
            let committed = engine.select_character(identity, slot - 1)?;
            println!("{}", render::select(&committed.value, cfg));
            settle(&committed, &[]);
        }
        Command::Daily => {
            let committed = engine.claim_daily(identity)?;
            println!("{}", render::daily(&committed.value, committed.record.coins));
            settle(&committed, &committed.value.unlocked);
        }
        Command::Stats => {
            let committed = engine.status(identity)?;
            println!("{}", "Your stats".bright_cyan().bold());
            println!("{}", render::stats(&committed.value));
            settle(&committed, &[]);
        }
        Command::Achievements => {
            let committed = engine.list_achievements(identity)?;
            println!("{}", "Achievements".bright_cyan().bold());
            println!("{}", render::achievements(&committed.value));
            settle(&committed, &[]);
        }
        Command::Characters => {
            let committed = engine.characters(identity)?;
            println!("{}", "Characters".bright_cyan().bold());
            println!("{}", render::characters(&committed.value, cfg));
            settle(&committed, &[]);
        }
        Command::Leaderboard { limit } => {
            // Make sure the caller is ranked even on first contact.
            let committed = engine.get_or_create_record(identity)?;
            settle(&committed, &[]);
            let view = engine.leaderboard(*limit, Some(&identity.id))?;
            println!("{}", "Leaderboard".bright_cyan().bold());
            println!("{}", render::leaderboard(&view, cfg));
        }
    }
    Ok(())
}

fn click(engine: &Engine, identity: &PlayerIdentity, times: u32) -> Result<(), EngineError> {
    let mut done = 0_u32;
    let mut credited = 0_u64;
    let mut crits = 0_u32;
    let mut balance = 0_u64;
    while done < times {
        let committed = engine.perform_action(identity)?;
        done += 1;
        credited = credited.saturating_add(committed.value.credited);
        crits += u32::from(committed.value.crit);
        balance = committed.record.coins;
        if times == 1 {
            println!("{}", render::action(&committed.value, balance));
        }
        settle(&committed, &committed.value.unlocked);
        if !committed.is_persisted() {
            // Stop early rather than repeat the same warning.
            break;
        }
    }
    if times > 1 {
        println!("{}", render::action_batch(done, credited, crits, balance));
    }
    Ok(())
}
