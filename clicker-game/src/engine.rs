//! Engine facade binding the pure rules to a store, a clock and a randomness source.
//!
//! Every player-scoped call runs under that player's lock: resolve the record,
//! take one `now` snapshot, apply the rule to a working copy, then save.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::achievements::{AchievementStatus, list_achievements};
use crate::config::{ConfigError, EconomyConfig};
use crate::daily::{DailyOutcome, claim_daily};
use crate::error::EngineError;
use crate::leaderboard::{LeaderboardView, RankedEntry, rank};
use crate::ports::{Clock, RandomSource};
use crate::progression::{
    ActionOutcome, BoostOutcome, LevelUpOutcome, SelectOutcome, UpgradeOutcome,
    level_up_character, perform_action, purchase_boost, purchase_earn_upgrade, select_character,
};
use crate::record::{PlayerIdentity, PlayerRecord, Timestamp};
use crate::status::{CharacterSlot, PlayerStatus, character_roster};
use crate::store::PlayerStore;

/// Result of an operation that went through.
///
/// `warning` carries a [`EngineError::PersistenceFailure`] when the save
/// failed; the returned value and record still reflect the applied change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    pub value: T,
    pub record: PlayerRecord,
    pub warning: Option<EngineError>,
}

impl<T> Committed<T> {
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Committed<U> {
        Committed {
            value: f(self.value),
            record: self.record,
            warning: self.warning,
        }
    }
}

/// Record as resolved for an incoming identity.
struct Resolved {
    record: PlayerRecord,
    /// Created, renamed or repaired; needs saving even if the operation is refused.
    dirty: bool,
}

/// Main engine serving every player of one game.
pub struct ClickerEngine<S, C, R>
where
    S: PlayerStore,
    C: Clock,
    R: RandomSource,
{
    store: S,
    clock: C,
    rng: Mutex<R>,
    config: EconomyConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S, C, R> ClickerEngine<S, C, R>
where
    S: PlayerStore,
    C: Clock,
    R: RandomSource,
{
    /// Create an engine with the shipped balance.
    pub fn new(store: S, clock: C, rng: R) -> Self {
        Self {
            store,
            clock,
            rng: Mutex::new(rng),
            config: EconomyConfig::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create an engine with a custom balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration violates an economy invariant.
    pub fn with_config(
        store: S,
        clock: C,
        rng: R,
        config: EconomyConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(store, clock, rng)
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EconomyConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    fn player_lock(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id.to_string()).or_default())
    }

    fn load(&self, id: &str) -> Result<Option<PlayerRecord>, EngineError> {
        let loaded = self
            .store
            .load(id)
            .map_err(|err| EngineError::persistence(id, &err))?;
        Ok(loaded.map(|mut record| {
            if record.normalize(&self.config) {
                log::warn!("player `{id}` record repaired on load");
            }
            record
        }))
    }

    fn resolve(&self, identity: &PlayerIdentity, now: Timestamp) -> Result<Resolved, EngineError> {
        let Some(mut record) = self.load(&identity.id)? else {
            log::debug!("player `{}` created", identity.id);
            return Ok(Resolved {
                record: PlayerRecord::new(identity.display_name.clone(), now, &self.config),
                dirty: true,
            });
        };
        let mut dirty = false;
        if record.display_name != identity.display_name {
            record.display_name.clone_from(&identity.display_name);
            dirty = true;
        }
        Ok(Resolved { record, dirty })
    }

    fn persist(&self, id: &str, record: &PlayerRecord) -> Option<EngineError> {
        let err = self.store.save(id, record).err()?;
        let failure = EngineError::persistence(id, &err);
        log::warn!("{failure}");
        Some(failure)
    }

    /// Drop the table entry once no other caller holds or waits on it.
    fn release_lock(&self, id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if locks.get(id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(id);
        }
    }

    /// Run `op` against the identity's record under its lock.
    fn transact<T>(
        &self,
        identity: &PlayerIdentity,
        op: impl FnOnce(&mut PlayerRecord, Timestamp) -> Result<T, EngineError>,
    ) -> Result<Committed<T>, EngineError> {
        let lock = self.player_lock(&identity.id);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.transact_locked(identity, op)
        };
        self.release_lock(&identity.id, lock);
        result
    }

    fn transact_locked<T>(
        &self,
        identity: &PlayerIdentity,
        op: impl FnOnce(&mut PlayerRecord, Timestamp) -> Result<T, EngineError>,
    ) -> Result<Committed<T>, EngineError> {
        let now = self.clock.now();
        let resolved = self.resolve(identity, now)?;

        let mut working = resolved.record.clone();
        match op(&mut working, now) {
            Ok(value) => {
                let changed = resolved.dirty || working != resolved.record;
                let warning = if changed {
                    self.persist(&identity.id, &working)
                } else {
                    None
                };
                Ok(Committed {
                    value,
                    record: working,
                    warning,
                })
            }
            Err(err) => {
                log::debug!("player `{}` refused: {err}", identity.id);
                // Refusals still persist first contact and renames. A refusal
                // has no record to carry a warning, so the save failure wins.
                let failure = if resolved.dirty {
                    self.persist(&identity.id, &resolved.record)
                } else {
                    None
                };
                Err(failure.unwrap_or(err))
            }
        }
    }

    /// Fetch the identity's record, creating it on first contact.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the store cannot be read.
    pub fn get_or_create_record(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Committed<PlayerRecord>, EngineError> {
        self.transact(identity, |record, _| Ok(record.clone()))
    }

    /// Look up an existing player without creating one.
    ///
    /// # Errors
    ///
    /// `UnknownPlayer` if the id was never seen, `PersistenceFailure` if the store cannot be read.
    pub fn player(&self, id: &str) -> Result<PlayerRecord, EngineError> {
        self.load(id)?
            .ok_or_else(|| EngineError::UnknownPlayer(id.to_string()))
    }

    /// One accrual action.
    ///
    /// # Errors
    ///
    /// Only `PersistenceFailure` on load; the action itself cannot be refused.
    pub fn perform_action(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Committed<ActionOutcome>, EngineError> {
        self.transact(identity, |record, now| {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            let outcome = perform_action(record, now, &self.config, &mut *rng);
            log::debug!(
                "player action credited {} (crit: {}, boost: {})",
                outcome.credited,
                outcome.crit,
                outcome.boost_active
            );
            Ok(outcome)
        })
    }

    /// Buy the next earn-rate level.
    ///
    /// # Errors
    ///
    /// `AlreadyMaxed`, `InsufficientFunds`, or `PersistenceFailure` on load.
    pub fn purchase_earn_upgrade(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Committed<UpgradeOutcome>, EngineError> {
        self.transact(identity, |record, _| purchase_earn_upgrade(record, &self.config))
    }

    /// Level up the selected character.
    ///
    /// # Errors
    ///
    /// `CharacterMaxed`, `InsufficientFunds`, or `PersistenceFailure` on load.
    pub fn level_up_character(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Committed<LevelUpOutcome>, EngineError> {
        self.transact(identity, |record, _| level_up_character(record, &self.config))
    }

    /// Buy or extend a boost.
    ///
    /// # Errors
    ///
    /// `InsufficientFunds`, or `PersistenceFailure` on load.
    pub fn purchase_boost(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Committed<BoostOutcome>, EngineError> {
        self.transact(identity, |record, now| purchase_boost(record, now, &self.config))
    }

    /// Switch to another unlocked character.
    ///
    /// # Errors
    ///
    /// `LockedCharacter`, or `PersistenceFailure` on load.
    pub fn select_character(
        &self,
        identity: &PlayerIdentity,
        index: usize,
    ) -> Result<Committed<SelectOutcome>, EngineError> {
        self.transact(identity, |record, _| select_character(record, index, &self.config))
    }

    /// Claim the daily bonus.
    ///
    /// # Errors
    ///
    /// `TooEarly`, or `PersistenceFailure` on load.
    pub fn claim_daily(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Committed<DailyOutcome>, EngineError> {
        self.transact(identity, |record, now| claim_daily(record, now, &self.config))
    }

    /// Stats sheet for the identity.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the store cannot be read.
    pub fn status(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Committed<PlayerStatus>, EngineError> {
        self.transact(identity, |record, now| {
            Ok(PlayerStatus::of(record, now, &self.config))
        })
    }

    /// Roster view for the identity.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the store cannot be read.
    pub fn characters(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Committed<Vec<CharacterSlot>>, EngineError> {
        self.transact(identity, |record, _| Ok(character_roster(record, &self.config)))
    }

    /// Achievement catalog with the identity's unlock flags.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the store cannot be read.
    pub fn list_achievements(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Committed<Vec<AchievementStatus>>, EngineError> {
        self.transact(identity, |record, _| Ok(list_achievements(record)))
    }

    /// Rank every stored player.
    ///
    /// Reads a store snapshot; in-flight operations of other players may or
    /// may not be reflected, but no record is ever seen half-written.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the store cannot be read.
    pub fn rank(&self) -> Result<Vec<RankedEntry>, EngineError> {
        let mut records = self
            .store
            .load_all()
            .map_err(|err| EngineError::persistence("*", &err))?;
        for (_, record) in &mut records {
            record.normalize(&self.config);
        }
        Ok(rank(records))
    }

    /// Top `limit` players plus the viewer's own position.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the store cannot be read.
    pub fn leaderboard(
        &self,
        limit: usize,
        viewer: Option<&str>,
    ) -> Result<LeaderboardView, EngineError> {
        Ok(LeaderboardView::from_ranking(self.rank()?, limit, viewer))
    }
}
