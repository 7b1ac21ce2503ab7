//! Persistence port for player records.
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::{PoisonError, RwLock};

use crate::record::PlayerRecord;

/// Trait for abstracting record persistence.
/// Platform-specific front ends should provide this.
pub trait PlayerStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a single record, `None` if the player has never been seen.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn load(&self, id: &str) -> Result<Option<PlayerRecord>, Self::Error>;

    /// Persist a whole record, replacing any previous version.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save(&self, id: &str, record: &PlayerRecord) -> Result<(), Self::Error>;

    /// Snapshot of every stored record.
    ///
    /// Each record must be a complete saved version, never a partial write.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn load_all(&self) -> Result<Vec<(String, PlayerRecord)>, Self::Error>;
}

impl<S: PlayerStore + ?Sized> PlayerStore for &S {
    type Error = S::Error;

    fn load(&self, id: &str) -> Result<Option<PlayerRecord>, Self::Error> {
        (**self).load(id)
    }

    fn save(&self, id: &str, record: &PlayerRecord) -> Result<(), Self::Error> {
        (**self).save(id, record)
    }

    fn load_all(&self) -> Result<Vec<(String, PlayerRecord)>, Self::Error> {
        (**self).load_all()
    }
}

/// Process-local store; records are ordered by player id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, PlayerRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = (String, PlayerRecord)>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlayerStore for MemoryStore {
    type Error = Infallible;

    fn load(&self, id: &str) -> Result<Option<PlayerRecord>, Self::Error> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(id).cloned())
    }

    fn save(&self, id: &str, record: &PlayerRecord) -> Result<(), Self::Error> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), record.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<(String, PlayerRecord)>, Self::Error> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect())
    }
}
