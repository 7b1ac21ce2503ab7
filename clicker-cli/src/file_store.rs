//! Single-file JSON store: one object mapping player id to record.
//!
//! Several `clicker` processes may share one data file. Every operation takes
//! an advisory lock on `<path>.lock` and re-reads the file, and `save` merges
//! its record into what is on disk instead of rewriting a stale snapshot.
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use clicker_game::{PlayerRecord, PlayerStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid player data: {0}")]
    Json(#[from] serde_json::Error),
}

impl FileStoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Held for a whole command so read-modify-write cycles of different
/// processes never interleave. Dropping it releases the lock.
#[derive(Debug)]
pub struct SessionLock {
    _file: File,
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    ///
    /// An unreadable file is renamed to `<path>.corrupt` and the store starts
    /// empty instead of refusing to run.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be created, or if the data file
    /// exists but cannot be read or moved aside.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, FileStoreError> {
        let path = path.into();
        let store = Self {
            lock_path: sibling(&path, "lock"),
            path,
        };
        let _lock = store.exclusive()?;
        match fs::read_to_string(&store.path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, PlayerRecord>>(&raw) {
                Ok(records) => {
                    log::debug!("found {} players in {}", records.len(), store.path.display());
                }
                Err(err) => {
                    let backup = sibling(&store.path, "corrupt");
                    log::warn!(
                        "{} is not valid player data ({err}); moving it to {}",
                        store.path.display(),
                        backup.display()
                    );
                    fs::rename(&store.path, &backup)
                        .map_err(|e| FileStoreError::io(&store.path, e))?;
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(FileStoreError::io(&store.path, err)),
        }
        Ok(store)
    }

    /// Block until no other session holds the data file.
    ///
    /// # Errors
    ///
    /// Returns an error if `<path>.session` cannot be opened or locked.
    pub fn lock_session(&self) -> Result<SessionLock, FileStoreError> {
        let path = sibling(&self.path, "session");
        let file = lock_file(&path)?;
        fs2::FileExt::lock_exclusive(&file).map_err(|e| FileStoreError::io(&path, e))?;
        Ok(SessionLock { _file: file })
    }

    fn shared(&self) -> Result<File, FileStoreError> {
        let file = lock_file(&self.lock_path)?;
        fs2::FileExt::lock_shared(&file).map_err(|e| FileStoreError::io(&self.lock_path, e))?;
        Ok(file)
    }

    fn exclusive(&self) -> Result<File, FileStoreError> {
        let file = lock_file(&self.lock_path)?;
        fs2::FileExt::lock_exclusive(&file).map_err(|e| FileStoreError::io(&self.lock_path, e))?;
        Ok(file)
    }

    /// Current file contents. Callers hold the lock file.
    fn read(&self) -> Result<BTreeMap<String, PlayerRecord>, FileStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(FileStoreError::io(&self.path, err)),
        }
    }

    /// Write a snapshot through a temp file so readers never see a torn file.
    fn write(&self, records: &BTreeMap<String, PlayerRecord>) -> Result<(), FileStoreError> {
        let encoded = serde_json::to_string_pretty(records)?;
        let tmp = sibling(&self.path, "tmp");
        fs::write(&tmp, encoded).map_err(|e| FileStoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| FileStoreError::io(&self.path, e))
    }
}

fn lock_file(path: &Path) -> Result<File, FileStoreError> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(|e| FileStoreError::io(path, e))
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

impl PlayerStore for JsonFileStore {
    type Error = FileStoreError;

    fn load(&self, id: &str) -> Result<Option<PlayerRecord>, Self::Error> {
        let _lock = self.shared()?;
        Ok(self.read()?.remove(id))
    }

    fn save(&self, id: &str, record: &PlayerRecord) -> Result<(), Self::Error> {
        let _lock = self.exclusive()?;
        let mut records = self.read()?;
        records.insert(id.to_string(), record.clone());
        self.write(&records)
    }

    fn load_all(&self) -> Result<Vec<(String, PlayerRecord)>, Self::Error> {
        let _lock = self.shared()?;
        Ok(self.read()?.into_iter().collect())
    }
}
