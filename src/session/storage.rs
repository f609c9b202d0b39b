use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use log::warn;

use crate::dirs::ensure_dir_exists;
use crate::filelock::{read_file_lock, write_file_lock};

use super::state::SessionState;

/// Durable home of the session state.
pub trait SessionStorage: Send + Sync {
    /// Returns `None` when nothing was stored yet.
    fn load(&self) -> Result<Option<SessionState>>;

    fn save(&self, state: &SessionState) -> Result<()>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for Arc<T> {
    fn load(&self) -> Result<Option<SessionState>> {
        (**self).load()
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        (**self).save(state)
    }
}

/// Stores the session as JSON in a single file, guarded by a file lock so that
/// several console processes do not interleave their writes.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<SessionState>> {
        let data = match read_file_lock(&self.path)
            .with_context(|| format!("read session file '{}'", self.path.display()))?
        {
            Some(data) => data,
            None => return Ok(None),
        };
        if data.is_empty() {
            return Ok(None);
        }

        match serde_json::from_slice::<SessionState>(&data) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                warn!(
                    "Session file '{}' has invalid data, we will ignore it: {err}",
                    self.path.display()
                );
                Ok(None)
            }
        }
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        let data = serde_json::to_vec(state).context("encode session state")?;
        if let Some(dir) = self.path.parent() {
            ensure_dir_exists(dir)?;
        }
        write_file_lock(&self.path, &data)
            .with_context(|| format!("write session file '{}'", self.path.display()))
    }
}

/// Keeps the session in memory only. Useful for embedding and tests.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<Option<SessionState>>,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of times the state was written.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<SessionState> {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<SessionState>> {
        match self.state.lock() {
            Ok(state) => Ok(state.clone()),
            Err(_) => bail!("memory storage lock poisoned"),
        }
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        match self.state.lock() {
            Ok(mut stored) => *stored = Some(state.clone()),
            Err(_) => bail!("memory storage lock poisoned"),
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
