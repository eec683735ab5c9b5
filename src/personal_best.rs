use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::app_dirs::AppDirs;
use crate::error::StoreError;

/// Persistence for the single best-wpm scalar
pub trait PersonalBestStore {
    /// Stored best, 0 when nothing was saved yet
    fn load(&self) -> Result<u32, StoreError>;
    fn save(&self, wpm: u32) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Record {
    personal_best: u32,
}

#[derive(Debug, Clone)]
pub struct FilePersonalBestStore {
    path: PathBuf,
}

impl FilePersonalBestStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::personal_best_path().unwrap_or_else(|| PathBuf::from("tapspeed_best.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FilePersonalBestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonalBestStore for FilePersonalBestStore {
    fn load(&self) -> Result<u32, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let record: Record = serde_json::from_slice(&bytes)?;
        Ok(record.personal_best)
    }

    fn save(&self, wpm: u32) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&Record { personal_best: wpm })?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// In-memory store. Clones share the stored value.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersonalBestStore {
    best: Rc<Cell<u32>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryPersonalBestStore {
    pub fn new(best: u32) -> Self {
        Self {
            best: Rc::new(Cell::new(best)),
            saves: Rc::default(),
        }
    }

    pub fn value(&self) -> u32 {
        self.best.get()
    }

    /// How many times `save` has been called
    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl PersonalBestStore for MemoryPersonalBestStore {
    fn load(&self) -> Result<u32, StoreError> {
        Ok(self.best.get())
    }

    fn save(&self, wpm: u32) -> Result<(), StoreError> {
        self.best.set(wpm);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
