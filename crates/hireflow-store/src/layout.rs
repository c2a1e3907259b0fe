use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current store format version. Incremented on incompatible layout changes.
pub const STORE_FORMAT_VERSION: u32 = 1;
const VERSION_FILE: &str = "version";

/// Directory layout for the hireflow record store.
///
/// Manages paths for record files, the identifier sequence, the audit
/// journal, the store lock and the version marker. All subdirectories are
/// created lazily on [`initialize`](Self::initialize).
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreVersion {
    format_version: u32,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn store_dir(&self) -> PathBuf {
        self.root.join("store")
    }

    #[inline]
    pub fn records_dir(&self) -> PathBuf {
        self.store_dir().join("records")
    }

    #[inline]
    pub fn record_path(&self, id: impl std::fmt::Display) -> PathBuf {
        self.records_dir().join(format!("{id}.json"))
    }

    /// Last identifier handed out by `create`.
    #[inline]
    pub fn sequence_file(&self) -> PathBuf {
        self.store_dir().join("sequence")
    }

    #[inline]
    pub fn journal_file(&self) -> PathBuf {
        self.store_dir().join("audit.jsonl")
    }

    #[inline]
    pub fn lock_file(&self) -> PathBuf {
        self.store_dir().join(".lock")
    }

    fn version_file(&self) -> PathBuf {
        self.store_dir().join(VERSION_FILE)
    }

    /// Create the directory tree and stamp a new store with the current
    /// format version. An existing store must carry the same version.
    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.records_dir())?;
        if self.version_file().exists() {
            return self.verify_version();
        }
        let stamp = serde_json::to_vec_pretty(&StoreVersion {
            format_version: STORE_FORMAT_VERSION,
        })?;
        crate::write_atomic(&self.store_dir(), &self.version_file(), &stamp)
    }

    pub fn verify_version(&self) -> Result<(), StoreError> {
        let found = serde_json::from_slice::<StoreVersion>(&fs::read(self.version_file())?)?
            .format_version;
        if found == STORE_FORMAT_VERSION {
            Ok(())
        } else {
            Err(StoreError::VersionMismatch {
                expected: STORE_FORMAT_VERSION,
                found,
            })
        }
    }
}
