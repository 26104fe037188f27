#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use factoria_fixtures::FileStore;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory file store counting the writes it receives.
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    writes: AtomicUsize,
    fail_reads: bool,
    fail_writes: bool,
    fail_mkdir: bool,
}

impl MemoryStore {
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn failing_mkdir() -> Self {
        Self {
            fail_mkdir: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().expect("files lock").get(path).cloned()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .lock()
            .expect("files lock")
            .insert(path.into(), content.into());
    }

    pub fn has_dir(&self, path: &Path) -> bool {
        self.dirs.lock().expect("dirs lock").contains(path)
    }
}

impl FileStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("files lock").contains_key(path)
            || self.dirs.lock().expect("dirs lock").contains(path)
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        if self.fail_reads {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "unreadable"));
        }
        self.contents(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write_text(&self, path: &Path, content: &str) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert(path, content);
        Ok(())
    }

    fn mkdir(&self, path: &Path) -> io::Result<()> {
        if self.fail_mkdir {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "no directories"));
        }
        self.dirs.lock().expect("dirs lock").insert(path.to_path_buf());
        Ok(())
    }
}
