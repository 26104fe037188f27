use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Text file access used by the fixture store.
pub trait FileStore: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn read_text(&self, path: &Path) -> io::Result<String>;
    fn write_text(&self, path: &Path, content: &str) -> io::Result<()>;
    fn mkdir(&self, path: &Path) -> io::Result<()>;
}

/// Local filesystem store. Writes go through a temporary sibling file and a
/// rename, so readers never observe a partially written fixture.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FileStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_text(&self, path: &Path, content: &str) -> io::Result<()> {
        write_bytes_atomic(path, content.as_bytes())
    }

    fn mkdir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path)?;
    let written = write_and_sync(&tmp_path, data).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    if let Some(parent) = parent {
        sync_dir(parent)?;
    }
    Ok(())
}

fn write_and_sync(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "invalid path for atomic write")
    })?;
    let tmp_name = format!(".{}.{}.tmp", file_name.to_string_lossy(), Uuid::new_v4());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
