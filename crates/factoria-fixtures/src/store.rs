use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{FixtureError, InvalidPathReason, Result};
use crate::files::{FileStore, FsStore};
use crate::fingerprint;
use crate::path::{FixturePath, is_blank, join_under, parse_fixture_path};
use crate::record::FixtureRecord;
use crate::settings::FixtureSettings;

/// Reads and writes fixture files, reusing stored data whose structure
/// still matches the freshly built value.
#[derive(Clone)]
pub struct FixtureStore {
    files: Arc<dyn FileStore>,
    settings: FixtureSettings,
}

impl FixtureStore {
    /// Store on the local filesystem.
    pub fn new(settings: FixtureSettings) -> Result<Self> {
        Self::with_files(Arc::new(FsStore), settings)
    }

    pub fn with_files(files: Arc<dyn FileStore>, settings: FixtureSettings) -> Result<Self> {
        Ok(Self {
            files,
            settings: settings.validated()?,
        })
    }

    pub fn settings(&self) -> &FixtureSettings {
        &self.settings
    }

    /// Locate the fixture file for `path`, nesting it under the configured
    /// directory when there is one.
    pub fn resolve(&self, path: &Path) -> Result<FixturePath> {
        if is_blank(path) {
            return Err(FixtureError::InvalidPath {
                path: path.to_path_buf(),
                reason: InvalidPathReason::MissingFileName,
            });
        }
        let target = match &self.settings.directory {
            Some(directory) => join_under(directory, path),
            None => path.to_path_buf(),
        };
        parse_fixture_path(&target, &self.settings.fixtures_dir_name)
    }

    /// Return the stored fixture at `path` if its structure matches `built`,
    /// otherwise persist `built` and return it.
    pub fn get_or_create(&self, path: &Path, built: Value) -> Result<Value> {
        let target = self.resolve(path)?;
        let structure = fingerprint::structure(&built);

        if let Some(stored) = self.read(&target.full_path)? {
            if stored.matches(&structure) {
                debug!(path = %target.full_path.display(), "fixture reused");
                return Ok(stored.data);
            }
            warn!(
                path = %target.full_path.display(),
                "fixture structure changed, rewriting"
            );
        }

        self.write(&target, built, structure)
    }

    /// Same as [`get_or_create`](Self::get_or_create) with file access moved
    /// onto the blocking pool.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub async fn get_or_create_async(&self, path: &Path, built: Value) -> Result<Value> {
        let store = self.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || store.get_or_create(&path, built)).await?
    }

    fn read(&self, path: &Path) -> Result<Option<FixtureRecord>> {
        if !self.files.exists(path) {
            return Ok(None);
        }
        let content = self.files.read_text(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let stored: Value = serde_json::from_str(&content).map_err(|source| FixtureError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        // Raw fixtures are bare values, even when they look like a record.
        let record = if self.settings.store_structure {
            FixtureRecord::from_stored(stored)
        } else {
            FixtureRecord::new(stored)
        };
        Ok(Some(record))
    }

    fn write(&self, target: &FixturePath, built: Value, structure: Vec<String>) -> Result<Value> {
        let write_error = |path: &PathBuf| {
            let path = path.clone();
            move |source| FixtureError::Write { path, source }
        };

        if !self.files.exists(&target.fixtures_dir) {
            self.files
                .mkdir(&target.fixtures_dir)
                .map_err(write_error(&target.fixtures_dir))?;
        }

        let content = self.encode(&target.full_path, built, structure)?;
        self.files
            .write_text(&target.full_path, &content.text)
            .map_err(write_error(&target.full_path))?;
        debug!(
            path = %target.full_path.display(),
            bytes = content.text.len(),
            "fixture written"
        );
        Ok(content.data)
    }

    fn encode(&self, path: &Path, data: Value, structure: Vec<String>) -> Result<Encoded> {
        let encode = |value: &Value| {
            if self.settings.pretty {
                serde_json::to_string_pretty(value)
            } else {
                serde_json::to_string(value)
            }
        };
        let encode_error = |source| FixtureError::Encode {
            path: path.to_path_buf(),
            source,
        };

        if self.settings.store_structure {
            let digest = Some(fingerprint::digest(&structure));
            let record = FixtureRecord {
                data,
                structure,
                digest,
            };
            let value = serde_json::to_value(&record).map_err(encode_error)?;
            let text = encode(&value).map_err(encode_error)?;
            Ok(Encoded {
                text,
                data: record.data,
            })
        } else {
            let text = encode(&data).map_err(encode_error)?;
            Ok(Encoded { text, data })
        }
    }
}

struct Encoded {
    text: String,
    data: Value,
}

impl fmt::Debug for FixtureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureStore")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
