use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{FixtureError, Result};
use crate::path::{DEFAULT_FIXTURES_DIR, is_blank, validate_absolute_path};

/// Fixture store configuration, usually read from a `fixtures.toml`.
///
/// ```toml
/// directory = "/srv/app/tests"
/// fixtures_dir_name = "__fixtures__"
/// pretty = true
/// store_structure = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSettings {
    /// Absolute directory fixture names are joined onto.
    pub directory: Option<PathBuf>,
    pub fixtures_dir_name: String,
    pub pretty: bool,
    /// Write `{data, structure, digest}` records instead of the bare value.
    pub store_structure: bool,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            directory: None,
            fixtures_dir_name: DEFAULT_FIXTURES_DIR.to_string(),
            pretty: true,
            store_structure: true,
        }
    }
}

impl FixtureSettings {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let settings: FixtureSettings = toml::from_str(input)?;
        settings.validated()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Check the settings and drop a blank `directory`.
    pub fn validated(mut self) -> Result<Self> {
        if self.directory.as_deref().is_some_and(is_blank) {
            self.directory = None;
        }
        if let Some(directory) = &self.directory {
            validate_absolute_path(directory)?;
        }
        let mut components = Path::new(&self.fixtures_dir_name).components();
        let single_dir = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_dir {
            return Err(FixtureError::InvalidSettings(format!(
                "fixtures_dir_name must be a single directory name, got {:?}",
                self.fixtures_dir_name
            )));
        }
        Ok(self)
    }
}
