use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::errors::{FixtureError, InvalidPathReason, Result};

pub const DEFAULT_FIXTURES_DIR: &str = "__fixtures__";

/// Where a fixture lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePath {
    /// Directory holding the fixture, created on first write.
    pub fixtures_dir: PathBuf,
    pub full_path: PathBuf,
}

/// Reject blank and relative paths.
pub fn validate_absolute_path(path: &Path) -> Result<()> {
    if is_blank(path) {
        return Err(FixtureError::invalid_path(path, InvalidPathReason::MissingFileName));
    }
    if !path.is_absolute() {
        return Err(FixtureError::invalid_path(path, InvalidPathReason::NotAbsolute));
    }
    Ok(())
}

/// Map a target path to its fixture file.
///
/// `/srv/tests/user` becomes `/srv/tests/<fixtures_dir_name>/user.json`. A
/// missing extension defaults to `.json`; a `.json` extension in any case is
/// normalised to lowercase; any other extension is rejected.
pub fn parse_fixture_path(path: &Path, fixtures_dir_name: &str) -> Result<FixturePath> {
    validate_absolute_path(path)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| FixtureError::invalid_path(path, InvalidPathReason::MissingFileName))?;
    let parent = path.parent().unwrap_or_else(|| Path::new("/"));
    let fixtures_dir = parent.join(fixtures_dir_name);

    let file_name = Path::new(file_name);
    let file_name: OsString = match file_name.extension() {
        None => {
            let mut name = file_name.as_os_str().to_os_string();
            name.push(".json");
            name
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            file_name.with_extension("json").into_os_string()
        }
        Some(ext) => {
            return Err(FixtureError::invalid_path(
                path,
                InvalidPathReason::InvalidExtension(format!(".{}", ext.to_string_lossy())),
            ));
        }
    };

    Ok(FixturePath {
        full_path: fixtures_dir.join(file_name),
        fixtures_dir,
    })
}

/// Join `path` under `directory` the way a plain string join would, so an
/// absolute `path` is nested inside `directory` rather than replacing it.
pub fn join_under(directory: &Path, path: &Path) -> PathBuf {
    let relative: PathBuf = path
        .components()
        .filter(|component| !matches!(component, Component::RootDir | Component::Prefix(_)))
        .collect();
    directory.join(relative)
}

pub(crate) fn is_blank(path: &Path) -> bool {
    path.to_string_lossy().trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(result: Result<FixturePath>) -> InvalidPathReason {
        match result {
            Err(FixtureError::InvalidPath { reason, .. }) => reason,
            other => panic!("expected invalid path, got {other:?}"),
        }
    }

    #[test]
    fn rejects_blank_paths() {
        assert_eq!(
            reason(parse_fixture_path(Path::new("   "), DEFAULT_FIXTURES_DIR)),
            InvalidPathReason::MissingFileName
        );
        assert_eq!(
            reason(parse_fixture_path(Path::new(""), DEFAULT_FIXTURES_DIR)),
            InvalidPathReason::MissingFileName
        );
    }

    #[test]
    fn rejects_relative_paths() {
        assert_eq!(
            reason(parse_fixture_path(Path::new("fixtures/user"), DEFAULT_FIXTURES_DIR)),
            InvalidPathReason::NotAbsolute
        );
    }

    #[test]
    fn rejects_root_without_file_name() {
        assert_eq!(
            reason(parse_fixture_path(Path::new("/"), DEFAULT_FIXTURES_DIR)),
            InvalidPathReason::MissingFileName
        );
    }

    #[test]
    fn defaults_extension_to_json() {
        let parsed = parse_fixture_path(Path::new("/srv/tests/user"), DEFAULT_FIXTURES_DIR)
            .expect("valid path");
        assert_eq!(parsed.fixtures_dir, PathBuf::from("/srv/tests/__fixtures__"));
        assert_eq!(parsed.full_path, PathBuf::from("/srv/tests/__fixtures__/user.json"));
    }

    #[test]
    fn normalises_json_extension_case() {
        let parsed = parse_fixture_path(Path::new("/srv/tests/user.JSON"), DEFAULT_FIXTURES_DIR)
            .expect("valid path");
        assert_eq!(parsed.full_path, PathBuf::from("/srv/tests/__fixtures__/user.json"));
    }

    #[test]
    fn rejects_other_extensions() {
        assert_eq!(
            reason(parse_fixture_path(Path::new("/srv/tests/user.yaml"), DEFAULT_FIXTURES_DIR)),
            InvalidPathReason::InvalidExtension(".yaml".to_string())
        );
    }

    #[test]
    fn honours_custom_fixtures_dir_name() {
        let parsed = parse_fixture_path(Path::new("/srv/user"), "snapshots").expect("valid path");
        assert_eq!(parsed.full_path, PathBuf::from("/srv/snapshots/user.json"));
    }

    #[test]
    fn join_under_nests_absolute_paths() {
        assert_eq!(
            join_under(Path::new("/srv/data"), Path::new("/users/admin")),
            PathBuf::from("/srv/data/users/admin")
        );
        assert_eq!(
            join_under(Path::new("/srv/data"), Path::new("admin")),
            PathBuf::from("/srv/data/admin")
        );
    }
}
