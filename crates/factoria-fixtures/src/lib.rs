//! Persisted fixtures for `factoria-core` factories.
//!
//! A fixture is a built value stored as JSON under a `__fixtures__`
//! directory next to the path it is requested for. Later requests reuse the
//! stored value as long as the freshly built value has the same structure,
//! so fixture files only change when the shape of the data does.
//!
//! The async fixture methods run file access through
//! `tokio::task::spawn_blocking` and must be used inside a Tokio runtime;
//! the `_sync` methods have no runtime requirement.

pub mod errors;
pub mod factory;
pub mod files;
pub mod fingerprint;
pub mod path;
pub mod record;
pub mod settings;
pub mod store;

pub use errors::{FixtureError, InvalidPathReason, Result};
pub use factory::FixtureFactory;
pub use files::{FileStore, FsStore};
pub use fingerprint::{is_same_structure, key_paths, structure};
pub use path::{DEFAULT_FIXTURES_DIR, FixturePath, parse_fixture_path, validate_absolute_path};
pub use record::FixtureRecord;
pub use settings::FixtureSettings;
pub use store::FixtureStore;
