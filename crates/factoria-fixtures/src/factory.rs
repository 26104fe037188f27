use std::path::{Path, PathBuf};

use factoria_core::{BuildOptions, Factory, FactoryError};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{FixtureError, Result};
use crate::settings::FixtureSettings;
use crate::store::FixtureStore;

/// A [`Factory`] whose builds are persisted as fixtures and reused while
/// their structure stays the same.
#[derive(Debug, Clone)]
pub struct FixtureFactory {
    factory: Factory,
    store: FixtureStore,
}

impl FixtureFactory {
    /// Fixtures resolved from absolute paths on the local filesystem.
    pub fn new(factory: Factory) -> Result<Self> {
        Self::with_settings(factory, FixtureSettings::default())
    }

    /// Fixture names are joined onto `directory`, which must be absolute.
    pub fn with_directory(factory: Factory, directory: impl Into<PathBuf>) -> Result<Self> {
        Self::with_settings(factory, FixtureSettings::default().with_directory(directory))
    }

    pub fn with_settings(factory: Factory, settings: FixtureSettings) -> Result<Self> {
        Ok(Self::with_store(factory, FixtureStore::new(settings)?))
    }

    pub fn with_store(factory: Factory, store: FixtureStore) -> Self {
        Self { factory, store }
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn store(&self) -> &FixtureStore {
        &self.store
    }

    /// Build asynchronously and resolve the fixture on Tokio's blocking pool.
    ///
    /// # Panics
    ///
    /// Panics when polled outside a Tokio runtime; the async fixture
    /// methods all share this requirement.
    pub async fn fixture(&self, path: impl AsRef<Path>, options: impl Into<BuildOptions>) -> Result<Value> {
        let built = self.factory.build_with(options).await?;
        self.store.get_or_create_async(path.as_ref(), built).await
    }

    pub fn fixture_sync(&self, path: impl AsRef<Path>, options: impl Into<BuildOptions>) -> Result<Value> {
        let built = self.factory.build_sync_with(options)?;
        self.store.get_or_create(path.as_ref(), built)
    }

    /// Batch counterpart of [`fixture`](Self::fixture), with the same Tokio
    /// runtime requirement.
    pub async fn fixture_batch(
        &self,
        path: impl AsRef<Path>,
        size: usize,
        options: impl Into<BuildOptions>,
    ) -> Result<Vec<Value>> {
        let built = self.factory.batch_with(size, options).await?;
        let stored = self
            .store
            .get_or_create_async(path.as_ref(), Value::Array(built))
            .await?;
        into_batch(path.as_ref(), stored)
    }

    pub fn fixture_batch_sync(
        &self,
        path: impl AsRef<Path>,
        size: usize,
        options: impl Into<BuildOptions>,
    ) -> Result<Vec<Value>> {
        let built = self.factory.batch_sync_with(size, options)?;
        let stored = self.store.get_or_create(path.as_ref(), Value::Array(built))?;
        into_batch(path.as_ref(), stored)
    }

    pub async fn fixture_as<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
        options: impl Into<BuildOptions>,
    ) -> Result<T> {
        deserialize(self.fixture(path, options).await?)
    }

    pub fn fixture_sync_as<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
        options: impl Into<BuildOptions>,
    ) -> Result<T> {
        deserialize(self.fixture_sync(path, options)?)
    }

    pub async fn fixture_batch_as<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
        size: usize,
        options: impl Into<BuildOptions>,
    ) -> Result<Vec<T>> {
        self.fixture_batch(path, size, options)
            .await?
            .into_iter()
            .map(deserialize)
            .collect()
    }

    pub fn fixture_batch_sync_as<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
        size: usize,
        options: impl Into<BuildOptions>,
    ) -> Result<Vec<T>> {
        self.fixture_batch_sync(path, size, options)?
            .into_iter()
            .map(deserialize)
            .collect()
    }
}

fn into_batch(path: &Path, stored: Value) -> Result<Vec<Value>> {
    match stored {
        Value::Array(values) => Ok(values),
        _ => Err(FixtureError::NotABatch {
            path: path.to_path_buf(),
        }),
    }
}

fn deserialize<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(FactoryError::from)
        .map_err(FixtureError::from)
}
