use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::errors::{FactoryError, Result};
use crate::schema::Schema;

/// Execution discipline of a build.
///
/// Both disciplines share one resolution algorithm; in `Sync` mode every
/// point that would await pending work fails instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sync,
    Async,
}

/// Where a schema comes from: a literal, or a function of the iteration.
///
/// Used for factory defaults and for per-build overrides.
#[derive(Clone)]
pub enum SchemaSource {
    Static(Schema),
    Dynamic(Arc<dyn Fn(u64) -> Schema + Send + Sync>),
    Deferred(Arc<dyn Fn(u64) -> BoxFuture<'static, Schema> + Send + Sync>),
}

impl SchemaSource {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(u64) -> Schema + Send + Sync + 'static,
    {
        SchemaSource::Dynamic(Arc::new(f))
    }

    pub fn from_async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(u64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Schema> + Send + 'static,
    {
        SchemaSource::Deferred(Arc::new(move |iteration| f(iteration).boxed()))
    }

    /// Produce the schema for `iteration`, failing with `pending` when the
    /// source is asynchronous and `mode` is `Sync`.
    pub(crate) async fn produce(
        &self,
        iteration: u64,
        mode: Mode,
        pending: fn() -> FactoryError,
    ) -> Result<Schema> {
        match self {
            SchemaSource::Static(schema) => Ok(schema.clone()),
            SchemaSource::Dynamic(f) => Ok(f(iteration)),
            SchemaSource::Deferred(f) => match mode {
                Mode::Sync => Err(pending()),
                Mode::Async => Ok(f(iteration).await),
            },
        }
    }
}

impl From<Schema> for SchemaSource {
    fn from(schema: Schema) -> Self {
        SchemaSource::Static(schema)
    }
}

impl fmt::Debug for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Static(schema) => f.debug_tuple("Static").field(schema).finish(),
            SchemaSource::Dynamic(_) => f.write_str("Dynamic(..)"),
            SchemaSource::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Post-build hook receiving the resolved value and its iteration.
#[derive(Clone)]
pub enum Transform {
    Sync(Arc<dyn Fn(Value, u64) -> Value + Send + Sync>),
    Async(Arc<dyn Fn(Value, u64) -> BoxFuture<'static, Value> + Send + Sync>),
}

impl Transform {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value, u64) -> Value + Send + Sync + 'static,
    {
        Transform::Sync(Arc::new(f))
    }

    pub fn new_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Value, u64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        Transform::Async(Arc::new(move |value, iteration| f(value, iteration).boxed()))
    }

    pub(crate) async fn apply(&self, value: Value, iteration: u64, mode: Mode) -> Result<Value> {
        match self {
            Transform::Sync(f) => Ok(f(value, iteration)),
            Transform::Async(f) => match mode {
                Mode::Sync => Err(FactoryError::PendingTransform),
                Mode::Async => Ok(f(value, iteration).await),
            },
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Sync(_) => f.write_str("Sync(..)"),
            Transform::Async(_) => f.write_str("Async(..)"),
        }
    }
}

/// Per-build configuration: overrides merged over the defaults, and a
/// transform replacing the factory's own for this call only.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub overrides: Option<SchemaSource>,
    pub transform: Option<Transform>,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overrides(mut self, overrides: impl Into<SchemaSource>) -> Self {
        self.overrides = Some(overrides.into());
        self
    }

    pub fn overrides_fn<F>(self, f: F) -> Self
    where
        F: Fn(u64) -> Schema + Send + Sync + 'static,
    {
        self.overrides(SchemaSource::from_fn(f))
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }
}

impl From<Schema> for BuildOptions {
    fn from(overrides: Schema) -> Self {
        BuildOptions::new().overrides(overrides)
    }
}

impl From<SchemaSource> for BuildOptions {
    fn from(overrides: SchemaSource) -> Self {
        BuildOptions::new().overrides(overrides)
    }
}

impl From<Transform> for BuildOptions {
    fn from(transform: Transform) -> Self {
        BuildOptions::new().transform(transform)
    }
}
