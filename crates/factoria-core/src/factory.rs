use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::errors::{FactoryError, Result};
use crate::lazy::LazyRef;
use crate::merge::merge;
use crate::node::Node;
use crate::options::{BuildOptions, Mode, SchemaSource, Transform};
use crate::path::KeyPath;
use crate::resolver::Resolver;
use crate::sequence::{Cycle, Sample, SharedSequence};

/// Builds values from a default schema.
///
/// `Factory` is a cheap handle: clones share the defaults, the transform and
/// the iteration counter. The counter advances by one per build with a single
/// atomic `fetch_add`, so concurrent callers never observe the same
/// iteration, but the order in which they receive iterations is theirs to
/// serialise. One factory is meant to be one logical build stream.
#[derive(Clone)]
pub struct Factory {
    inner: Arc<FactoryInner>,
}

struct FactoryInner {
    defaults: SchemaSource,
    transform: Option<Transform>,
    counter: AtomicU64,
}

impl Factory {
    pub fn new(defaults: impl Into<SchemaSource>) -> Self {
        Self::from_parts(defaults.into(), None)
    }

    pub fn with_transform(defaults: impl Into<SchemaSource>, transform: Transform) -> Self {
        Self::from_parts(defaults.into(), Some(transform))
    }

    fn from_parts(defaults: SchemaSource, transform: Option<Transform>) -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                defaults,
                transform,
                counter: AtomicU64::new(0),
            }),
        }
    }

    /// Iteration the next build will receive.
    pub fn counter(&self) -> u64 {
        self.inner.counter.load(Ordering::SeqCst)
    }

    pub fn reset_counter(&self, value: u64) {
        self.inner.counter.store(value, Ordering::SeqCst);
    }

    pub async fn build(&self) -> Result<Value> {
        self.build_with(BuildOptions::default()).await
    }

    pub async fn build_with(&self, options: impl Into<BuildOptions>) -> Result<Value> {
        self.build_in(Mode::Async, options.into()).await
    }

    pub fn build_sync(&self) -> Result<Value> {
        self.build_sync_with(BuildOptions::default())
    }

    /// Build without suspending; fails if any part of the build is pending.
    pub fn build_sync_with(&self, options: impl Into<BuildOptions>) -> Result<Value> {
        run_sync(self.build_in(Mode::Sync, options.into()))
    }

    pub async fn batch(&self, size: usize) -> Result<Vec<Value>> {
        self.batch_with(size, BuildOptions::default()).await
    }

    /// Build `size` values concurrently; iterations are assigned in order
    /// starting from the current counter.
    ///
    /// The whole block of iterations is claimed up front: if one element
    /// fails, the counter still ends `size` past where it started.
    pub async fn batch_with(&self, size: usize, options: impl Into<BuildOptions>) -> Result<Vec<Value>> {
        self.batch_in(Mode::Async, size, options.into()).await
    }

    pub fn batch_sync(&self, size: usize) -> Result<Vec<Value>> {
        self.batch_sync_with(size, BuildOptions::default())
    }

    pub fn batch_sync_with(&self, size: usize, options: impl Into<BuildOptions>) -> Result<Vec<Value>> {
        run_sync(self.batch_in(Mode::Sync, size, options.into()))
    }

    pub async fn build_as<T: DeserializeOwned>(&self, options: impl Into<BuildOptions>) -> Result<T> {
        let value = self.build_with(options).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn build_sync_as<T: DeserializeOwned>(&self, options: impl Into<BuildOptions>) -> Result<T> {
        let value = self.build_sync_with(options)?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn batch_as<T: DeserializeOwned>(
        &self,
        size: usize,
        options: impl Into<BuildOptions>,
    ) -> Result<Vec<T>> {
        let values = self.batch_with(size, options).await?;
        deserialize_all(values)
    }

    pub fn batch_sync_as<T: DeserializeOwned>(
        &self,
        size: usize,
        options: impl Into<BuildOptions>,
    ) -> Result<Vec<T>> {
        let values = self.batch_sync_with(size, options)?;
        deserialize_all(values)
    }

    pub(crate) fn build_in(&self, mode: Mode, options: BuildOptions) -> BoxFuture<'_, Result<Value>> {
        match self.reserve(1) {
            Ok(iteration) => self.build_at(mode, iteration, options),
            Err(err) => futures::future::ready(Err(err)).boxed(),
        }
    }

    /// Claim `count` consecutive iterations, returning the first.
    ///
    /// Iterations are claimed before any value is built, so a batch that
    /// fails partway still consumes its whole block.
    fn reserve(&self, count: u64) -> Result<u64> {
        self.inner
            .counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                current.checked_add(count)
            })
            .map_err(|current| FactoryError::CounterOverflow { current, count })
    }

    pub(crate) fn batch_in(
        &self,
        mode: Mode,
        size: usize,
        options: BuildOptions,
    ) -> BoxFuture<'_, Result<Vec<Value>>> {
        let start = match self.reserve(size as u64) {
            Ok(start) => start,
            Err(err) => return futures::future::ready(Err(err)).boxed(),
        };
        let iterations = start..start + size as u64;
        debug!(size, start, mode = ?mode, "factory batch started");
        async move {
            match mode {
                Mode::Sync => {
                    let mut values = Vec::with_capacity(size);
                    for iteration in iterations {
                        values.push(self.build_at(mode, iteration, options.clone()).await?);
                    }
                    Ok(values)
                }
                Mode::Async => {
                    try_join_all(
                        iterations.map(|iteration| self.build_at(mode, iteration, options.clone())),
                    )
                    .await
                }
            }
        }
        .boxed()
    }

    fn build_at(&self, mode: Mode, iteration: u64, options: BuildOptions) -> BoxFuture<'_, Result<Value>> {
        async move {
            let defaults = self
                .inner
                .defaults
                .produce(iteration, mode, || FactoryError::PendingDefaults)
                .await?;
            let overrides = match &options.overrides {
                Some(source) => Some(
                    source
                        .produce(iteration, mode, || FactoryError::PendingOverrides)
                        .await?,
                ),
                None => None,
            };
            let merged = merge(&defaults, [overrides.as_ref()]);
            let draft = Resolver::new(iteration, mode).resolve(&merged).await?;
            ensure_no_required(draft.required)?;

            let mut value = Value::Object(draft.value);
            let transform = options.transform.as_ref().or(self.inner.transform.as_ref());
            if let Some(transform) = transform {
                value = transform.apply(value, iteration, mode).await?;
            }
            ensure_derived(&value, &draft.derived)?;

            debug!(iteration, mode = ?mode, "factory build completed");
            Ok(value)
        }
        .boxed()
    }

    pub fn required() -> Node {
        Node::Required
    }

    pub fn derived() -> Node {
        Node::Derived
    }

    /// Lazy field computed from the current iteration.
    pub fn bind<F, N>(f: F) -> Node
    where
        F: Fn(u64) -> N + Send + Sync + 'static,
        N: Into<Node>,
    {
        Node::Lazy(LazyRef::bound(f))
    }

    /// Lazy field computed asynchronously; only asynchronous builds accept it.
    pub fn bind_async<F, Fut, N>(f: F) -> Node
    where
        F: Fn(u64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = N> + Send + 'static,
        N: Into<Node> + 'static,
    {
        Node::Lazy(LazyRef::bound(move |iteration| Node::pending(f(iteration))))
    }

    /// Field built by another factory with the given options.
    pub fn use_factory(factory: &Factory, options: impl Into<BuildOptions>) -> Node {
        Node::Lazy(LazyRef::factory(factory, options.into(), None))
    }

    /// Field holding a batch of `size` values built by another factory.
    pub fn use_batch(factory: &Factory, size: usize, options: impl Into<BuildOptions>) -> Node {
        Node::Lazy(LazyRef::factory(factory, options.into(), Some(size)))
    }

    /// Field cycling through `values` across builds.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn iterate<I, T>(values: I) -> Node
    where
        I: IntoIterator<Item = T>,
        T: Into<Node> + Clone + Send + 'static,
    {
        Node::Sequence(SharedSequence::new(Cycle::new(values)))
    }

    /// Field drawing a random element of `values` on every build, never the
    /// same value as the previous build when another value is available.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn sample<I, T>(values: I) -> Node
    where
        I: IntoIterator<Item = T>,
        T: Into<Node> + Clone + PartialEq + Send + 'static,
    {
        Node::Sequence(SharedSequence::new(Sample::new(values)))
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("defaults", &self.inner.defaults)
            .field("transform", &self.inner.transform)
            .field("counter", &self.counter())
            .finish()
    }
}

/// Drive a build that must not suspend. No pending value is ever awaited in
/// `Mode::Sync`, so the future completes on its first poll.
fn run_sync<T>(future: BoxFuture<'_, Result<T>>) -> Result<T> {
    future.now_or_never().unwrap_or(Err(FactoryError::Suspended))
}

fn ensure_no_required(paths: Vec<KeyPath>) -> Result<()> {
    if paths.is_empty() {
        return Ok(());
    }
    Err(FactoryError::MissingRequiredArgument {
        paths: paths.iter().map(ToString::to_string).collect(),
    })
}

fn ensure_derived(value: &Value, derived: &[KeyPath]) -> Result<()> {
    let missing: Vec<String> = derived
        .iter()
        .filter(|path| path.lookup(value).is_none())
        .map(ToString::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(FactoryError::MissingDerivedValue { paths: missing })
    }
}

fn deserialize_all<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>> {
    values
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(FactoryError::from))
        .collect()
}
