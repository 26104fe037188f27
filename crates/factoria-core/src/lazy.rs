use std::fmt;
use std::sync::Arc;

use crate::factory::Factory;
use crate::node::Node;
use crate::options::BuildOptions;

/// Function of the build iteration producing a node.
pub type BoundFn = Arc<dyn Fn(u64) -> Node + Send + Sync>;

/// Deferred field value, evaluated in the context of the current build.
#[derive(Clone)]
pub enum LazyRef {
    /// Called with the iteration of the enclosing build; the returned node is
    /// resolved like any other field.
    Bound(BoundFn),
    /// Builds another factory with the carried options, or a batch of it
    /// when `batch` is set.
    Factory {
        factory: Factory,
        options: BuildOptions,
        batch: Option<usize>,
    },
}

impl LazyRef {
    pub fn bound<F, N>(f: F) -> Self
    where
        F: Fn(u64) -> N + Send + Sync + 'static,
        N: Into<Node>,
    {
        LazyRef::Bound(Arc::new(move |iteration| f(iteration).into()))
    }

    pub fn factory(factory: &Factory, options: BuildOptions, batch: Option<usize>) -> Self {
        LazyRef::Factory {
            factory: factory.clone(),
            options,
            batch,
        }
    }
}

impl fmt::Debug for LazyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LazyRef::Bound(_) => f.write_str("Bound(..)"),
            LazyRef::Factory {
                factory,
                options,
                batch,
            } => f
                .debug_struct("Factory")
                .field("factory", factory)
                .field("options", options)
                .field("batch", batch)
                .finish(),
        }
    }
}
