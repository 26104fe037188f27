use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::trace;

use crate::errors::{FactoryError, Result};
use crate::lazy::LazyRef;
use crate::node::Node;
use crate::options::{BuildOptions, Mode};
use crate::path::KeyPath;
use crate::schema::Schema;

/// Output of resolving a merged schema, before the transform runs.
#[derive(Debug, Default)]
pub(crate) struct Draft {
    pub value: Map<String, Value>,
    /// `required()` placeholders produced while resolving (e.g. by a lazy function).
    pub required: Vec<KeyPath>,
    /// Fields left out of `value` because they are `derived()`.
    pub derived: Vec<KeyPath>,
}

/// Walks a schema for one build iteration.
pub(crate) struct Resolver {
    iteration: u64,
    mode: Mode,
}

impl Resolver {
    pub fn new(iteration: u64, mode: Mode) -> Self {
        Self { iteration, mode }
    }

    pub async fn resolve(&self, schema: &Schema) -> Result<Draft> {
        let mut draft = Draft::default();
        let root = KeyPath::root();
        let value = self.resolve_schema(schema, &root, &mut draft).await?;
        draft.value = value;
        Ok(draft)
    }

    fn resolve_schema<'a>(
        &'a self,
        schema: &'a Schema,
        parent: &'a KeyPath,
        draft: &'a mut Draft,
    ) -> BoxFuture<'a, Result<Map<String, Value>>> {
        async move {
            let mut output = Map::new();
            for (key, node) in schema {
                let path = parent.child(key);
                if let Some(value) = self.resolve_node(node.clone(), &path, draft).await? {
                    output.insert(key.clone(), value);
                }
            }
            Ok(output)
        }
        .boxed()
    }

    /// Resolve a single node; `None` means the field is left out of the output.
    fn resolve_node<'a>(
        &'a self,
        node: Node,
        path: &'a KeyPath,
        draft: &'a mut Draft,
    ) -> BoxFuture<'a, Result<Option<Value>>> {
        async move {
            trace!(path = %path, kind = %node.kind(), iteration = self.iteration, "resolving node");
            match node {
                Node::Literal(value) => Ok(Some(value)),
                Node::Nested(schema) => {
                    let map = self.resolve_schema(&schema, path, draft).await?;
                    Ok(Some(Value::Object(map)))
                }
                Node::Factory(factory) => factory
                    .build_in(self.mode, BuildOptions::default())
                    .await
                    .map(Some),
                Node::Lazy(LazyRef::Bound(f)) => {
                    let produced = f(self.iteration);
                    self.resolve_node(produced, path, draft).await
                }
                Node::Lazy(LazyRef::Factory {
                    factory,
                    options,
                    batch,
                }) => match batch {
                    Some(size) => factory
                        .batch_in(self.mode, size, options)
                        .await
                        .map(|values| Some(Value::Array(values))),
                    None => factory.build_in(self.mode, options).await.map(Some),
                },
                Node::Sequence(sequence) => {
                    let produced = sequence.pull();
                    self.resolve_node(produced, path, draft).await
                }
                Node::Required => {
                    draft.required.push(path.clone());
                    Ok(None)
                }
                Node::Derived => {
                    draft.derived.push(path.clone());
                    Ok(None)
                }
                Node::Pending(pending) => match self.mode {
                    Mode::Sync => Err(FactoryError::PendingValue {
                        path: path.to_string(),
                    }),
                    Mode::Async => {
                        let settled = pending.settle().await;
                        self.resolve_node(settled, path, draft).await
                    }
                },
            }
        }
        .boxed()
    }
}
