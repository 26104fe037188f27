use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;

use crate::factory::Factory;
use crate::lazy::LazyRef;
use crate::schema::Schema;
use crate::sequence::SharedSequence;

/// A single field of a schema.
///
/// The variant decides how the resolver produces the field's value:
///
/// - `Literal` is copied into the output as-is (arrays included).
/// - `Nested` is resolved recursively with the same iteration.
/// - `Factory` is built with the factory's own counter.
/// - `Lazy` is evaluated against the current iteration.
/// - `Sequence` yields one node per resolution, which is resolved in turn.
/// - `Required` must be overridden before building.
/// - `Derived` must be supplied by the post-build transform.
/// - `Pending` is awaited by asynchronous builds and rejected by synchronous ones.
#[derive(Clone)]
pub enum Node {
    Literal(Value),
    Nested(Schema),
    Factory(Factory),
    Lazy(LazyRef),
    Sequence(SharedSequence),
    Required,
    Derived,
    Pending(PendingNode),
}

/// Discriminant of a [`Node`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Literal,
    Nested,
    Factory,
    Lazy,
    Sequence,
    Required,
    Derived,
    Pending,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Literal => "literal",
            NodeKind::Nested => "nested",
            NodeKind::Factory => "factory",
            NodeKind::Lazy => "lazy",
            NodeKind::Sequence => "sequence",
            NodeKind::Required => "required",
            NodeKind::Derived => "derived",
            NodeKind::Pending => "pending",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    pub fn null() -> Self {
        Node::Literal(Value::Null)
    }

    /// Wrap a future; asynchronous builds await it, synchronous builds fail on it.
    pub fn pending<F, N>(future: F) -> Self
    where
        F: Future<Output = N> + Send + 'static,
        N: Into<Node> + 'static,
    {
        Node::Pending(PendingNode::new(future))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Literal(_) => NodeKind::Literal,
            Node::Nested(_) => NodeKind::Nested,
            Node::Factory(_) => NodeKind::Factory,
            Node::Lazy(_) => NodeKind::Lazy,
            Node::Sequence(_) => NodeKind::Sequence,
            Node::Required => NodeKind::Required,
            Node::Derived => NodeKind::Derived,
            Node::Pending(_) => NodeKind::Pending,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Node::Required | Node::Derived)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Node::Pending(_))
    }

    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            Node::Nested(schema) => Some(schema),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Node::Literal(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Node::Nested(schema) => f.debug_tuple("Nested").field(schema).finish(),
            Node::Factory(factory) => f.debug_tuple("Factory").field(factory).finish(),
            Node::Lazy(lazy) => f.debug_tuple("Lazy").field(lazy).finish(),
            Node::Sequence(_) => f.write_str("Sequence(..)"),
            Node::Required => f.write_str("Required"),
            Node::Derived => f.write_str("Derived"),
            Node::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Memoised future shared by every clone, so a pending literal can be
/// awaited by any number of builds.
#[derive(Clone)]
pub struct PendingNode(Shared<BoxFuture<'static, Node>>);

impl PendingNode {
    pub fn new<F, N>(future: F) -> Self
    where
        F: Future<Output = N> + Send + 'static,
        N: Into<Node> + 'static,
    {
        Self(future.map(Into::<Node>::into).boxed().shared())
    }

    pub(crate) async fn settle(self) -> Node {
        self.0.await
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Node::Nested(Schema::from(map)),
            other => Node::Literal(other),
        }
    }
}

impl From<Schema> for Node {
    fn from(schema: Schema) -> Self {
        Node::Nested(schema)
    }
}

impl From<Factory> for Node {
    fn from(factory: Factory) -> Self {
        Node::Factory(factory)
    }
}

impl From<&Factory> for Node {
    fn from(factory: &Factory) -> Self {
        Node::Factory(factory.clone())
    }
}

impl From<LazyRef> for Node {
    fn from(lazy: LazyRef) -> Self {
        Node::Lazy(lazy)
    }
}

impl From<SharedSequence> for Node {
    fn from(sequence: SharedSequence) -> Self {
        Node::Sequence(sequence)
    }
}

impl From<PendingNode> for Node {
    fn from(pending: PendingNode) -> Self {
        Node::Pending(pending)
    }
}

macro_rules! literal_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_from!(bool, i32, i64, u32, u64, usize, f64, &str, String, Vec<Value>);

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_else(Node::null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_become_nested_schemas() {
        let node = Node::from(json!({"type": "none"}));
        assert_eq!(node.kind(), NodeKind::Nested);
        let schema = node.as_schema().expect("nested schema");
        assert_eq!(
            schema.get("type").and_then(Node::as_literal),
            Some(&json!("none"))
        );
    }

    #[test]
    fn arrays_and_null_stay_literal() {
        assert_eq!(Node::from(json!([1, 2])).kind(), NodeKind::Literal);
        assert_eq!(Node::from(Value::Null).kind(), NodeKind::Literal);
        assert_eq!(Node::from(None::<i64>).as_literal(), Some(&Value::Null));
    }

    #[test]
    fn placeholders_are_classified() {
        assert!(Node::Required.is_placeholder());
        assert!(Node::Derived.is_placeholder());
        assert!(!Node::from(1).is_placeholder());
        assert!(Node::pending(async { 1 }).is_pending());
    }
}
