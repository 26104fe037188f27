//! Schema-driven value factories for test data.
//!
//! A [`Factory`] holds a default [`Schema`] whose fields are [`Node`]s:
//! literals, nested schemas, other factories, lazy references, sequences,
//! placeholders, or pending futures. Each build merges caller overrides over
//! the defaults, resolves every node for the current iteration, and runs an
//! optional transform. Builds come in two disciplines sharing one resolver:
//! asynchronous (`build`, `batch`) and synchronous (`build_sync`,
//! `batch_sync`), the latter failing wherever it would have to wait.

pub mod errors;
pub mod factory;
pub mod lazy;
pub mod merge;
pub mod node;
pub mod options;
pub mod path;
mod resolver;
pub mod schema;
pub mod sequence;

pub use errors::{FactoryError, Result};
pub use factory::Factory;
pub use lazy::LazyRef;
pub use merge::merge;
pub use node::{Node, NodeKind, PendingNode};
pub use options::{BuildOptions, Mode, SchemaSource, Transform};
pub use path::KeyPath;
pub use schema::Schema;
pub use sequence::{Cycle, Sample, Sequence, SharedSequence};
