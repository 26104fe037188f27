//! Layering of override schemas onto defaults.

use crate::node::Node;
use crate::schema::Schema;

/// Deep-merge `sources` onto a copy of `target`, left to right.
///
/// When both sides hold a nested schema the merge recurses; any other
/// incoming node (arrays included) replaces the existing one outright.
/// Absent sources (`None`) are skipped. Inputs are never mutated.
pub fn merge<'a, I, S>(target: &Schema, sources: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<Option<&'a Schema>>,
{
    let mut merged = target.clone();
    for source in sources.into_iter().filter_map(Into::into) {
        merge_into(&mut merged, source);
    }
    merged
}

fn merge_into(target: &mut Schema, source: &Schema) {
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (Some(Node::Nested(existing)), Node::Nested(incoming)) => {
                merge_into(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}
