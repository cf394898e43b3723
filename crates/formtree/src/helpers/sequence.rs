use std::cmp::Ordering;

use formtree_util::insertion_sort_by;
use indexmap::IndexMap;

use crate::schema::SchemaNode;

/// Properties in display order.
///
/// Ascending `sequence_number`; properties without one come after all
/// numbered ones. Ties keep declaration order.
pub fn sort_by_sequence(properties: &IndexMap<String, SchemaNode>) -> Vec<(&String, &SchemaNode)> {
    let mut ordered: Vec<_> = properties.iter().collect();
    insertion_sort_by(&mut ordered, |(_, a), (_, b)| {
        match (a.sequence_number, b.sequence_number) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    ordered
}
