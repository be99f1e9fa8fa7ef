//! Display order for tables.
//!
//! Tables are first ranked by referential weight, heaviest first, then
//! stably regrouped by owner and a group key derived from the name so that
//! tables sharing a name segment end up next to each other.

use super::Table;
use std::cmp::Ordering;

/// Derive the clustering key of a table name.
///
/// The name is split on `_` into at most three parts and the first part
/// after the leading one that is longer than two bytes is returned. Names
/// without such a part are their own group.
pub fn group_key(name: &str) -> &str {
    name.splitn(3, '_')
        .skip(1)
        .find(|part| part.len() > 2)
        .unwrap_or(name)
}

/// Order tables by (constraint count, column count), heaviest first.
pub fn rank_by_size(tables: &mut [Table]) {
    tables.sort_unstable_by(|a, b| b.weight().cmp(&a.weight()));
}

/// Stably order tables by owner, group key and name.
pub fn group_by_name(tables: &mut [Table]) {
    tables.sort_by(compare_by_group);
}

/// Apply both ordering passes.
pub fn rank(tables: &mut [Table]) {
    rank_by_size(tables);
    group_by_name(tables);
}

fn compare_by_group(a: &Table, b: &Table) -> Ordering {
    a.owner
        .cmp(&b.owner)
        .then_with(|| group_key(&a.name).cmp(group_key(&b.name)))
        .then_with(|| a.name.cmp(&b.name))
}
