//! Attaching merged constraints to their owning tables.

use super::{ConstraintMap, ConstraintType, Table};
use ahash::AHashSet;

/// Join constraints onto tables.
///
/// Foreign keys become the table's constraint list in catalog order. Primary
/// and unique keys only mark their columns as unique. Any constraint list the
/// tables already carried is replaced, so running this twice on the same
/// input gives the same result.
pub fn assemble(tables: Vec<Table>, constraints: &ConstraintMap) -> Vec<Table> {
    tables
        .into_iter()
        .map(|mut table| {
            let mut links = Vec::new();
            let mut unique: AHashSet<&str> = AHashSet::with_capacity(table.columns.len());

            for constraint in constraints.get(&table.key()).into_iter().flatten() {
                match constraint.constraint_type {
                    ConstraintType::Foreign => links.push(constraint.link.clone()),
                    ConstraintType::Primary | ConstraintType::Unique => {
                        unique.extend(constraint.link.columns.iter().map(String::as_str));
                    }
                }
            }

            for column in &mut table.columns {
                column.unique = unique.contains(column.name.as_str());
            }
            table.constraints = links;
            table
        })
        .collect()
}
