//! Folding of ordered catalog rows into tables and constraints.
//!
//! Both row streams arrive sorted by their entity key, so grouping is a
//! single pass that starts a new entity whenever the key changes. Rows that
//! are not sorted produce duplicate entities rather than an error.

use super::{Column, Constraint, ConstraintMap, ConstraintType, Table, TableConstraint, TableKey};
use anyhow::Result;

/// One catalog row per column, ordered by (owner, table, column position)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRow {
    pub owner: String,
    pub table: String,
    pub column: String,
    pub col_type: String,
    pub table_comment: String,
    pub column_comment: String,
}

/// One catalog row per constraint column, ordered by (owner, constraint, column position)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintRow {
    pub owner: String,
    pub name: String,
    pub constraint_type: ConstraintType,
    pub table: String,
    pub column: String,
    pub remote_owner: String,
    pub remote_table: String,
    pub remote_name: String,
}

/// Fold consecutive rows sharing a key into one entity each.
///
/// `start` builds a new entity from the first row of a run and `append`
/// adds every further row of the same run. The first row error aborts the
/// fold and discards what was accumulated.
pub fn fold_runs<R, K, T, E>(
    rows: impl IntoIterator<Item = Result<R, E>>,
    key: impl Fn(&R) -> K,
    start: impl Fn(R) -> T,
    append: impl Fn(&mut T, R),
) -> Result<Vec<T>, E>
where
    K: PartialEq,
{
    let mut entities = Vec::new();
    let mut current: Option<(K, T)> = None;

    for row in rows {
        let row = row?;
        let row_key = key(&row);

        if let Some((prev_key, entity)) = current.as_mut() {
            if *prev_key == row_key {
                append(entity, row);
                continue;
            }
        }

        if let Some((_, done)) = current.replace((row_key, start(row))) {
            entities.push(done);
        }
    }

    if let Some((_, done)) = current {
        entities.push(done);
    }

    Ok(entities)
}

/// Merge column rows into tables, keeping column position order.
pub fn merge_columns(rows: impl IntoIterator<Item = Result<ColumnRow>>) -> Result<Vec<Table>> {
    fold_runs(
        rows,
        |row| TableKey::new(row.owner.as_str(), row.table.as_str()),
        |row| {
            let comment = row.table_comment.trim().to_string();
            Table {
                columns: vec![column_of(&row)],
                owner: row.owner,
                name: row.table,
                comment,
                constraints: Vec::new(),
            }
        },
        |table, row| table.columns.push(column_of(&row)),
    )
}

fn column_of(row: &ColumnRow) -> Column {
    Column {
        name: row.column.clone(),
        col_type: row.col_type.clone(),
        comment: row.column_comment.trim().to_string(),
        unique: false,
    }
}

/// Merge constraint rows into constraints grouped by owning table.
///
/// Runs are keyed on owner, name, type, table and remote endpoint, so two
/// rows only join when they describe the same constraint.
pub fn merge_constraints(
    rows: impl IntoIterator<Item = Result<ConstraintRow>>,
) -> Result<ConstraintMap> {
    let constraints = fold_runs(
        rows,
        |row| {
            (
                row.owner.clone(),
                row.name.clone(),
                row.constraint_type,
                row.table.clone(),
                row.remote_owner.clone(),
                row.remote_table.clone(),
                row.remote_name.clone(),
            )
        },
        |row| Constraint {
            owner: row.owner,
            name: row.name,
            constraint_type: row.constraint_type,
            table: row.table,
            link: TableConstraint {
                columns: vec![row.column],
                remote_owner: row.remote_owner,
                remote_table: row.remote_table,
                remote_name: row.remote_name,
            },
        },
        |constraint, row| constraint.link.columns.push(row.column),
    )?;

    Ok(group_by_table(constraints))
}

/// Group constraints under their owning table, keeping their relative order.
pub fn group_by_table(constraints: impl IntoIterator<Item = Constraint>) -> ConstraintMap {
    let mut map = ConstraintMap::new();
    for constraint in constraints {
        map.entry(constraint.table_key())
            .or_default()
            .push(constraint);
    }
    map
}
