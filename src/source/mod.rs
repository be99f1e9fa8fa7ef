//! Catalog metadata sources.
//!
//! A source yields the two ordered row streams the schema model is built
//! from. Both streams are fetched concurrently and joined before assembly.

mod duckdb;

pub use self::duckdb::DuckDbSource;

use crate::schema::{ConstraintMap, Table};
use anyhow::{anyhow, Result};
use std::thread;
use tracing::{debug, info};

/// A catalog that can list tables with their columns and constraints.
///
/// Implementations query their catalog with rows ordered by entity key and
/// fold them with [`crate::schema::merge_columns`] and
/// [`crate::schema::merge_constraints`].
pub trait MetadataSource: Send + Sized {
    /// Open a second handle to the same catalog for a concurrent fetch
    fn try_clone(&self) -> Result<Self>;

    /// Tables with their columns, ordered by owner and name
    fn tables(&self, owners: &OwnerFilter) -> Result<Vec<Table>>;

    /// Primary, unique and foreign key constraints grouped by owning table
    fn constraints(&self, owners: &OwnerFilter) -> Result<ConstraintMap>;
}

/// Restriction of both catalog queries to a set of owners.
///
/// Owners match case-insensitively. Values are interpolated into the query
/// text, so embedded quotes are doubled and line breaks become spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerFilter {
    owners: Vec<String>,
}

impl OwnerFilter {
    pub fn new<S: AsRef<str>>(owners: &[S]) -> Self {
        Self {
            owners: owners
                .iter()
                .map(|o| sanitize_owner(o.as_ref()))
                .filter(|o| !o.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    /// `AND upper(<column>) IN (...)`, or nothing when unrestricted
    pub fn sql(&self, column: &str) -> String {
        if self.owners.is_empty() {
            return String::new();
        }

        let list: Vec<String> = self.owners.iter().map(|o| format!("'{}'", o)).collect();
        format!("AND upper({}) IN ({})", column, list.join(","))
    }
}

fn sanitize_owner(owner: &str) -> String {
    owner
        .trim()
        .replace('\'', "''")
        .replace(['\r', '\n'], " ")
        .to_uppercase()
}

/// Fetch tables and constraints concurrently.
///
/// Columns are read through `source`, constraints through a cloned handle.
/// Both tasks run to completion and the first error is returned.
pub fn fetch<S: MetadataSource>(
    source: S,
    owners: &OwnerFilter,
) -> Result<(Vec<Table>, ConstraintMap)> {
    let other = source.try_clone()?;

    let (tables, constraints) = thread::scope(|s| {
        let tables = s.spawn(move || source.tables(owners));
        let constraints = s.spawn(move || other.constraints(owners));
        (
            join(tables.join(), "table"),
            join(constraints.join(), "constraint"),
        )
    });

    let tables = tables?;
    let constraints = constraints?;

    info!(
        tables = tables.len(),
        constrained_tables = constraints.len(),
        "fetched catalog metadata"
    );
    debug!(owners = ?owners.owners(), "owner filter");

    Ok((tables, constraints))
}

fn join<T>(result: thread::Result<Result<T>>, what: &str) -> Result<T> {
    result.map_err(|_| anyhow!("{} fetch task panicked", what))?
}
