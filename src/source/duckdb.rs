//! DuckDB catalog source.
//!
//! Reads table, column and constraint metadata from the `duckdb_tables()`,
//! `duckdb_columns()` and `duckdb_constraints()` catalog functions. Schemas
//! play the role of owners.

use super::{MetadataSource, OwnerFilter};
use crate::schema::{
    merge_columns, merge_constraints, ColumnRow, ConstraintMap, ConstraintType, ConstraintRow,
    Table,
};
use anyhow::{Context, Result};
use duckdb::types::Type;
use duckdb::{AccessMode, Config, Connection};
use std::path::Path;
use tracing::debug;

/// Metadata source backed by a DuckDB database
pub struct DuckDbSource {
    conn: Connection,
}

impl DuckDbSource {
    /// Open a database file read-only
    pub fn open(path: &Path) -> Result<Self> {
        let config = Config::default()
            .access_mode(AccessMode::ReadOnly)
            .context("Failed to configure DuckDB connection")?;
        let conn = Connection::open_with_flags(path, config)
            .with_context(|| format!("Failed to open DuckDB database: {}", path.display()))?;
        Ok(Self { conn })
    }

    /// Use an existing connection, e.g. an in-memory database
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn columns_query(owners: &OwnerFilter) -> String {
        format!(
            "SELECT c.schema_name, c.table_name, c.column_name,
       c.data_type || CASE WHEN c.is_nullable THEN '' ELSE ' NOT NULL' END AS data_type,
       t.comment AS tab_comment,
       c.comment AS col_comment
  FROM duckdb_columns() c
  JOIN duckdb_tables() t ON t.database_name = c.database_name
                        AND t.schema_name = c.schema_name
                        AND t.table_name = c.table_name
 WHERE NOT c.internal AND strpos(c.table_name, '$') = 0
       {}
 ORDER BY c.schema_name, c.table_name, c.column_index",
            owners.sql("c.schema_name")
        )
    }

    fn constraints_query(owners: &OwnerFilter) -> String {
        format!(
            "WITH cons AS (
  SELECT database_name, schema_name, table_name, constraint_name,
         CASE constraint_type WHEN 'PRIMARY KEY' THEN 'P' WHEN 'UNIQUE' THEN 'U' ELSE 'R' END AS kind,
         constraint_column_names, referenced_table, referenced_column_names
    FROM duckdb_constraints()
   WHERE constraint_type IN ('PRIMARY KEY', 'UNIQUE', 'FOREIGN KEY')
), cols AS (
  SELECT a.schema_name, a.constraint_name, a.kind, a.table_name,
         unnest(a.constraint_column_names) AS column_name,
         unnest(range(1, len(a.constraint_column_names) + 1)) AS column_pos,
         CASE WHEN a.kind = 'R' THEN a.schema_name END AS r_owner,
         CASE WHEN a.kind = 'R' THEN a.referenced_table END AS r_table,
         pk.constraint_name AS r_constraint
    FROM cons a
    LEFT JOIN cons pk ON a.kind = 'R'
                     AND pk.kind IN ('P', 'U')
                     AND pk.database_name = a.database_name
                     AND pk.schema_name = a.schema_name
                     AND pk.table_name = a.referenced_table
                     AND pk.constraint_column_names = a.referenced_column_names
   WHERE 1 = 1 {}
)
SELECT schema_name, constraint_name, kind, table_name, column_name,
       r_owner, r_table, r_constraint
  FROM cols
 ORDER BY schema_name, constraint_name, kind, table_name, column_pos",
            owners.sql("a.schema_name")
        )
    }
}

impl MetadataSource for DuckDbSource {
    fn try_clone(&self) -> Result<Self> {
        let conn = self
            .conn
            .try_clone()
            .context("Failed to open second DuckDB connection")?;
        Ok(Self { conn })
    }

    fn tables(&self, owners: &OwnerFilter) -> Result<Vec<Table>> {
        let sql = Self::columns_query(owners);
        debug!(%sql, "querying columns");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .with_context(|| format!("Failed to prepare query: {}", sql))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ColumnRow {
                    owner: row.get(0)?,
                    table: row.get(1)?,
                    column: row.get(2)?,
                    col_type: row.get(3)?,
                    table_comment: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    column_comment: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                })
            })
            .with_context(|| format!("Failed to execute query: {}", sql))?;

        let tables = merge_columns(rows.map(|row| row.context("Failed to decode column row")))?;
        debug!(tables = tables.len(), "merged column rows");
        Ok(tables)
    }

    fn constraints(&self, owners: &OwnerFilter) -> Result<ConstraintMap> {
        let sql = Self::constraints_query(owners);
        debug!(%sql, "querying constraints");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .with_context(|| format!("Failed to prepare query: {}", sql))?;
        let rows = stmt
            .query_map([], |row| {
                let code: String = row.get(2)?;
                let constraint_type = code.parse::<ConstraintType>().map_err(|e| {
                    duckdb::Error::FromSqlConversionFailure(2, Type::Text, e.into())
                })?;
                Ok(ConstraintRow {
                    owner: row.get(0)?,
                    name: row.get(1)?,
                    constraint_type,
                    table: row.get(3)?,
                    column: row.get(4)?,
                    remote_owner: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    remote_table: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                    remote_name: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                })
            })
            .with_context(|| format!("Failed to execute query: {}", sql))?;

        let constraints =
            merge_constraints(rows.map(|row| row.context("Failed to decode constraint row")))?;
        Ok(constraints)
    }
}
