//! Schema model for relationship graphs.
//!
//! This module provides:
//! - Data models for tables, columns and their constraints
//! - Folding of ordered catalog rows into tables and constraints
//! - Attaching constraints to their owning tables
//! - A deterministic display order that keeps related tables together

mod assemble;
mod merge;
mod rank;

pub use assemble::*;
pub use merge::*;
pub use rank::*;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identity of a table across the whole graph
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableKey {
    pub owner: String,
    pub name: String,
}

impl TableKey {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// A column of a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Column {
    pub name: String,
    /// Display type, e.g. `DECIMAL(10,2)` or `VARCHAR NOT NULL`
    #[serde(rename = "Type")]
    pub col_type: String,
    #[serde(default)]
    pub comment: String,
    /// Part of a primary key or unique constraint of the owning table
    #[serde(default)]
    pub unique: bool,
}

/// A table with its columns and outgoing foreign keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Table {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub comment: String,
    /// Columns in catalog position order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub columns: Vec<Column>,
    /// Foreign keys in catalog order, attached by [`assemble`]
    #[serde(default, deserialize_with = "null_as_empty")]
    pub constraints: Vec<TableConstraint>,
}

impl Table {
    pub fn key(&self) -> TableKey {
        TableKey::new(self.owner.as_str(), self.name.as_str())
    }

    /// Referential weight used by [`rank_by_size`]
    pub fn weight(&self) -> (usize, usize) {
        (self.constraints.len(), self.columns.len())
    }
}

/// A constraint as seen from its owning table.
///
/// An empty `remote_table` marks a primary key or unique constraint,
/// which never becomes an edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableConstraint {
    /// Local columns in constraint position order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub columns: Vec<String>,
    #[serde(default)]
    pub remote_owner: String,
    #[serde(default)]
    pub remote_table: String,
    /// Name of the referenced primary or unique key
    #[serde(default)]
    pub remote_name: String,
}

impl TableConstraint {
    pub fn is_foreign_key(&self) -> bool {
        !self.remote_table.is_empty()
    }
}

/// Catalog constraint kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    #[serde(rename = "P")]
    Primary,
    #[serde(rename = "U")]
    Unique,
    #[serde(rename = "R")]
    Foreign,
}

impl ConstraintType {
    pub fn as_code(self) -> &'static str {
        match self {
            ConstraintType::Primary => "P",
            ConstraintType::Unique => "U",
            ConstraintType::Foreign => "R",
        }
    }
}

impl FromStr for ConstraintType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "P" => Ok(ConstraintType::Primary),
            "U" => Ok(ConstraintType::Unique),
            "R" => Ok(ConstraintType::Foreign),
            other => Err(format!(
                "Unknown constraint type: {}. Valid options: P, U, R",
                other
            )),
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// A merged catalog constraint before it is attached to its table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Constraint {
    pub owner: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub constraint_type: ConstraintType,
    pub table: String,
    #[serde(flatten)]
    pub link: TableConstraint,
}

impl Constraint {
    /// Key of the table owning this constraint
    pub fn table_key(&self) -> TableKey {
        TableKey::new(self.owner.as_str(), self.table.as_str())
    }
}

/// Constraints grouped by owning table, each list in catalog order
pub type ConstraintMap = BTreeMap<TableKey, Vec<Constraint>>;

/// Assemble merged catalog data into the ranked table list every renderer consumes.
pub fn build_graph(tables: Vec<Table>, constraints: &ConstraintMap) -> Vec<Table> {
    let mut tables = assemble(tables, constraints);
    rank(&mut tables);
    tables
}

/// Accept JSON `null` where a list is expected
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_type_codes() {
        assert_eq!("P".parse::<ConstraintType>(), Ok(ConstraintType::Primary));
        assert_eq!("U".parse::<ConstraintType>(), Ok(ConstraintType::Unique));
        assert_eq!("R".parse::<ConstraintType>(), Ok(ConstraintType::Foreign));
        assert!("C".parse::<ConstraintType>().is_err());
        assert_eq!(ConstraintType::Foreign.to_string(), "R");
    }

    #[test]
    fn test_table_key_display() {
        assert_eq!(TableKey::new("HR", "EMPLOYEES").to_string(), "HR.EMPLOYEES");
    }

    #[test]
    fn test_table_key_avoids_separator_collisions() {
        assert_ne!(TableKey::new("A.B", "C"), TableKey::new("A", "B.C"));
    }

    #[test]
    fn test_constraint_json_is_flat() {
        let constraint = Constraint {
            owner: "HR".to_string(),
            name: "EMP_DEPT_FK".to_string(),
            constraint_type: ConstraintType::Foreign,
            table: "EMPLOYEES".to_string(),
            link: TableConstraint {
                columns: vec!["DEPT_ID".to_string()],
                remote_owner: "HR".to_string(),
                remote_table: "DEPARTMENTS".to_string(),
                remote_name: "DEPT_PK".to_string(),
            },
        };

        let json = serde_json::to_value(&constraint).unwrap();
        assert_eq!(json["Type"], "R");
        assert_eq!(json["Columns"][0], "DEPT_ID");
        assert_eq!(json["RemoteTable"], "DEPARTMENTS");
        assert!(json.get("Link").is_none());
    }

    #[test]
    fn test_null_lists_decode_as_empty() {
        let table: Table = serde_json::from_str(
            r#"{"Owner":"HR","Name":"JOBS","Comment":"","Columns":null,"Constraints":null}"#,
        )
        .unwrap();
        assert!(table.columns.is_empty());
        assert!(table.constraints.is_empty());
    }
}
