//! Read-only view over a ranked table list for rendering.

use crate::schema::{group_key, Table, TableKey};
use ahash::AHashSet;

/// A run of consecutive tables sharing a group key
#[derive(Debug, Clone, Copy)]
pub struct Cluster<'a> {
    /// Group key shared by every table in the run
    pub key: &'a str,
    pub tables: &'a [Table],
}

/// A foreign key edge between two tables
#[derive(Debug, Clone, Copy)]
pub struct EdgeInfo<'a> {
    /// Table owning the foreign key
    pub from: &'a Table,
    /// First local column of the key, used as port on both ends
    pub port: &'a str,
    pub to_owner: &'a str,
    pub to_table: &'a str,
    /// Name of the referenced key
    pub label: &'a str,
}

impl EdgeInfo<'_> {
    pub fn from_id(&self) -> String {
        node_id(&self.from.owner, &self.from.name)
    }

    pub fn to_id(&self) -> String {
        node_id(self.to_owner, self.to_table)
    }
}

/// Separator between the owner and name parts of a node id
pub const ID_SEPARATOR: &str = "__";

/// Make a name safe for use inside a node id.
pub fn normalize(s: &str) -> String {
    s.replace('.', ID_SEPARATOR).replace('$', "_")
}

/// Node id of a table, unique across the graph
pub fn node_id(owner: &str, name: &str) -> String {
    format!("{}{}{}", normalize(owner), ID_SEPARATOR, normalize(name))
}

/// The ranked tables every renderer iterates
#[derive(Debug, Clone, Copy)]
pub struct GraphView<'a> {
    pub tables: &'a [Table],
}

impl<'a> GraphView<'a> {
    pub fn new(tables: &'a [Table]) -> Self {
        Self { tables }
    }

    /// Consecutive runs of tables with the same group key, in table order
    pub fn clusters(&self) -> impl Iterator<Item = Cluster<'a>> + 'a {
        self.tables
            .chunk_by(|a, b| group_key(&a.name) == group_key(&b.name))
            .map(|tables| Cluster {
                key: group_key(&tables[0].name),
                tables,
            })
    }

    /// Foreign key edges in table order; constraints without a remote table are skipped
    pub fn edges(&self) -> impl Iterator<Item = EdgeInfo<'a>> + 'a {
        self.tables.iter().flat_map(|table| {
            table
                .constraints
                .iter()
                .filter(|c| c.is_foreign_key())
                .map(move |c| EdgeInfo {
                    from: table,
                    port: c.columns.first().map(String::as_str).unwrap_or_default(),
                    to_owner: &c.remote_owner,
                    to_table: &c.remote_table,
                    label: &c.remote_name,
                })
        })
    }

    /// Edge targets outside the table list, first occurrence order.
    ///
    /// The owner filter keeps foreign keys into owners that were not
    /// fetched, so their targets need a node of their own.
    pub fn missing_targets(&self) -> Vec<TableKey> {
        let present: AHashSet<(&str, &str)> = self
            .tables
            .iter()
            .map(|t| (t.owner.as_str(), t.name.as_str()))
            .collect();
        let mut seen = AHashSet::new();

        self.edges()
            .filter(|e| !present.contains(&(e.to_owner, e.to_table)))
            .filter(|e| seen.insert((e.to_owner, e.to_table)))
            .map(|e| TableKey::new(e.to_owner, e.to_table))
            .collect()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
