//! JSON snapshot of fetched catalog metadata.
//!
//! A snapshot is two consecutive JSON values: the constraint map keyed by
//! `"OWNER.TABLE"`, then the table list as fetched (before assembly). It
//! lets a graph be redrawn without a database connection.

use crate::schema::{group_by_table, Constraint, ConstraintMap, Table};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

/// Write both record sets to `writer`, one JSON value per line.
pub fn write_snapshot<W: Write>(
    mut writer: W,
    tables: &[Table],
    constraints: &ConstraintMap,
) -> Result<()> {
    let mut keyed: BTreeMap<String, Vec<&Constraint>> = BTreeMap::new();
    for (key, list) in constraints {
        keyed.entry(key.to_string()).or_default().extend(list);
    }

    serde_json::to_writer(&mut writer, &keyed).context("Failed to encode constraints")?;
    writer.write_all(b"\n")?;
    serde_json::to_writer(&mut writer, tables).context("Failed to encode tables")?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read both record sets back from `reader`.
///
/// Constraints are regrouped by the owner and table they carry, not by the
/// string key they were stored under.
pub fn read_snapshot<R: Read>(reader: R) -> Result<(Vec<Table>, ConstraintMap)> {
    let mut de = serde_json::Deserializer::from_reader(reader);

    let keyed = BTreeMap::<String, Vec<Constraint>>::deserialize(&mut de)
        .context("Failed to decode constraint record")?;
    let tables = Vec::<Table>::deserialize(&mut de).context("Failed to decode table record")?;
    de.end().context("Unexpected data after table record")?;

    Ok((tables, group_by_table(keyed.into_values().flatten())))
}

/// Save a snapshot file
pub fn save(path: &Path, tables: &[Table], constraints: &ConstraintMap) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create snapshot: {}", path.display()))?;
    write_snapshot(BufWriter::new(file), tables, constraints)
        .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
    info!(path = %path.display(), tables = tables.len(), "snapshot written");
    Ok(())
}

/// Load a snapshot file
pub fn load(path: &Path) -> Result<(Vec<Table>, ConstraintMap)> {
    let file =
        File::open(path).with_context(|| format!("Failed to open snapshot: {}", path.display()))?;
    let snapshot = read_snapshot(BufReader::new(file))
        .with_context(|| format!("Malformed snapshot: {}", path.display()))?;
    info!(path = %path.display(), tables = snapshot.0.len(), "snapshot loaded");
    Ok(snapshot)
}
