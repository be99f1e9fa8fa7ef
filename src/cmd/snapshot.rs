//! Snapshot command implementation.

use schema_graph::snapshot;
use schema_graph::source::{fetch, DuckDbSource, OwnerFilter};
use anyhow::Result;
use std::path::PathBuf;

/// Fetch catalog metadata and save it without rendering
pub fn run(owners: Vec<String>, connect: PathBuf, output: PathBuf) -> Result<()> {
    let owners = OwnerFilter::new(&owners);
    let (tables, constraints) = fetch(DuckDbSource::open(&connect)?, &owners)?;
    snapshot::save(&output, &tables, &constraints)?;

    let constraint_count: usize = constraints.values().map(Vec::len).sum();
    eprintln!(
        "Snapshot: {} tables, {} constraints written to {}",
        tables.len(),
        constraint_count,
        output.display()
    );
    Ok(())
}
