//! Graph command implementation.

use schema_graph::graph::{render, write_files, GraphView, OutputFormat};
use schema_graph::schema::{build_graph, Table};
use schema_graph::snapshot;
use schema_graph::source::{fetch, DuckDbSource, OwnerFilter};
use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

/// Run the graph command
#[allow(clippy::too_many_arguments)]
pub fn run(
    owners: Vec<String>,
    connect: Option<PathBuf>,
    json: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Vec<String>,
    render_graph: bool,
    render_format: String,
    engine: String,
) -> Result<()> {
    let mut formats: Vec<OutputFormat> = Vec::new();
    for f in &format {
        let parsed: OutputFormat = f.parse().map_err(|e| anyhow::anyhow!("{}", e))?;
        if !formats.contains(&parsed) {
            formats.push(parsed);
        }
    }

    let owners = OwnerFilter::new(&owners);
    let tables = load_tables(connect.as_deref(), json.as_deref(), &owners)?;
    let view = GraphView::new(&tables);

    let output = output.filter(|p| p.as_os_str() != "-");
    match output {
        None => {
            if render_graph {
                bail!("--render needs an output file name");
            }
            let format = formats.first().copied().unwrap_or_default();
            let stdout = io::stdout();
            let mut out = stdout.lock();
            render(format, &mut out, &view).context("Failed to write to stdout")?;
            out.flush()?;
        }
        Some(out_path) => {
            if formats.is_empty() {
                formats.extend(OutputFormat::ALL);
            }
            let stem = out_path.with_extension("");
            write_files(&view, &stem, &formats)?;

            if render_graph {
                if !formats.contains(&OutputFormat::Dot) {
                    bail!("--render needs the dot format");
                }
                render_with_graphviz(
                    &OutputFormat::Dot.path_for(&stem),
                    &stem,
                    &render_format,
                    &engine,
                )?;
            }
        }
    }

    eprintln!(
        "\nGraph: {} tables, {} columns, {} relationships",
        view.table_count(),
        view.column_count(),
        view.edge_count()
    );

    Ok(())
}

/// Fetch or load catalog metadata and build the ranked table list.
///
/// With a connection the snapshot (if named) is written after fetching;
/// without one it is read instead.
pub(crate) fn load_tables(
    connect: Option<&Path>,
    snapshot_path: Option<&Path>,
    owners: &OwnerFilter,
) -> Result<Vec<Table>> {
    let (tables, constraints) = match (connect, snapshot_path) {
        (Some(db), snapshot_path) => {
            info!(database = %db.display(), "reading catalog");
            let (tables, constraints) = fetch(DuckDbSource::open(db)?, owners)?;
            if let Some(path) = snapshot_path {
                snapshot::save(path, &tables, &constraints)?;
            }
            (tables, constraints)
        }
        (None, Some(path)) => snapshot::load(path)?,
        (None, None) => bail!("no metadata source: pass --connect or --json"),
    };

    Ok(build_graph(tables, &constraints))
}

/// Render the DOT file to `<stem>.<format>` using Graphviz
fn render_with_graphviz(dot_path: &Path, stem: &Path, format: &str, engine: &str) -> Result<()> {
    let mut output_path = stem.as_os_str().to_owned();
    output_path.push(".");
    output_path.push(format);
    let output_path = PathBuf::from(output_path);

    let mut cmd = Command::new("dot");
    cmd.arg(format!("-T{}", format))
        .arg(format!("-K{}", engine))
        .arg("-o")
        .arg(&output_path)
        .arg(dot_path);
    info!(command = ?cmd, "running graphviz");

    let status = cmd.status().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Graphviz 'dot' command not found. Install Graphviz or drop --render."
            )
        } else {
            anyhow::anyhow!("Failed to run dot: {}", e)
        }
    })?;

    if !status.success() {
        bail!("Graphviz dot command failed with status: {}", status);
    }

    eprintln!("Rendered to: {}", output_path.display());
    Ok(())
}
