mod graph;
mod snapshot;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schema-graph")]
#[command(version)]
#[command(
    about = "Draw table relationship graphs from database catalog metadata",
    long_about = None
)]
pub struct Cli {
    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the relationship graph of one or more schemas
    Graph {
        /// Owners (schemas) to include, case-insensitive (default: all)
        owners: Vec<String>,

        /// Database to read catalog metadata from
        #[arg(short, long, env = "SCHEMA_GRAPH_DB")]
        connect: Option<PathBuf>,

        /// Snapshot file: written after fetching when --connect is given, read otherwise
        #[arg(long)]
        json: Option<PathBuf>,

        /// Output file name; its extension is replaced per format (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output formats: dot, gml, graphml (default: dot on stdout, all three for files)
        #[arg(short, long, value_delimiter = ',')]
        format: Vec<String>,

        /// Run Graphviz over the written .dot file
        #[arg(long)]
        render: bool,

        /// Graphviz output format (dot -T)
        #[arg(short = 'T', long, default_value = "svg")]
        render_format: String,

        /// Graphviz layout engine (dot -K)
        #[arg(short = 'K', long, default_value = "osage")]
        engine: String,
    },

    /// Fetch catalog metadata and save it as a snapshot without rendering
    Snapshot {
        /// Owners (schemas) to include, case-insensitive (default: all)
        owners: Vec<String>,

        /// Database to read catalog metadata from
        #[arg(short, long, env = "SCHEMA_GRAPH_DB")]
        connect: PathBuf,

        /// Snapshot file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Graph {
            owners,
            connect,
            json,
            output,
            format,
            render,
            render_format,
            engine,
        } => graph::run(
            owners,
            connect,
            json,
            output,
            format,
            render,
            render_format,
            engine,
        ),
        Commands::Snapshot {
            owners,
            connect,
            output,
        } => snapshot::run(owners, connect, output),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "schema-graph",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
