//! Output format implementations for relationship graphs.

mod dot;
mod gml;
mod graphml;

pub use dot::write_dot;
pub use gml::write_gml;
pub use graphml::write_graphml;

use crate::graph::view::GraphView;
use anyhow::{anyhow, Context, Result};
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;
use tracing::info;

/// Wrap width for table comments
pub const TABLE_COMMENT_WIDTH: usize = 40;
/// Wrap width for column comments
pub const COLUMN_COMMENT_WIDTH: usize = 25;

/// Output format for relationship graphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Graphviz DOT with HTML-like table labels
    #[default]
    Dot,
    /// Graph Modelling Language
    Gml,
    /// GraphML XML
    GraphMl,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" | "gv" | "graphviz" => Ok(OutputFormat::Dot),
            "gml" => Ok(OutputFormat::Gml),
            "graphml" | "xml" => Ok(OutputFormat::GraphMl),
            _ => Err(format!(
                "Unknown format: {}. Valid options: dot, gml, graphml",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Dot, OutputFormat::Gml, OutputFormat::GraphMl];

    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Dot => "dot",
            OutputFormat::Gml => "gml",
            OutputFormat::GraphMl => "graphml",
        }
    }

    /// `<stem>.<extension>`, keeping any dots already in the stem
    pub fn path_for(&self, stem: &Path) -> PathBuf {
        let mut path = OsString::from(stem.as_os_str());
        path.push(".");
        path.push(self.extension());
        PathBuf::from(path)
    }
}

/// Render one complete document in `format`.
pub fn render<W: Write>(format: OutputFormat, out: W, view: &GraphView<'_>) -> io::Result<()> {
    match format {
        OutputFormat::Dot => write_dot(out, view),
        OutputFormat::Gml => write_gml(out, view),
        OutputFormat::GraphMl => write_graphml(out, view),
    }
}

/// Render one document into a string
pub fn render_to_string(format: OutputFormat, view: &GraphView<'_>) -> io::Result<String> {
    let mut buf = Vec::new();
    render(format, &mut buf, view)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Render every format to `<stem>.<ext>` concurrently.
///
/// Each format gets its own task and file. All tasks run to completion;
/// the first failure in `formats` order is returned and files already
/// written by other tasks are left in place.
pub fn write_files(
    view: &GraphView<'_>,
    stem: &Path,
    formats: &[OutputFormat],
) -> Result<Vec<PathBuf>> {
    thread::scope(|s| {
        let tasks: Vec<_> = formats
            .iter()
            .map(|&format| {
                let path = format.path_for(stem);
                let task = s.spawn(move || write_file(view, format, &path).map(|()| path));
                (format, task)
            })
            .collect();

        let results: Vec<Result<PathBuf>> = tasks
            .into_iter()
            .map(|(format, task)| {
                task.join()
                    .map_err(|_| anyhow!("{} renderer panicked", format))?
            })
            .collect();

        results.into_iter().collect()
    })
}

fn write_file(view: &GraphView<'_>, format: OutputFormat, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    render(format, file, view).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(format = %format, path = %path.display(), "graph written");
    Ok(())
}

/// Break text at whitespace so no line exceeds `width` characters.
///
/// Existing line breaks are kept and words longer than `width` stay whole
/// on a line of their own.
pub fn wrap(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let mut len = 0;
        for word in line.split_whitespace() {
            let word_len = word.chars().count();
            if len > 0 && len + 1 + word_len > width {
                out.push('\n');
                len = 0;
            } else if len > 0 {
                out.push(' ');
                len += 1;
            }
            out.push_str(word);
            len += word_len;
        }
    }

    out
}

/// Escape a string for HTML-like labels and XML text or attributes
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
