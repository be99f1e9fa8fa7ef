//! GML (Graph Modelling Language) format output.
//!
//! Nodes carry the table id, a label and the wrapped table comment; edges
//! carry their port column and the referenced key name. There are no
//! clusters in this format. Edge targets outside the table list get a node
//! with an empty comment.

use super::{escape_html, wrap, TABLE_COMMENT_WIDTH};
use crate::graph::view::{node_id, GraphView};
use std::io::{self, BufWriter, Write};

/// Write a GML graph
pub fn write_gml<W: Write>(out: W, view: &GraphView<'_>) -> io::Result<()> {
    let mut w = BufWriter::new(out);

    w.write_all(b"graph [\n\tdirected 1\n")?;

    for table in view.tables {
        writeln!(
            w,
            "\tnode [\n\t\tid {}\n\t\tlabel {}\n\t\tcomment {}\n\t]",
            gml_string(&node_id(&table.owner, &table.name)),
            gml_string(&format!("{}.{}", table.owner, table.name)),
            gml_string(&wrap(&table.comment, TABLE_COMMENT_WIDTH))
        )?;
    }

    for key in view.missing_targets() {
        writeln!(
            w,
            "\tnode [\n\t\tid {}\n\t\tlabel {}\n\t\tcomment \"\"\n\t]",
            gml_string(&node_id(&key.owner, &key.name)),
            gml_string(&key.to_string())
        )?;
    }

    for edge in view.edges() {
        writeln!(
            w,
            "\tedge [\n\t\tsource {}\n\t\ttarget {}\n\t\tsourcePort {}\n\t\ttargetPort {}\n\t\tlabel {}\n\t]",
            gml_string(&edge.from_id()),
            gml_string(&edge.to_id()),
            gml_string(edge.port),
            gml_string(edge.port),
            gml_string(edge.label)
        )?;
    }

    w.write_all(b"]\n")?;
    w.flush()
}

/// GML strings may not contain `"`; markup characters use HTML entities
fn gml_string(s: &str) -> String {
    format!("\"{}\"", escape_html(s))
}
