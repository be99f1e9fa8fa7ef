//! GraphML format output.
//!
//! Mirrors the DOT layout: each run of tables sharing a group key becomes a
//! cluster node holding a nested graph, each table a node with one port per
//! column, and each foreign key an edge between column ports. Runs are
//! numbered because the same key can come back later in the list. Edge
//! targets outside the list get a bare node.

use super::{escape_html, wrap, COLUMN_COMMENT_WIDTH, TABLE_COMMENT_WIDTH};
use crate::graph::view::{node_id, GraphView};
use crate::schema::Table;
use std::io::{self, BufWriter, Write};

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">
  <key id="label" for="all" attr.name="label" attr.type="string"/>
  <key id="comment" for="all" attr.name="comment" attr.type="string"/>
  <key id="type" for="port" attr.name="type" attr.type="string"/>
  <key id="unique" for="port" attr.name="unique" attr.type="boolean">
    <default>false</default>
  </key>
  <graph id="G" edgedefault="directed">
"#;

const FOOTER: &str = "  </graph>\n</graphml>\n";

/// Write a GraphML document
pub fn write_graphml<W: Write>(out: W, view: &GraphView<'_>) -> io::Result<()> {
    let mut w = BufWriter::new(out);

    w.write_all(HEADER.as_bytes())?;

    for (index, cluster) in view.clusters().enumerate() {
        let id = escape_html(&format!("cluster_{}_{}", index, cluster.key));
        writeln!(w, "    <node id=\"{}\">", id)?;
        writeln!(
            w,
            "      <data key=\"label\">{}</data>",
            escape_html(cluster.key)
        )?;
        writeln!(w, "      <graph id=\"{}:\" edgedefault=\"directed\">", id)?;
        for table in cluster.tables {
            write_node(&mut w, table)?;
        }
        w.write_all(b"      </graph>\n    </node>\n")?;
    }

    for key in view.missing_targets() {
        writeln!(
            w,
            "    <node id=\"{}\">",
            escape_html(&node_id(&key.owner, &key.name))
        )?;
        writeln!(
            w,
            "      <data key=\"label\">{}</data>",
            escape_html(&key.to_string())
        )?;
        w.write_all(b"    </node>\n")?;
    }

    for edge in view.edges() {
        let port = escape_html(edge.port);
        writeln!(
            w,
            "    <edge source=\"{}\" target=\"{}\" sourceport=\"{}\" targetport=\"{}\">",
            escape_html(&edge.from_id()),
            escape_html(&edge.to_id()),
            port,
            port
        )?;
        writeln!(
            w,
            "      <data key=\"label\">{}</data>",
            escape_html(edge.label)
        )?;
        w.write_all(b"    </edge>\n")?;
    }

    w.write_all(FOOTER.as_bytes())?;
    w.flush()
}

fn write_node<W: Write>(w: &mut W, table: &Table) -> io::Result<()> {
    writeln!(
        w,
        "        <node id=\"{}\">",
        escape_html(&node_id(&table.owner, &table.name))
    )?;
    writeln!(
        w,
        "          <data key=\"label\">{}.{}</data>",
        escape_html(&table.owner),
        escape_html(&table.name)
    )?;
    if !table.comment.is_empty() {
        writeln!(
            w,
            "          <data key=\"comment\">{}</data>",
            escape_html(&wrap(&table.comment, TABLE_COMMENT_WIDTH))
        )?;
    }

    for col in &table.columns {
        writeln!(w, "          <port name=\"{}\">", escape_html(&col.name))?;
        writeln!(
            w,
            "            <data key=\"type\">{}</data>",
            escape_html(&col.col_type)
        )?;
        if !col.comment.is_empty() {
            writeln!(
                w,
                "            <data key=\"comment\">{}</data>",
                escape_html(&wrap(&col.comment, COLUMN_COMMENT_WIDTH))
            )?;
        }
        if col.unique {
            w.write_all(b"            <data key=\"unique\">true</data>\n")?;
        }
        w.write_all(b"          </port>\n")?;
    }

    w.write_all(b"        </node>\n")
}
