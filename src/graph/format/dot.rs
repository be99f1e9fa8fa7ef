//! Graphviz DOT format output with HTML-like table labels.

use super::{escape_html, wrap, COLUMN_COMMENT_WIDTH, TABLE_COMMENT_WIDTH};
use crate::graph::view::{node_id, GraphView};
use crate::schema::Table;
use std::io::{self, BufWriter, Write};

/// Write a DOT digraph, one cluster per run of tables sharing a group key
pub fn write_dot<W: Write>(out: W, view: &GraphView<'_>) -> io::Result<()> {
    let mut w = BufWriter::new(out);

    w.write_all(b"digraph {\n")?;

    for cluster in view.clusters() {
        writeln!(
            w,
            "subgraph {} {{",
            escape_dot_id(&format!("cluster_{}", cluster.key))
        )?;
        for table in cluster.tables {
            write_node(&mut w, table)?;
        }
        w.write_all(b"}\n")?;
    }

    for edge in view.edges() {
        let port = escape_dot_id(edge.port);
        writeln!(
            w,
            "  {}:{} -> {}:{} [label={}];",
            escape_dot_id(&edge.from_id()),
            port,
            escape_dot_id(&edge.to_id()),
            port,
            quote(edge.label)
        )?;
    }

    w.write_all(b"\n}\n")?;
    w.flush()
}

fn write_node<W: Write>(w: &mut W, table: &Table) -> io::Result<()> {
    writeln!(
        w,
        "  {} [pencolor=white shape=box label=<<TABLE ALIGN=\"LEFT\"><TR><TD ALIGN=\"CENTER\" COLSPAN=\"3\"><B>{}.{}</B></TD></TR> <TR><TD COLSPAN=\"3\">{}</TD></TR>",
        escape_dot_id(&node_id(&table.owner, &table.name)),
        escape_html(&table.owner),
        escape_html(&table.name),
        html_lines(&table.comment, TABLE_COMMENT_WIDTH)
    )?;

    for col in &table.columns {
        let attrs = if col.unique { " BGCOLOR=\"YELLOW\"" } else { "" };
        writeln!(
            w,
            "<TR><TD PORT=\"{}\" ALIGN=\"LEFT\"{}>{}</TD><TD ALIGN=\"LEFT\">{}</TD><TD ALIGN=\"RIGHT\">{}</TD></TR>",
            escape_html(&col.name),
            attrs,
            escape_html(&col.name),
            escape_html(&col.col_type),
            html_lines(&col.comment, COLUMN_COMMENT_WIDTH)
        )?;
    }

    w.write_all(b"</TABLE>>];\n")
}

/// Wrapped, escaped text with `<BR/>` line breaks
fn html_lines(text: &str, width: usize) -> String {
    escape_html(&wrap(text, width)).replace('\n', "<BR/>\n")
}

const KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

/// Escape a string for use as a DOT node ID or port.
///
/// Bare ids may not start with a digit or be a keyword in any case.
fn escape_dot_id(s: &str) -> String {
    let bare = s.chars().next().is_some_and(|c| !c.is_ascii_digit())
        && s.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(s));

    if bare {
        s.to_string()
    } else {
        quote(s)
    }
}

/// Quote a DOT string
fn quote(s: &str) -> String {
    format!(
        "\"{}\"",
        s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, TableConstraint};

    fn render(tables: &[Table]) -> String {
        let mut buf = Vec::new();
        write_dot(&mut buf, &GraphView::new(tables)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn employees() -> Table {
        Table {
            owner: "HR".to_string(),
            name: "EMPLOYEES".to_string(),
            comment: "Staff <and> contractors & interns\nsee HR manual for the details of employment".to_string(),
            columns: vec![
                Column {
                    name: "ID".to_string(),
                    col_type: "NUMBER(10) NOT NULL".to_string(),
                    comment: String::new(),
                    unique: true,
                },
                Column {
                    name: "MGR_ID".to_string(),
                    col_type: "NUMBER(10)".to_string(),
                    comment: "direct manager of this employee".to_string(),
                    unique: false,
                },
            ],
            constraints: vec![TableConstraint {
                columns: vec!["MGR_ID".to_string()],
                remote_owner: "HR".to_string(),
                remote_table: "EMPLOYEES".to_string(),
                remote_name: "EMP_PK".to_string(),
            }],
        }
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(render(&[]), "digraph {\n\n}\n");
    }

    #[test]
    fn test_self_reference() {
        let output = render(&[employees()]);

        assert_eq!(output.matches("[pencolor=white").count(), 1);
        assert_eq!(output.matches(" -> ").count(), 1);
        assert!(output.contains("  HR__EMPLOYEES:MGR_ID -> HR__EMPLOYEES:MGR_ID [label=\"EMP_PK\"];"));
    }

    #[test]
    fn test_cluster_wraps_nodes() {
        let output = render(&[employees()]);
        assert!(output.starts_with("digraph {\nsubgraph cluster_EMPLOYEES {\n  HR__EMPLOYEES ["));
        assert!(output.contains("</TABLE>>];\n}\n"));
    }

    #[test]
    fn test_unique_columns_highlighted() {
        let output = render(&[employees()]);
        assert!(output.contains("<TD PORT=\"ID\" ALIGN=\"LEFT\" BGCOLOR=\"YELLOW\">ID</TD>"));
        assert!(output.contains("<TD PORT=\"MGR_ID\" ALIGN=\"LEFT\">MGR_ID</TD>"));
    }

    #[test]
    fn test_comments_escaped_and_wrapped() {
        let output = render(&[employees()]);

        assert!(output.contains("Staff &lt;and&gt; contractors &amp; interns<BR/>"));
        assert!(!output.contains("<and>"));
        assert!(!output.contains("& interns"));
        assert!(output.contains("direct manager of this<BR/>\nemployee"));
    }

    #[test]
    fn test_edges_without_remote_table_skipped() {
        let mut table = employees();
        table.constraints[0].remote_table.clear();
        let output = render(&[table]);
        assert!(!output.contains(" -> "));
    }

    #[test]
    fn test_escape_dot_id() {
        assert_eq!(escape_dot_id("HR__EMP"), "HR__EMP");
        assert_eq!(escape_dot_id("HR__EMP#1"), "\"HR__EMP#1\"");
        assert_eq!(escape_dot_id(""), "\"\"");
        assert_eq!(escape_dot_id("2024__ORDERS"), "\"2024__ORDERS\"");
        assert_eq!(escape_dot_id("ORDERS_2024"), "ORDERS_2024");
        assert_eq!(escape_dot_id("Node"), "\"Node\"");
        assert_eq!(escape_dot_id("NODES"), "NODES");
    }

    #[test]
    fn test_leading_digit_ids_quoted() {
        let mut table = employees();
        table.owner = "2024".to_string();
        table.columns[1].name = "1ST_MGR".to_string();
        table.constraints[0].columns[0] = "1ST_MGR".to_string();
        table.constraints[0].remote_owner = "2024".to_string();
        let output = render(&[table]);

        assert!(output.contains("  \"2024__EMPLOYEES\" [pencolor=white"));
        assert!(output.contains(
            "  \"2024__EMPLOYEES\":\"1ST_MGR\" -> \"2024__EMPLOYEES\":\"1ST_MGR\" [label=\"EMP_PK\"];"
        ));
        assert!(!output.contains("\n  2024__"));
    }
}
