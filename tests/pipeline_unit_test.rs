//! End-to-end tests of the library pipeline: catalog rows in, documents out.

use schema_graph::graph::{render_to_string, GraphView, OutputFormat};
use schema_graph::schema::{
    build_graph, merge_columns, merge_constraints, ColumnRow, ConstraintRow, ConstraintType, Table,
};

fn column(table: &str, column: &str, col_type: &str) -> anyhow::Result<ColumnRow> {
    Ok(ColumnRow {
        owner: "SHOP".to_string(),
        table: table.to_string(),
        column: column.to_string(),
        col_type: col_type.to_string(),
        table_comment: String::new(),
        column_comment: String::new(),
    })
}

fn constraint(
    name: &str,
    constraint_type: ConstraintType,
    table: &str,
    column: &str,
    remote: Option<(&str, &str)>,
) -> anyhow::Result<ConstraintRow> {
    let (remote_table, remote_name) = remote.unwrap_or_default();
    Ok(ConstraintRow {
        owner: "SHOP".to_string(),
        name: name.to_string(),
        constraint_type,
        table: table.to_string(),
        column: column.to_string(),
        remote_owner: if remote.is_some() { "SHOP" } else { "" }.to_string(),
        remote_table: remote_table.to_string(),
        remote_name: remote_name.to_string(),
    })
}

fn shop_tables() -> Vec<Table> {
    let tables = merge_columns(vec![
        column("T_CUSTOMER", "ID", "NUMBER"),
        column("T_CUSTOMER", "NAME", "VARCHAR2(80)"),
        column("T_ORDER", "ID", "NUMBER"),
        column("T_ORDER", "CUSTOMER_ID", "NUMBER"),
        column("T_ORDER_LINE", "ORDER_ID", "NUMBER"),
        column("T_ORDER_LINE", "LINE_NO", "NUMBER"),
        column("T_ORDER_LINE", "PRODUCT_ID", "NUMBER"),
        column("T_PRODUCT", "ID", "NUMBER"),
    ])
    .unwrap();

    let constraints = merge_constraints(vec![
        constraint("CUST_PK", ConstraintType::Primary, "T_CUSTOMER", "ID", None),
        constraint(
            "LINE_ORDER_FK",
            ConstraintType::Foreign,
            "T_ORDER_LINE",
            "ORDER_ID",
            Some(("T_ORDER", "ORDER_PK")),
        ),
        constraint("LINE_PK", ConstraintType::Primary, "T_ORDER_LINE", "ORDER_ID", None),
        constraint("LINE_PK", ConstraintType::Primary, "T_ORDER_LINE", "LINE_NO", None),
        constraint(
            "LINE_PRODUCT_FK",
            ConstraintType::Foreign,
            "T_ORDER_LINE",
            "PRODUCT_ID",
            Some(("T_PRODUCT", "PRODUCT_PK")),
        ),
        constraint(
            "ORDER_CUST_FK",
            ConstraintType::Foreign,
            "T_ORDER",
            "CUSTOMER_ID",
            Some(("T_CUSTOMER", "CUST_PK")),
        ),
        constraint("ORDER_PK", ConstraintType::Primary, "T_ORDER", "ID", None),
        constraint("PRODUCT_PK", ConstraintType::Primary, "T_PRODUCT", "ID", None),
    ])
    .unwrap();

    build_graph(tables, &constraints)
}

#[test]
fn test_related_tables_cluster_together() {
    let tables = shop_tables();
    let view = GraphView::new(&tables);

    let clusters: Vec<(&str, usize)> = view.clusters().map(|c| (c.key, c.tables.len())).collect();
    assert_eq!(clusters, [("CUSTOMER", 1), ("ORDER", 2), ("PRODUCT", 1)]);

    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["T_CUSTOMER", "T_ORDER", "T_ORDER_LINE", "T_PRODUCT"]);
}

#[test]
fn test_composite_key_marks_every_column() {
    let tables = shop_tables();
    let line = tables.iter().find(|t| t.name == "T_ORDER_LINE").unwrap();

    let unique: Vec<bool> = line.columns.iter().map(|c| c.unique).collect();
    assert_eq!(unique, [true, true, false]);
    assert_eq!(line.constraints.len(), 2);
}

#[test]
fn test_edges_in_every_format() {
    let tables = shop_tables();
    let view = GraphView::new(&tables);
    assert_eq!(view.edge_count(), 3);

    let dot = render_to_string(OutputFormat::Dot, &view).unwrap();
    assert!(dot.contains(
        "SHOP__T_ORDER:CUSTOMER_ID -> SHOP__T_CUSTOMER:CUSTOMER_ID [label=\"CUST_PK\"];"
    ));
    assert_eq!(dot.matches(" -> ").count(), 3);
    assert_eq!(dot.matches("subgraph ").count(), 3);

    let gml = render_to_string(OutputFormat::Gml, &view).unwrap();
    assert_eq!(gml.matches("\tedge [").count(), 3);

    let graphml = render_to_string(OutputFormat::GraphMl, &view).unwrap();
    assert_eq!(graphml.matches("<edge ").count(), 3);
    assert_eq!(graphml.matches("<node id=\"cluster_").count(), 3);
}

#[test]
fn test_output_independent_of_input_order() {
    let tables = shop_tables();
    let mut reversed = tables.clone();
    reversed.reverse();
    schema_graph::schema::rank(&mut reversed);

    for format in OutputFormat::ALL {
        assert_eq!(
            render_to_string(format, &GraphView::new(&tables)).unwrap(),
            render_to_string(format, &GraphView::new(&reversed)).unwrap(),
            "{}",
            format
        );
    }
}

#[test]
fn test_empty_catalog_renders_valid_documents() {
    let tables = build_graph(Vec::new(), &Default::default());
    let view = GraphView::new(&tables);

    assert_eq!(render_to_string(OutputFormat::Dot, &view).unwrap(), "digraph {\n\n}\n");
    assert_eq!(
        render_to_string(OutputFormat::Gml, &view).unwrap(),
        "graph [\n\tdirected 1\n]\n"
    );
    assert!(render_to_string(OutputFormat::GraphMl, &view).unwrap().ends_with("</graphml>\n"));
}
