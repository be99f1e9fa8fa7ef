//! Relationship graph rendering.
//!
//! This module provides:
//! - A read-only view over the ranked tables with clusters and foreign key edges
//! - Output formats: DOT (Graphviz), GML and GraphML
//! - Concurrent rendering of several formats to sibling files

pub mod format;
pub mod view;

pub use format::{render, render_to_string, write_files, OutputFormat};
pub use view::{node_id, normalize, Cluster, EdgeInfo, GraphView, ID_SEPARATOR};
