pub mod graph;
pub mod schema;
pub mod snapshot;
pub mod source;
