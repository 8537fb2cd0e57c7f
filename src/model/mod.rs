//! Data model: typed pipeline representation + graph construction.

pub mod graph;
pub mod types;

pub use graph::PipelineGraph;
pub use types::*;
