//! petgraph-based directed graph over a pipeline's `next` references.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use super::types::Pipeline;

pub struct PipelineGraph {
    pub graph: DiGraph<String, ()>,
    pub node_indices: HashMap<String, NodeIndex>,
    /// `(source, target)` pairs whose target id is not a node of the pipeline.
    pub dangling: Vec<(String, String)>,
}

impl PipelineGraph {
    pub fn build(pipeline: &Pipeline) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut dangling = Vec::new();

        for node in &pipeline.nodes {
            let id = node.id().to_string();
            // First declaration wins on duplicate ids; the structural rules report them.
            if !node_indices.contains_key(&id) {
                let idx = graph.add_node(id.clone());
                node_indices.insert(id, idx);
            }
        }

        for node in &pipeline.nodes {
            let source = node_indices[node.id()];
            for target in node.successors() {
                match node_indices.get(target) {
                    Some(&t) => {
                        graph.add_edge(source, t, ());
                    }
                    None => dangling.push((node.id().to_string(), target.to_string())),
                }
            }
        }

        PipelineGraph {
            graph,
            node_indices,
            dangling,
        }
    }

    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        self.neighbors(node_id, petgraph::Direction::Outgoing)
    }

    pub fn predecessors(&self, node_id: &str) -> Vec<&str> {
        self.neighbors(node_id, petgraph::Direction::Incoming)
    }

    pub fn incoming_count(&self, node_id: &str) -> usize {
        self.predecessors(node_id).len()
    }

    pub fn outgoing_count(&self, node_id: &str) -> usize {
        self.successors(node_id).len()
    }

    fn neighbors(&self, node_id: &str, direction: petgraph::Direction) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return vec![];
        };
        self.graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].as_str())
            .collect()
    }
}
