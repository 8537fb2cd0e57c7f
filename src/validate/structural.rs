//! Graph-level structural validation rules (V001–V009) and the pipeline shape
//! check run by the pipeline converter (C007).

use std::collections::HashSet;

use petgraph::algo::is_cyclic_directed;
use petgraph::visit::Bfs;

use super::Validator;
use crate::config::Settings;
use crate::error::ConvertError;
use crate::model::{NodeType, Pipeline, PipelineGraph};

/// Run all structural validation rules. Returns all errors found.
pub fn validate_structural(
    pipeline: &Pipeline,
    graph: &PipelineGraph,
    settings: &Settings,
) -> Vec<ConvertError> {
    let mut errors = Vec::new();

    v001_exactly_one_start(pipeline, &mut errors);
    v002_exactly_one_end(pipeline, &mut errors);
    v003_no_duplicate_ids(pipeline, &mut errors);
    v004_next_references_existing_nodes(graph, &mut errors);
    if !settings.structure.allow_cycles {
        v005_no_cycles(graph, &mut errors);
    }
    v006_all_reachable_from_start(pipeline, graph, &mut errors);
    v007_start_has_successor(pipeline, &mut errors);
    v008_single_successor_outside_gateways(pipeline, &mut errors);
    v009_converge_reference_is_converge(pipeline, &mut errors);

    errors
}

fn count_error(code: &str, kind: &str, count: usize) -> ConvertError {
    ConvertError::validate(
        code,
        format!("Pipeline must have exactly 1 {}, found {}", kind, count),
        None,
    )
}

fn v001_exactly_one_start(pipeline: &Pipeline, errors: &mut Vec<ConvertError>) {
    let count = pipeline.nodes_of_type(NodeType::StartEvent).count();
    if count != 1 {
        errors.push(count_error("V001", "start event", count));
    }
}

fn v002_exactly_one_end(pipeline: &Pipeline, errors: &mut Vec<ConvertError>) {
    let count = pipeline.nodes_of_type(NodeType::EndEvent).count();
    if count != 1 {
        errors.push(count_error("V002", "end event", count));
    }
}

fn v003_no_duplicate_ids(pipeline: &Pipeline, errors: &mut Vec<ConvertError>) {
    let mut seen = HashSet::new();
    for node in &pipeline.nodes {
        if !seen.insert(node.id()) {
            errors.push(ConvertError::validate(
                "V003",
                format!("Duplicate node id '{}'", node.id()),
                Some(node.id().to_string()),
            ));
        }
    }
}

fn v004_next_references_existing_nodes(graph: &PipelineGraph, errors: &mut Vec<ConvertError>) {
    for (source, target) in &graph.dangling {
        errors.push(ConvertError::validate(
            "V004",
            format!("Node '{}' references unknown next node '{}'", source, target),
            Some(source.clone()),
        ));
    }
}

fn v005_no_cycles(graph: &PipelineGraph, errors: &mut Vec<ConvertError>) {
    if is_cyclic_directed(&graph.graph) {
        errors.push(ConvertError::validate(
            "V005",
            "Pipeline graph contains a cycle",
            None,
        ));
    }
}

fn v006_all_reachable_from_start(
    pipeline: &Pipeline,
    graph: &PipelineGraph,
    errors: &mut Vec<ConvertError>,
) {
    let Some(start) = pipeline.nodes_of_type(NodeType::StartEvent).next() else {
        return;
    };
    let Some(&start_idx) = graph.node_indices.get(start.id()) else {
        return;
    };

    let mut reachable = HashSet::new();
    let mut bfs = Bfs::new(&graph.graph, start_idx);
    while let Some(nx) = bfs.next(&graph.graph) {
        reachable.insert(nx);
    }

    let mut reported = HashSet::new();
    for node in &pipeline.nodes {
        let Some(&idx) = graph.node_indices.get(node.id()) else {
            continue;
        };
        if !reachable.contains(&idx) && reported.insert(idx) {
            errors.push(ConvertError::validate(
                "V006",
                format!("Node '{}' is not reachable from the start event", node.id()),
                Some(node.id().to_string()),
            ));
        }
    }
}

fn v007_start_has_successor(pipeline: &Pipeline, errors: &mut Vec<ConvertError>) {
    for node in pipeline.nodes_of_type(NodeType::StartEvent) {
        if node.successors().is_empty() {
            errors.push(ConvertError::validate(
                "V007",
                format!("Start event '{}' has no next node", node.id()),
                Some(node.id().to_string()),
            ));
        }
    }
}

fn v008_single_successor_outside_gateways(pipeline: &Pipeline, errors: &mut Vec<ConvertError>) {
    for node in &pipeline.nodes {
        if node.is_gateway() {
            continue;
        }
        let count = node.successors().len();
        if count > 1 {
            errors.push(ConvertError::validate(
                "V008",
                format!(
                    "Node '{}' of type '{}' may have at most 1 next node, found {}",
                    node.id(),
                    node.node_type(),
                    count
                ),
                Some(node.id().to_string()),
            ));
        }
    }
}

fn v009_converge_reference_is_converge(pipeline: &Pipeline, errors: &mut Vec<ConvertError>) {
    for node in &pipeline.nodes {
        let Some(converge_id) = node.converge_gateway_id() else {
            continue;
        };
        let target = pipeline.node(converge_id);
        if target.map(|t| t.node_type()) != Some(NodeType::ConvergeGateway) {
            errors.push(ConvertError::validate(
                "V009",
                format!(
                    "Gateway '{}' names '{}' as its converge gateway, which is not a converge gateway",
                    node.id(),
                    converge_id
                ),
                Some(node.id().to_string()),
            ));
        }
    }
}

// =============================================================================
// PIPELINE SHAPE
// =============================================================================

/// The minimum shape the pipeline converter needs: one start, one end, unique ids.
pub struct PipelineShapeValidator;

impl Validator<Pipeline> for PipelineShapeValidator {
    fn validate(&self, data: &Pipeline) -> Result<(), ConvertError> {
        let starts = data.nodes_of_type(NodeType::StartEvent).count();
        if starts != 1 {
            return Err(ConvertError::validate(
                "C007",
                format!("Pipeline must have exactly 1 start event, found {}", starts),
                None,
            ));
        }
        let ends = data.nodes_of_type(NodeType::EndEvent).count();
        if ends != 1 {
            return Err(ConvertError::validate(
                "C007",
                format!("Pipeline must have exactly 1 end event, found {}", ends),
                None,
            ));
        }
        let mut seen = HashSet::new();
        for node in &data.nodes {
            if !seen.insert(node.id()) {
                return Err(ConvertError::validate(
                    "C007",
                    format!("Duplicate node id '{}'", node.id()),
                    Some(node.id().to_string()),
                ));
            }
        }
        Ok(())
    }
}
