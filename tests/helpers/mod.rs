#![allow(dead_code)]

use bkflow_converter::convert::{ConvertContext, convert_with, json};
use bkflow_converter::decision_table::{CompiledTable, DecisionTableParser};
use bkflow_converter::model::Pipeline;
use bkflow_converter::tree::{EndpointSide, WebPipelineTree};
use serde_json::{Map, Value};

// =============================================================================
// Pipeline fixtures
// =============================================================================

pub fn linear_json() -> Value {
    parse(include_str!("../fixtures/linear_pipeline.json"))
}

pub fn exclusive_json() -> Value {
    parse(include_str!("../fixtures/exclusive_pipeline.json"))
}

pub fn conditional_parallel_json() -> Value {
    parse(include_str!("../fixtures/conditional_parallel_pipeline.json"))
}

fn parse(text: &str) -> Value {
    serde_json::from_str(text).expect("fixture is valid JSON")
}

/// JSON → data model with deterministic ids.
pub fn pipeline(source: &Value) -> Pipeline {
    convert_with::<json::PipelineConverter>(source, &ConvertContext::deterministic())
        .expect("fixture converts to a data model")
}

/// JSON → web pipeline tree with deterministic ids.
pub fn tree(source: &Value) -> WebPipelineTree {
    bkflow_converter::json_to_pipeline_tree(source, &ConvertContext::deterministic())
        .expect("fixture converts to a pipeline tree")
}

/// Every node id of the tree: start, end, activities, then gateways.
pub fn node_ids(tree: &WebPipelineTree) -> Vec<String> {
    let mut ids = vec![tree.start_event.id.clone(), tree.end_event.id.clone()];
    ids.extend(tree.activities.keys().cloned());
    ids.extend(tree.gateways.keys().cloned());
    ids
}

pub fn incoming(tree: &WebPipelineTree, node_id: &str) -> Vec<String> {
    endpoint_ids(tree, node_id, EndpointSide::Incoming)
}

pub fn outgoing(tree: &WebPipelineTree, node_id: &str) -> Vec<String> {
    endpoint_ids(tree, node_id, EndpointSide::Outgoing)
}

fn endpoint_ids(tree: &WebPipelineTree, node_id: &str, side: EndpointSide) -> Vec<String> {
    tree.endpoints(node_id, side)
        .expect("node exists in tree")
        .ids()
        .into_iter()
        .map(String::from)
        .collect()
}

// =============================================================================
// Decision tables
// =============================================================================

pub fn simple_table() -> Value {
    parse(include_str!("../fixtures/simple_table.json"))
}

pub fn or_and_condition_table() -> Value {
    parse(include_str!("../fixtures/or_and_condition_table.json"))
}

pub fn expression_table() -> Value {
    parse(include_str!("../fixtures/expression_table.json"))
}

pub fn all_types_table() -> Value {
    parse(include_str!("../fixtures/all_types_table.json"))
}

pub fn compile(title: &str, table: Value) -> CompiledTable {
    DecisionTableParser::new(title, table, "Unique", true)
        .expect("table passes schema validation")
        .parse()
        .expect("table compiles")
}

pub fn facts(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("facts are an object")
}
