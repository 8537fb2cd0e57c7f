//! Integration tests for the JSON → data model phase.

mod helpers;

use bkflow_converter::convert::{ConvertContext, convert_with, json};
use bkflow_converter::error::Phase;
use bkflow_converter::model::{Constant, ConstantType, Next, Node, NodeType, PipelineGraph};
use serde_json::json;

#[test]
fn parse_linear_pipeline() {
    let pipeline = helpers::pipeline(&helpers::linear_json());
    assert_eq!(pipeline.id, "linear");
    assert_eq!(pipeline.nodes.len(), 3);
    assert_eq!(pipeline.constants.len(), 3);

    let types: Vec<ConstantType> = pipeline.constants.iter().map(Constant::constant_type).collect();
    assert_eq!(
        types,
        vec![
            ConstantType::Custom,
            ConstantType::ComponentInputs,
            ConstantType::ComponentOutputs
        ]
    );
}

#[test]
fn component_node_defaults_survive_parsing() {
    let pipeline = helpers::pipeline(&helpers::linear_json());
    let Some(Node::Component(node)) = pipeline.node("fetch") else {
        panic!("fetch should be a component node");
    };
    assert!(node.skippable);
    assert!(node.retryable);
    assert!(!node.error_ignorable);
    assert!(!node.auto_retry.enable);
    assert_eq!(node.auto_retry.times, 1);
    assert_eq!(node.timeout_config.seconds, 10);
    assert_eq!(node.timeout_config.action, "forced_fail");
    assert_eq!(node.component.data.len(), 2);
    assert!(node.component.data[0].need_render);
}

#[test]
fn explicit_options_override_defaults() {
    let pipeline = helpers::pipeline(&helpers::conditional_parallel_json());
    let Some(Node::Component(node)) = pipeline.node("archive") else {
        panic!("archive should be a component node");
    };
    assert!(!node.skippable);
    assert!(node.auto_retry.enable);
    assert_eq!(node.auto_retry.interval, 30);
    assert_eq!(node.auto_retry.times, 3);
}

#[test]
fn gateway_default_and_legacy_next_key() {
    let exclusive = helpers::pipeline(&helpers::exclusive_json());
    let (conditions, default) = exclusive.node("gw").unwrap().branch_conditions().unwrap();
    assert_eq!(conditions.len(), 1);
    assert_eq!(default.unwrap().next_node, "large");

    let fan_out = helpers::pipeline(&helpers::conditional_parallel_json());
    let Some(Node::ConditionalParallelGateway(gateway)) = fan_out.node("fan") else {
        panic!("fan should be a conditional parallel gateway");
    };
    assert_eq!(gateway.lang, "mako");
    assert_eq!(gateway.conditions[1].next_node, "sms");
    assert_eq!(gateway.converge_gateway_id, "join");
}

#[test]
fn graph_from_exclusive_pipeline() {
    let pipeline = helpers::pipeline(&helpers::exclusive_json());
    let graph = PipelineGraph::build(&pipeline);
    assert_eq!(graph.node_indices.len(), 6);
    assert_eq!(graph.outgoing_count("gw"), 2);
    assert_eq!(graph.incoming_count("merge"), 2);
    assert_eq!(graph.outgoing_count("end"), 0);
    assert_eq!(pipeline.nodes_of_type(NodeType::Component).count(), 2);
}

#[test]
fn single_and_list_next_both_parse() {
    let pipeline = helpers::pipeline(&helpers::exclusive_json());
    assert_eq!(pipeline.node("start").unwrap().next(), Some(&Next::One("gw".into())));
    assert_eq!(pipeline.node("gw").unwrap().successors(), vec!["small", "large"]);
}

#[test]
fn unknown_node_type_is_rejected() {
    let mut source = helpers::linear_json();
    source["nodes"][1]["type"] = json!("subprocess");
    let err = convert_with::<json::PipelineConverter>(&source, &ConvertContext::deterministic())
        .unwrap_err();
    assert_eq!(err.code, "P002");
    assert_eq!(err.phase, Phase::Parse);
    assert_eq!(err.node_id.as_deref(), Some("fetch"));
}

#[test]
fn missing_required_key_is_rejected() {
    let mut source = helpers::linear_json();
    source["nodes"][1].as_object_mut().unwrap().remove("component");
    let err = convert_with::<json::PipelineConverter>(&source, &ConvertContext::deterministic())
        .unwrap_err();
    assert_eq!(err.code, "P001");
}

#[test]
fn unregistered_custom_type_is_rejected() {
    let mut source = helpers::linear_json();
    source["constants"][0]["custom_type"] = json!("rich_text");
    let err = convert_with::<json::PipelineConverter>(&source, &ConvertContext::deterministic())
        .unwrap_err();
    assert_eq!(err.code, "C004");
}

#[test]
fn mismatched_component_input_key_is_rejected() {
    let mut source = helpers::linear_json();
    source["constants"][1]["key"] = json!("method");
    let err = convert_with::<json::PipelineConverter>(&source, &ConvertContext::deterministic())
        .unwrap_err();
    assert_eq!(err.code, "C006");
}

#[test]
fn gateway_with_uncovered_branch_is_rejected() {
    let mut source = helpers::exclusive_json();
    source["nodes"][1].as_object_mut().unwrap().remove("default_condition");
    let err = convert_with::<json::PipelineConverter>(&source, &ConvertContext::deterministic())
        .unwrap_err();
    assert_eq!(err.code, "C003");
    assert_eq!(err.node_id.as_deref(), Some("gw"));
}

#[test]
fn wrapped_component_input_key_is_rejected() {
    let mut source = helpers::linear_json();
    source["constants"][1]["key"] = json!("${bk_http_request_method}");
    let err = convert_with::<json::PipelineConverter>(&source, &ConvertContext::deterministic())
        .unwrap_err();
    assert_eq!(err.code, "C006");
    assert_eq!(err.phase, Phase::Validate);
}
