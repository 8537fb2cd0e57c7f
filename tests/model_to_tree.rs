//! Integration tests for the data model → web pipeline tree phase.

mod helpers;

use bkflow_converter::config::Settings;
use bkflow_converter::convert::{Conversion, ConvertContext, convert_with, web};
use bkflow_converter::error::Phase;
use bkflow_converter::model::{
    Condition, Constant, EmptyEndNode, EmptyStartNode, ExclusiveGateway, Next, Node, Pipeline,
};
use bkflow_converter::tree::{
    DefaultBranch, GatewayConditions, SequentialIdGenerator, WebGateway, WebPipelineTree,
};
use serde_json::json;
use std::sync::Arc;

fn activity_named<'a>(tree: &'a WebPipelineTree, name: &str) -> &'a str {
    tree.activities
        .values()
        .find(|a| a.name == name)
        .map(|a| a.id.as_str())
        .unwrap_or_else(|| panic!("no activity named {}", name))
}

#[test]
fn flow_counts_follow_next_references() {
    assert_eq!(helpers::tree(&helpers::linear_json()).flows.len(), 2);
    assert_eq!(helpers::tree(&helpers::exclusive_json()).flows.len(), 6);
    assert_eq!(helpers::tree(&helpers::conditional_parallel_json()).flows.len(), 7);
}

#[test]
fn flows_have_no_dangling_endpoints() {
    for source in [
        helpers::linear_json(),
        helpers::exclusive_json(),
        helpers::conditional_parallel_json(),
    ] {
        let tree = helpers::tree(&source);
        for flow in tree.flows.values() {
            assert!(tree.contains_node(&flow.source), "dangling source in {:?}", flow);
            assert!(tree.contains_node(&flow.target), "dangling target in {:?}", flow);
        }
    }
}

#[test]
fn incoming_and_outgoing_match_flows() {
    for source in [
        helpers::linear_json(),
        helpers::exclusive_json(),
        helpers::conditional_parallel_json(),
    ] {
        let tree = helpers::tree(&source);
        for node_id in helpers::node_ids(&tree) {
            let mut expected_in: Vec<String> = tree
                .flows
                .values()
                .filter(|f| f.target == node_id)
                .map(|f| f.id.clone())
                .collect();
            let mut expected_out: Vec<String> = tree
                .flows
                .values()
                .filter(|f| f.source == node_id)
                .map(|f| f.id.clone())
                .collect();
            let mut actual_in = helpers::incoming(&tree, &node_id);
            let mut actual_out = helpers::outgoing(&tree, &node_id);
            expected_in.sort();
            expected_out.sort();
            actual_in.sort();
            actual_out.sort();
            assert_eq!(actual_in, expected_in, "incoming of {}", node_id);
            assert_eq!(actual_out, expected_out, "outgoing of {}", node_id);
        }
        assert!(helpers::incoming(&tree, &tree.start_event.id).is_empty());
        assert!(helpers::outgoing(&tree, &tree.end_event.id).is_empty());
    }
}

#[test]
fn exclusive_conditions_are_keyed_by_flow() {
    let tree = helpers::tree(&helpers::exclusive_json());
    let gateway = tree
        .gateways
        .values()
        .find_map(|g| match g {
            WebGateway::ExclusiveGateway(data) => Some(data),
            _ => None,
        })
        .expect("tree has an exclusive gateway");

    let GatewayConditions::ByFlow(conditions) = &gateway.conditions else {
        panic!("conditions should be remapped to flow ids");
    };
    assert_eq!(conditions.len(), 1);
    let (flow_id, condition) = conditions.first().unwrap();
    assert_eq!(condition.name, "small");
    assert_eq!(condition.evaluate, "${size} < 10");
    let flow = &tree.flows[flow_id];
    assert_eq!(flow.source, gateway.id);
    assert_eq!(flow.target, activity_named(&tree, "Handle small"));

    let Some(DefaultBranch::ByFlow { name, flow_id }) = &gateway.default_condition else {
        panic!("default condition should be remapped to a flow id");
    };
    assert_eq!(name, "otherwise");
    assert_eq!(tree.flows[flow_id].target, activity_named(&tree, "Handle large"));
    assert_eq!(gateway.extra_info.parse_lang, "boolrule");
}

#[test]
fn conditional_parallel_conditions_biject_onto_outgoing_flows() {
    let tree = helpers::tree(&helpers::conditional_parallel_json());
    let gateway = tree
        .gateways
        .values()
        .find_map(|g| match g {
            WebGateway::ConditionalParallelGateway(data) => Some(data),
            _ => None,
        })
        .expect("tree has a conditional parallel gateway");

    let GatewayConditions::ByFlow(conditions) = &gateway.conditions else {
        panic!("conditions should be remapped to flow ids");
    };
    let mut keys: Vec<&String> = conditions.keys().collect();
    let mut outgoing: Vec<String> = helpers::outgoing(&tree, &gateway.id);
    keys.sort();
    outgoing.sort();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys, outgoing.iter().collect::<Vec<_>>());
    assert_eq!(gateway.extra_info.parse_lang, "mako");

    let converge = gateway.converge_gateway_id.as_deref().unwrap();
    assert!(matches!(tree.gateways[converge], WebGateway::ConvergeGateway(_)));
}

#[test]
fn constants_are_indexed_in_source_order() {
    let tree = helpers::tree(&helpers::linear_json());
    let keys: Vec<&str> = tree.constants.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["${url}", "${bk_http_request_method}", "${status}"]);
    for (i, constant) in tree.constants.values().enumerate() {
        assert_eq!(constant.index, Some(i));
    }

    let method = &tree.constants["${bk_http_request_method}"];
    assert_eq!(method.value, json!(["GET"]));
    let fetch = activity_named(&tree, "Fetch report");
    assert_eq!(method.source_info[fetch], vec!["bk_http_request_method".to_string()]);
}

#[test]
fn constants_dispatch_by_kind_through_the_hub() {
    let pipeline = helpers::pipeline(&helpers::linear_json());
    let ctx = ConvertContext::deterministic();
    let tree = web::pipeline::convert_constants(
        helpers::tree(&helpers::linear_json()),
        &pipeline.constants,
        &ctx,
    )
    .unwrap();

    let output = pipeline
        .constants
        .iter()
        .find(|c| c.key() == "status")
        .unwrap();
    let direct = convert_with::<web::ComponentOutputConverter>(output, &ctx).unwrap();
    let dispatched = &tree.constants["${status}"];
    assert_eq!(dispatched.index, Some(2));
    assert_eq!(dispatched.source_tag, direct.source_tag);
    assert_eq!(dispatched.source_info, direct.source_info);
    assert_eq!(dispatched.source_type, direct.source_type);
}

#[test]
fn constant_validation_still_runs_through_the_hub() {
    let mut pipeline = helpers::pipeline(&helpers::linear_json());
    let Constant::Custom(url) = &mut pipeline.constants[0] else {
        panic!("expected the url constant first");
    };
    url.custom_type = "not_a_real_type".into();
    let err = convert_with::<web::PipelineConverter>(&pipeline, &ConvertContext::deterministic())
        .unwrap_err();
    assert_eq!(err.code, "C004");
}

#[test]
fn component_node_gets_web_defaults() {
    let tree = helpers::tree(&helpers::linear_json());
    let activity = &tree.activities[activity_named(&tree, "Fetch report")];
    assert!(activity.optional);
    assert_eq!(activity.activity_type, "ServiceActivity");
    assert_eq!(
        serde_json::to_value(&activity.auto_retry).unwrap(),
        json!({"enable": false, "interval": 0, "times": 1})
    );
    assert_eq!(
        serde_json::to_value(&activity.timeout_config).unwrap(),
        json!({"enable": false, "seconds": 10, "action": "forced_fail"})
    );
    let url = &activity.component.data["bk_http_request_url"];
    assert!(!url.hook);
    assert!(url.need_render);
    assert_eq!(url.value, json!("${url}"));
}

#[test]
fn ids_are_replaced_uniquely() {
    let tree = helpers::tree(&helpers::conditional_parallel_json());
    let mut ids = helpers::node_ids(&tree);
    for id in &ids {
        assert_eq!(id.len(), 32);
        assert!(id.starts_with('n'));
    }
    for id in tree.flows.keys() {
        assert_eq!(id.len(), 32);
        assert!(id.starts_with('l'));
    }
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert!(!tree.activities.keys().any(|id| id == "archive"));
}

#[test]
fn deterministic_ids_are_reproducible() {
    let first = helpers::tree(&helpers::exclusive_json());
    let second = helpers::tree(&helpers::exclusive_json());
    assert_eq!(first, second);
}

#[test]
fn unknown_next_fails_while_wiring() {
    let mut source = helpers::linear_json();
    source["nodes"][1]["next"] = json!("ghost");
    let pipeline = helpers::pipeline(&source);
    let err = convert_with::<web::PipelineConverter>(&pipeline, &ConvertContext::deterministic())
        .unwrap_err();
    assert_eq!(err.code, "W001");
    assert_eq!(err.phase, Phase::Wire);
    assert_eq!(err.node_id.as_deref(), Some("ghost"));
}

#[test]
fn gateway_converter_rejects_uncovered_branch_before_converting() {
    let gateway = Node::ExclusiveGateway(ExclusiveGateway {
        id: "gw".into(),
        name: "Choose".into(),
        next: Some(Next::Many(vec!["a".into(), "b".into()])),
        lang: "boolrule".into(),
        conditions: vec![Condition::new("to a", "1 == 1", "a")],
        default_condition: None,
    });
    let result = Conversion::<web::ExclusiveGatewayConverter>::with_context(
        gateway,
        ConvertContext::deterministic(),
    );
    let err = result.err().expect("construction must fail");
    assert_eq!(err.code, "C003");
    assert_eq!(err.phase, Phase::Validate);
}

#[test]
fn pipeline_without_single_start_is_rejected() {
    let mut pipeline = Pipeline::new(
        "p",
        "two starts",
        vec![
            Node::StartEvent(EmptyStartNode {
                id: "s1".into(),
                name: String::new(),
                next: Some(Next::One("e".into())),
            }),
            Node::StartEvent(EmptyStartNode {
                id: "s2".into(),
                name: String::new(),
                next: Some(Next::One("e".into())),
            }),
            Node::EndEvent(EmptyEndNode {
                id: "e".into(),
                name: String::new(),
            }),
        ],
    );
    let ctx = ConvertContext::new(
        Settings::default(),
        Arc::new(SequentialIdGenerator::new()),
    );
    let err = convert_with::<web::PipelineConverter>(&pipeline, &ctx).unwrap_err();
    assert_eq!(err.code, "C007");

    pipeline.nodes.remove(1);
    assert!(convert_with::<web::PipelineConverter>(&pipeline, &ctx).is_ok());
}

#[test]
fn remap_stage_reports_conditions_without_flows() {
    let pipeline = helpers::pipeline(&helpers::exclusive_json());
    let ctx = ConvertContext::deterministic();
    let tree = web::pipeline::convert_nodes(&pipeline, &ctx).unwrap();
    let err = web::pipeline::remap_conditions(tree, &[]).unwrap_err();
    assert_eq!(err.code, "R001");
    assert_eq!(err.node_id.as_deref(), Some("gw"));
}
