//! Whole-pipeline conversion, run as a fixed sequence of stages:
//!
//! 1. `convert_nodes`: every node into its tree slot
//! 2. `convert_constants`: constants keyed by `${key}`, indexed by position
//! 3. `generate_flows`: one flow per `next` reference
//! 4. `wire_flows`: flow ids into `incoming`/`outgoing`
//! 5. `remap_conditions`: gateway conditions re-keyed by outgoing flow id
//! 6. `replace_all_id`: fresh ids everywhere
//!
//! Each stage takes the previous tree by value and returns the next one.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::Settings;
use crate::convert::{
    ConvertContext, Converter, ConverterHub, DataType, Validators, convert_with,
};
use crate::error::ConvertError;
use crate::model::{Constant, ConstantType, Flow, Node, Pipeline, reference_key};
use crate::tree::{
    BranchGatewayData, DefaultBranch, EndpointSide, EventNode, FlowCondition, GatewayConditions,
    IdGenerator, WebConstant, WebGateway, WebPipelineTree, replace_all_id,
};
use crate::validate::PipelineShapeValidator;

use super::{
    ComponentInputConverter, ComponentNodeConverter, ComponentOutputConverter,
    ConditionalParallelGatewayConverter, ConvergeGatewayConverter, CustomConstantConverter,
    EndNodeConverter, ExclusiveGatewayConverter, ParallelGatewayConverter, StartNodeConverter,
};

pub struct PipelineConverter;

impl Converter for PipelineConverter {
    type Source = Pipeline;
    type Target = WebPipelineTree;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "PipelineConverter";

    fn validators(_settings: &Settings) -> Validators<Pipeline> {
        vec![Box::new(PipelineShapeValidator)]
    }

    fn convert(source: &Pipeline, ctx: &ConvertContext) -> Result<WebPipelineTree, ConvertError> {
        debug!(pipeline = %source.id, nodes = source.nodes.len(), "converting pipeline");

        let tree = convert_nodes(source, ctx)?;
        let tree = convert_constants(tree, &source.constants, ctx)?;
        let flows = generate_flows(&source.nodes, ctx.ids.as_ref());
        debug!(pipeline = %source.id, flows = flows.len(), "generated flows");
        let tree = wire_flows(tree, &flows)?;
        let tree = remap_conditions(tree, &flows)?;

        Ok(replace_all_id(tree, ctx.ids.as_ref()))
    }
}

// =============================================================================
// STAGES
// =============================================================================

pub fn convert_nodes(
    pipeline: &Pipeline,
    ctx: &ConvertContext,
) -> Result<WebPipelineTree, ConvertError> {
    let mut start_event: Option<EventNode> = None;
    let mut end_event: Option<EventNode> = None;
    let mut activities = IndexMap::new();
    let mut gateways = IndexMap::new();

    for node in &pipeline.nodes {
        let id = node.id().to_string();
        match node {
            Node::StartEvent(_) => {
                start_event = Some(convert_with::<StartNodeConverter>(node, ctx)?);
            }
            Node::EndEvent(_) => {
                end_event = Some(convert_with::<EndNodeConverter>(node, ctx)?);
            }
            Node::Component(_) => {
                activities.insert(id, convert_with::<ComponentNodeConverter>(node, ctx)?);
            }
            Node::ParallelGateway(_) => {
                gateways.insert(id, convert_with::<ParallelGatewayConverter>(node, ctx)?);
            }
            Node::ExclusiveGateway(_) => {
                gateways.insert(id, convert_with::<ExclusiveGatewayConverter>(node, ctx)?);
            }
            Node::ConditionalParallelGateway(_) => {
                gateways.insert(
                    id,
                    convert_with::<ConditionalParallelGatewayConverter>(node, ctx)?,
                );
            }
            Node::ConvergeGateway(_) => {
                gateways.insert(id, convert_with::<ConvergeGatewayConverter>(node, ctx)?);
            }
        }
    }

    let missing = |kind: &str| {
        ConvertError::convert(
            "C007",
            format!("Pipeline '{}' has no {}", pipeline.id, kind),
            None,
        )
    };

    Ok(WebPipelineTree {
        id: pipeline.id.clone(),
        name: pipeline.name.clone(),
        start_event: start_event.ok_or_else(|| missing("start event"))?,
        end_event: end_event.ok_or_else(|| missing("end event"))?,
        activities,
        gateways,
        flows: IndexMap::new(),
        constants: IndexMap::new(),
        outputs: Vec::new(),
    })
}

/// Name of the registered converter for each constant kind.
fn constant_converter(constant_type: ConstantType) -> &'static str {
    match constant_type {
        ConstantType::Custom => CustomConstantConverter::NAME,
        ConstantType::ComponentInputs => ComponentInputConverter::NAME,
        ConstantType::ComponentOutputs => ComponentOutputConverter::NAME,
    }
}

/// Constants dispatch through the hub by kind, then take their list position as `index`.
pub fn convert_constants(
    tree: WebPipelineTree,
    constants: &[Constant],
    ctx: &ConvertContext,
) -> Result<WebPipelineTree, ConvertError> {
    let hub = ConverterHub::global();
    let mut converted = IndexMap::new();
    for (index, constant) in constants.iter().enumerate() {
        let name = constant_converter(constant.constant_type());
        let entry = hub
            .get_converter(DataType::DataModel, DataType::WebPipeline, name)
            .ok_or_else(|| {
                ConvertError::convert(
                    "C001",
                    format!("No converter '{}' registered for constant '{}'", name, constant.key()),
                    None,
                )
            })?;
        let web: WebConstant =
            serde_json::from_value(entry.convert(serde_json::to_value(constant)?, ctx)?)?;
        converted.insert(
            reference_key(constant.key()),
            WebConstant {
                index: Some(index),
                ..web
            },
        );
    }
    Ok(WebPipelineTree {
        constants: converted,
        ..tree
    })
}

/// One flow per `next` target, in node order then target order.
pub fn generate_flows(nodes: &[Node], ids: &dyn IdGenerator) -> Vec<Flow> {
    nodes
        .iter()
        .flat_map(|node| {
            node.successors().into_iter().map(move |target| Flow {
                id: ids.line_id(),
                source: node.id().to_string(),
                target: target.to_string(),
                is_default: false,
            })
        })
        .collect()
}

pub fn wire_flows(mut tree: WebPipelineTree, flows: &[Flow]) -> Result<WebPipelineTree, ConvertError> {
    for flow in flows {
        for (node_id, side) in [
            (&flow.source, EndpointSide::Outgoing),
            (&flow.target, EndpointSide::Incoming),
        ] {
            let endpoints = tree.endpoints_mut(node_id, side).ok_or_else(|| {
                ConvertError::wire(
                    "W001",
                    format!("Node '{}' not found while wiring flow '{}'", node_id, flow.id),
                    Some(node_id.clone()),
                )
            })?;
            endpoints.attach(&flow.id);
        }
        tree.flows.insert(flow.id.clone(), flow.clone());
    }
    Ok(tree)
}

pub fn remap_conditions(
    tree: WebPipelineTree,
    flows: &[Flow],
) -> Result<WebPipelineTree, ConvertError> {
    let flow_ids: HashMap<(&str, &str), &str> = flows
        .iter()
        .map(|f| ((f.source.as_str(), f.target.as_str()), f.id.as_str()))
        .collect();

    let gateways = tree
        .gateways
        .into_iter()
        .map(|(id, gateway)| {
            let gateway = match gateway {
                WebGateway::ExclusiveGateway(g) => {
                    WebGateway::ExclusiveGateway(remap_branches(g, &flow_ids)?)
                }
                WebGateway::ConditionalParallelGateway(g) => {
                    WebGateway::ConditionalParallelGateway(remap_branches(g, &flow_ids)?)
                }
                other @ (WebGateway::ParallelGateway(_) | WebGateway::ConvergeGateway(_)) => other,
            };
            Ok((id, gateway))
        })
        .collect::<Result<IndexMap<_, _>, ConvertError>>()?;

    Ok(WebPipelineTree { gateways, ..tree })
}

fn remap_branches(
    g: BranchGatewayData,
    flow_ids: &HashMap<(&str, &str), &str>,
) -> Result<BranchGatewayData, ConvertError> {
    let flow_to = |target: &str| -> Result<String, ConvertError> {
        flow_ids
            .get(&(g.id.as_str(), target))
            .map(|id| id.to_string())
            .ok_or_else(|| {
                ConvertError::remap(
                    "R001",
                    format!(
                        "Gateway '{}' has a condition for '{}' but no flow leads there",
                        g.id, target
                    ),
                    Some(g.id.clone()),
                )
            })
    };

    let conditions = match &g.conditions {
        GatewayConditions::ByNode(list) => GatewayConditions::ByFlow(
            list.iter()
                .map(|c| {
                    Ok((
                        flow_to(&c.next_node)?,
                        FlowCondition {
                            name: c.name.clone(),
                            evaluate: c.evaluate.clone(),
                        },
                    ))
                })
                .collect::<Result<IndexMap<_, _>, ConvertError>>()?,
        ),
        GatewayConditions::ByFlow(map) => GatewayConditions::ByFlow(map.clone()),
    };
    let default_condition = match &g.default_condition {
        Some(DefaultBranch::ByNode { name, next_node }) => Some(DefaultBranch::ByFlow {
            name: name.clone(),
            flow_id: flow_to(next_node)?,
        }),
        other => other.clone(),
    };

    Ok(BranchGatewayData {
        conditions,
        default_condition,
        ..g
    })
}
