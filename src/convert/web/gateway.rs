use crate::config::Settings;
use crate::convert::{ConvertContext, Converter, DataType, Validators, convert_with};
use crate::error::ConvertError;
use crate::model::{Condition, DefaultCondition, Node, NodeType};
use crate::tree::{
    BranchGatewayData, ConvergeGatewayData, DefaultBranch, Endpoints, GatewayConditions,
    GatewayExtraInfo, NodeCondition, ParallelGatewayData, WebGateway,
};
use crate::validate::{GatewayConditionValidator, NodeTypeValidator};

use super::unexpected_node;

/// Conditions keep their target node until the pipeline converter remaps them
/// onto flow ids.
pub struct ConditionConverter;

impl Converter for ConditionConverter {
    type Source = Vec<Condition>;
    type Target = Vec<NodeCondition>;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "ConditionConverter";

    fn convert(
        source: &Vec<Condition>,
        _ctx: &ConvertContext,
    ) -> Result<Vec<NodeCondition>, ConvertError> {
        Ok(source
            .iter()
            .map(|c| NodeCondition {
                name: c.name.clone(),
                evaluate: c.expr.clone(),
                next_node: c.next_node.clone(),
                is_default: false,
            })
            .collect())
    }
}

fn default_branch(default: Option<&DefaultCondition>) -> Option<DefaultBranch> {
    default.map(|d| DefaultBranch::ByNode {
        name: d.name.clone(),
        next_node: d.next_node.clone(),
    })
}

pub struct ParallelGatewayConverter;

impl Converter for ParallelGatewayConverter {
    type Source = Node;
    type Target = WebGateway;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "ParallelGatewayConverter";

    fn validators(_settings: &Settings) -> Validators<Node> {
        vec![Box::new(NodeTypeValidator::new(NodeType::ParallelGateway))]
    }

    fn convert(source: &Node, _ctx: &ConvertContext) -> Result<WebGateway, ConvertError> {
        let Node::ParallelGateway(node) = source else {
            return Err(unexpected_node(source, NodeType::ParallelGateway));
        };
        Ok(WebGateway::ParallelGateway(ParallelGatewayData {
            id: node.id.clone(),
            name: node.name.clone(),
            incoming: Endpoints::many(),
            outgoing: Endpoints::many(),
            converge_gateway_id: node.converge_gateway_id.clone(),
        }))
    }
}

pub struct ExclusiveGatewayConverter;

impl Converter for ExclusiveGatewayConverter {
    type Source = Node;
    type Target = WebGateway;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "ExclusiveGatewayConverter";

    fn validators(_settings: &Settings) -> Validators<Node> {
        vec![
            Box::new(NodeTypeValidator::new(NodeType::ExclusiveGateway)),
            Box::new(GatewayConditionValidator),
        ]
    }

    fn convert(source: &Node, ctx: &ConvertContext) -> Result<WebGateway, ConvertError> {
        let Node::ExclusiveGateway(node) = source else {
            return Err(unexpected_node(source, NodeType::ExclusiveGateway));
        };
        Ok(WebGateway::ExclusiveGateway(BranchGatewayData {
            id: node.id.clone(),
            name: node.name.clone(),
            incoming: Endpoints::many(),
            outgoing: Endpoints::many(),
            conditions: GatewayConditions::ByNode(convert_with::<ConditionConverter>(
                &node.conditions,
                ctx,
            )?),
            default_condition: default_branch(node.default_condition.as_ref()),
            converge_gateway_id: None,
            extra_info: GatewayExtraInfo {
                parse_lang: node.lang.clone(),
            },
        }))
    }
}

pub struct ConditionalParallelGatewayConverter;

impl Converter for ConditionalParallelGatewayConverter {
    type Source = Node;
    type Target = WebGateway;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "ConditionalParallelGatewayConverter";

    fn validators(_settings: &Settings) -> Validators<Node> {
        vec![
            Box::new(NodeTypeValidator::new(NodeType::ConditionalParallelGateway)),
            Box::new(GatewayConditionValidator),
        ]
    }

    fn convert(source: &Node, ctx: &ConvertContext) -> Result<WebGateway, ConvertError> {
        let Node::ConditionalParallelGateway(node) = source else {
            return Err(unexpected_node(source, NodeType::ConditionalParallelGateway));
        };
        Ok(WebGateway::ConditionalParallelGateway(BranchGatewayData {
            id: node.id.clone(),
            name: node.name.clone(),
            incoming: Endpoints::many(),
            outgoing: Endpoints::many(),
            conditions: GatewayConditions::ByNode(convert_with::<ConditionConverter>(
                &node.conditions,
                ctx,
            )?),
            default_condition: default_branch(node.default_condition.as_ref()),
            converge_gateway_id: Some(node.converge_gateway_id.clone()),
            extra_info: GatewayExtraInfo {
                parse_lang: node.lang.clone(),
            },
        }))
    }
}

pub struct ConvergeGatewayConverter;

impl Converter for ConvergeGatewayConverter {
    type Source = Node;
    type Target = WebGateway;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "ConvergeGatewayConverter";

    fn validators(_settings: &Settings) -> Validators<Node> {
        vec![Box::new(NodeTypeValidator::new(NodeType::ConvergeGateway))]
    }

    fn convert(source: &Node, _ctx: &ConvertContext) -> Result<WebGateway, ConvertError> {
        let Node::ConvergeGateway(node) = source else {
            return Err(unexpected_node(source, NodeType::ConvergeGateway));
        };
        Ok(WebGateway::ConvergeGateway(ConvergeGatewayData {
            id: node.id.clone(),
            name: node.name.clone(),
            incoming: Endpoints::many(),
            outgoing: Endpoints::one(),
        }))
    }
}
