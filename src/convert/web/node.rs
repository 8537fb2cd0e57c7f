use crate::config::Settings;
use crate::convert::{ConvertContext, Converter, DataType, Validators, convert_with};
use crate::error::ConvertError;
use crate::model::{Node, NodeType};
use crate::tree::{Activity, EMPTY_END_EVENT, EMPTY_START_EVENT, Endpoints, EventNode, SERVICE_ACTIVITY};
use crate::validate::NodeTypeValidator;

use super::{ComponentConverter, unexpected_node};

pub struct StartNodeConverter;

impl Converter for StartNodeConverter {
    type Source = Node;
    type Target = EventNode;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "StartNodeConverter";

    fn validators(_settings: &Settings) -> Validators<Node> {
        vec![Box::new(NodeTypeValidator::new(NodeType::StartEvent))]
    }

    fn convert(source: &Node, _ctx: &ConvertContext) -> Result<EventNode, ConvertError> {
        let Node::StartEvent(node) = source else {
            return Err(unexpected_node(source, NodeType::StartEvent));
        };
        Ok(EventNode {
            id: node.id.clone(),
            name: String::new(),
            event_type: EMPTY_START_EVENT.into(),
            incoming: Endpoints::one(),
            outgoing: Endpoints::one(),
        })
    }
}

pub struct EndNodeConverter;

impl Converter for EndNodeConverter {
    type Source = Node;
    type Target = EventNode;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "EndNodeConverter";

    fn validators(_settings: &Settings) -> Validators<Node> {
        vec![Box::new(NodeTypeValidator::new(NodeType::EndEvent))]
    }

    fn convert(source: &Node, _ctx: &ConvertContext) -> Result<EventNode, ConvertError> {
        let Node::EndEvent(node) = source else {
            return Err(unexpected_node(source, NodeType::EndEvent));
        };
        Ok(EventNode {
            id: node.id.clone(),
            name: String::new(),
            event_type: EMPTY_END_EVENT.into(),
            incoming: Endpoints::many(),
            outgoing: Endpoints::one(),
        })
    }
}

pub struct ComponentNodeConverter;

impl Converter for ComponentNodeConverter {
    type Source = Node;
    type Target = Activity;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "ComponentNodeConverter";

    fn validators(_settings: &Settings) -> Validators<Node> {
        vec![Box::new(NodeTypeValidator::new(NodeType::Component))]
    }

    fn convert(source: &Node, ctx: &ConvertContext) -> Result<Activity, ConvertError> {
        let Node::Component(node) = source else {
            return Err(unexpected_node(source, NodeType::Component));
        };
        Ok(Activity {
            id: node.id.clone(),
            name: node.name.clone(),
            activity_type: SERVICE_ACTIVITY.into(),
            optional: true,
            incoming: Endpoints::many(),
            outgoing: Endpoints::one(),
            component: convert_with::<ComponentConverter>(&node.component, ctx)?,
            error_ignorable: node.error_ignorable,
            skippable: node.skippable,
            retryable: node.retryable,
            auto_retry: node.auto_retry.clone(),
            timeout_config: node.timeout_config.clone(),
        })
    }
}
