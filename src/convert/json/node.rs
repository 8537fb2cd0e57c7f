use serde_json::Value;

use crate::config::Settings;
use crate::convert::{ConvertContext, Converter, DataType, Validators, convert_with};
use crate::error::ConvertError;
use crate::model::{ComponentNode, EmptyEndNode, EmptyStartNode, Node, NodeType};
use crate::validate::JsonTypeTagValidator;

use super::{ComponentConverter, apply_optional, optional, required};

pub struct StartNodeConverter;

impl Converter for StartNodeConverter {
    type Source = Value;
    type Target = Node;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "StartNodeConverter";

    fn validators(_settings: &Settings) -> Validators<Value> {
        vec![Box::new(JsonTypeTagValidator::new(NodeType::StartEvent.as_str()))]
    }

    fn convert(source: &Value, _ctx: &ConvertContext) -> Result<Node, ConvertError> {
        Ok(Node::StartEvent(EmptyStartNode {
            id: required(source, "id")?,
            name: optional(source, "name")?.unwrap_or_default(),
            next: required(source, "next")?,
        }))
    }
}

pub struct EndNodeConverter;

impl Converter for EndNodeConverter {
    type Source = Value;
    type Target = Node;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "EndNodeConverter";

    fn validators(_settings: &Settings) -> Validators<Value> {
        vec![Box::new(JsonTypeTagValidator::new(NodeType::EndEvent.as_str()))]
    }

    fn convert(source: &Value, _ctx: &ConvertContext) -> Result<Node, ConvertError> {
        Ok(Node::EndEvent(EmptyEndNode {
            id: required(source, "id")?,
            name: optional(source, "name")?.unwrap_or_default(),
        }))
    }
}

pub struct ComponentNodeConverter;

impl Converter for ComponentNodeConverter {
    type Source = Value;
    type Target = Node;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "ComponentNodeConverter";

    fn validators(_settings: &Settings) -> Validators<Value> {
        vec![Box::new(JsonTypeTagValidator::new(NodeType::Component.as_str()))]
    }

    fn convert(source: &Value, ctx: &ConvertContext) -> Result<Node, ConvertError> {
        let component: Value = required(source, "component")?;
        let mut node = ComponentNode::new(
            required::<String>(source, "id")?,
            convert_with::<ComponentConverter>(&component, ctx)?,
        );
        node.name = required(source, "name")?;
        node.next = required(source, "next")?;

        apply_optional(source, "skippable", &mut node.skippable)?;
        apply_optional(source, "retryable", &mut node.retryable)?;
        apply_optional(source, "error_ignorable", &mut node.error_ignorable)?;
        apply_optional(source, "auto_retry", &mut node.auto_retry)?;
        apply_optional(source, "timeout_config", &mut node.timeout_config)?;

        Ok(Node::Component(node))
    }
}
