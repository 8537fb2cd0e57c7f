use serde_json::Value;
use tracing::debug;

use crate::convert::{ConvertContext, Converter, DataType, convert_with};
use crate::error::ConvertError;
use crate::model::{Constant, ConstantType, Extensions, Node, NodeType, Pipeline};

use super::{
    ComponentInputConverter, ComponentNodeConverter, ComponentOutputConverter,
    ConditionalParallelGatewayConverter, ConvergeGatewayConverter, CustomConstantConverter,
    EndNodeConverter, ExclusiveGatewayConverter, ParallelGatewayConverter, StartNodeConverter,
    optional, required,
};

/// `{id, name, nodes?, constants?, extensions?}` into a typed [`Pipeline`].
pub struct PipelineConverter;

impl Converter for PipelineConverter {
    type Source = Value;
    type Target = Pipeline;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "PipelineConverter";

    fn convert(source: &Value, ctx: &ConvertContext) -> Result<Pipeline, ConvertError> {
        let mut pipeline = Pipeline::new(
            required::<String>(source, "id")?,
            required::<String>(source, "name")?,
            Vec::new(),
        );

        let nodes: Vec<Value> = optional(source, "nodes")?.unwrap_or_default();
        pipeline.nodes = nodes
            .iter()
            .map(|node| convert_node(node, ctx))
            .collect::<Result<_, _>>()?;

        let constants: Vec<Value> = optional(source, "constants")?.unwrap_or_default();
        pipeline.constants = constants
            .iter()
            .map(|constant| convert_constant(constant, ctx))
            .collect::<Result<_, _>>()?;

        pipeline.extensions = optional::<Extensions>(source, "extensions")?;

        debug!(
            pipeline = %pipeline.id,
            nodes = pipeline.nodes.len(),
            constants = pipeline.constants.len(),
            "parsed pipeline json"
        );
        Ok(pipeline)
    }
}

fn type_tag<'a>(data: &'a Value, what: &str) -> Result<&'a str, ConvertError> {
    data.get("type").and_then(Value::as_str).ok_or_else(|| {
        ConvertError::parse(
            "P002",
            format!("{} has no type tag", what),
            data.get("id").and_then(Value::as_str).map(String::from),
        )
    })
}

fn unknown_tag(tag: &str, what: &str, data: &Value) -> ConvertError {
    ConvertError::parse(
        "P002",
        format!("Unknown {} type '{}'", what, tag),
        data.get("id")
            .or_else(|| data.get("key"))
            .and_then(Value::as_str)
            .map(String::from),
    )
}

fn convert_node(data: &Value, ctx: &ConvertContext) -> Result<Node, ConvertError> {
    let tag = type_tag(data, "Node")?;
    let node_type = NodeType::from_tag(tag).ok_or_else(|| unknown_tag(tag, "node", data))?;
    match node_type {
        NodeType::StartEvent => convert_with::<StartNodeConverter>(data, ctx),
        NodeType::EndEvent => convert_with::<EndNodeConverter>(data, ctx),
        NodeType::Component => convert_with::<ComponentNodeConverter>(data, ctx),
        NodeType::ParallelGateway => convert_with::<ParallelGatewayConverter>(data, ctx),
        NodeType::ExclusiveGateway => convert_with::<ExclusiveGatewayConverter>(data, ctx),
        NodeType::ConditionalParallelGateway => {
            convert_with::<ConditionalParallelGatewayConverter>(data, ctx)
        }
        NodeType::ConvergeGateway => convert_with::<ConvergeGatewayConverter>(data, ctx),
    }
}

fn convert_constant(data: &Value, ctx: &ConvertContext) -> Result<Constant, ConvertError> {
    let tag = type_tag(data, "Constant")?;
    let constant_type =
        ConstantType::from_tag(tag).ok_or_else(|| unknown_tag(tag, "constant", data))?;
    match constant_type {
        ConstantType::Custom => convert_with::<CustomConstantConverter>(data, ctx),
        ConstantType::ComponentInputs => convert_with::<ComponentInputConverter>(data, ctx),
        ConstantType::ComponentOutputs => convert_with::<ComponentOutputConverter>(data, ctx),
    }
}
