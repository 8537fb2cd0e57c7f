//! DataModel → web pipeline tree converters.

pub mod component;
pub mod constant;
pub mod gateway;
pub mod node;
pub mod pipeline;

pub use component::ComponentConverter;
pub use constant::{
    ComponentInputConverter, ComponentOutputConverter, CustomConstantConverter,
    SourceInfoConverter,
};
pub use gateway::{
    ConditionConverter, ConditionalParallelGatewayConverter, ConvergeGatewayConverter,
    ExclusiveGatewayConverter, ParallelGatewayConverter,
};
pub use node::{ComponentNodeConverter, EndNodeConverter, StartNodeConverter};
pub use pipeline::PipelineConverter;

use crate::error::ConvertError;
use crate::model::{Node, NodeType};

/// A converter was handed a node of another kind. Validators normally catch
/// this first; `convert` still refuses rather than guessing.
pub(crate) fn unexpected_node(node: &Node, expected: NodeType) -> ConvertError {
    ConvertError::convert(
        "C001",
        format!(
            "Node '{}' has type '{}', expected '{}'",
            node.id(),
            node.node_type(),
            expected
        ),
        Some(node.id().to_string()),
    )
}
