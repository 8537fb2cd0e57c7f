//! Validation: composable per-converter validators + pipeline-level structural rules.

pub mod constant;
pub mod gateway;
pub mod node;
pub mod structural;

pub use constant::{
    ComponentInputValidator, CustomConstantValidator, JsonComponentInputValidator,
    JsonCustomConstantValidator,
};
pub use gateway::{GatewayConditionValidator, JsonGatewayConditionValidator};
pub use node::{ConstantTypeValidator, JsonTypeTagValidator, NodeTypeValidator};
pub use structural::PipelineShapeValidator;

use crate::config::Settings;
use crate::error::ConvertError;
use crate::model::{Pipeline, PipelineGraph};

/// A single check run against a converter's source data before conversion.
pub trait Validator<T: ?Sized>: Send + Sync {
    fn validate(&self, data: &T) -> Result<(), ConvertError>;
}

/// Validate the whole pipeline graph. Returns all errors found.
pub fn validate_pipeline(pipeline: &Pipeline, settings: &Settings) -> Vec<ConvertError> {
    let graph = PipelineGraph::build(pipeline);
    structural::validate_structural(pipeline, &graph, settings)
}
