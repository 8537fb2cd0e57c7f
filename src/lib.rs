pub mod config;
pub mod convert;
pub mod decision_table;
pub mod dmn;
pub mod error;
pub mod model;
pub mod tree;
pub mod validate;

use serde_json::Value;
use tracing::warn;

use convert::{ConvertContext, convert_with, json, web};
use error::ConvertError;
use tree::WebPipelineTree;

/// Full pipeline: JSON → data model → structural validation → web pipeline tree.
pub fn json_to_pipeline_tree(
    source: &Value,
    ctx: &ConvertContext,
) -> Result<WebPipelineTree, Vec<ConvertError>> {
    // 1. JSON → data model
    let pipeline = convert_with::<json::PipelineConverter>(source, ctx).map_err(|e| vec![e])?;

    // 2. Structural validation
    let errors = validate::validate_pipeline(&pipeline, &ctx.settings);
    if !errors.is_empty() {
        for e in &errors {
            warn!(code = %e.code, node = ?e.node_id, "{}", e.message);
        }
        return Err(errors);
    }

    // 3. Data model → web pipeline tree
    convert_with::<web::PipelineConverter>(&pipeline, ctx).map_err(|e| vec![e])
}
