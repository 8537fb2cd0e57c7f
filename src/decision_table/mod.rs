//! Decision-table compilation.
//!
//! A raw decision table (`inputs`, `outputs`, `records`) is compiled into the
//! DMN-ready [`CompiledTable`] consumed by [`crate::dmn::decide_single_table`]:
//! every record's condition block becomes either one cell per input column or a
//! single boolean expression, and every output value becomes a literal.

pub mod condition;
pub mod fields;
pub mod operation;
pub mod output;
pub mod parser;
pub mod schema;

pub use condition::{
    CommonConditionParser, ConditionParser, ExpressionParser, OrAndConditionParser, RecordKind,
};
pub use fields::{Column, Field, InputField, OutputField};
pub use operation::{Compare, RightOperationParser, python_str};
pub use output::OutputParser;
pub use parser::{CompiledInputs, CompiledOutputs, CompiledTable, DecisionTableParser, InputRow};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionTableError {
    #[error("[validate decision table schema error]: {message} (at '{path}')")]
    Schema { path: String, message: String },

    #[error("[parse decision table error]: can not get record type of {0}")]
    UnsupportedRecordType(String),

    #[error("[parse decision table error]: condition references unknown input field '{0}'")]
    UnknownField(String),

    #[error("[parse decision table error]: unsupported compare '{0}'")]
    UnsupportedCompare(String),

    #[error("[parse decision table error]: malformed value: {0}")]
    MalformedValue(String),

    #[error("[parse decision table error]: record {record} has no value for output field '{field}'")]
    MissingOutput { record: usize, field: String },

    #[error("[parse decision table error]: invalid field metadata: {0}")]
    BadField(String),
}
