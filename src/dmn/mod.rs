//! Single-table decision evaluation over a [`CompiledTable`].
//!
//! Cell-per-column rows are unary tests against the column's fact; expression
//! rows are boolean FEEL expressions over the whole fact map. Output cells are
//! FEEL literals.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::decision_table::{Column, CompiledTable, InputRow};

pub use eval::Env;
pub use parser::{UnaryTest, parse_expression, parse_unary_test};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecideError {
    #[error("invalid expression '{expression}': {message}")]
    Syntax { expression: String, message: String },

    #[error("fact '{0}' is referenced but was not provided")]
    UnknownFact(String),

    #[error("no rule of '{title}' matches the given facts")]
    NoMatch { title: String },

    #[error("hit policy Unique violated in '{title}': rules {rows:?} all match")]
    MultipleMatches { title: String, rows: Vec<usize> },

    #[error("unsupported hit policy '{0}'")]
    UnsupportedHitPolicy(String),

    #[error("rule {0} has no output row")]
    MissingOutputRow(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPolicy {
    Unique,
    First,
    Collect,
}

impl FromStr for HitPolicy {
    type Err = DecideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unique" | "u" => Ok(HitPolicy::Unique),
            "first" | "f" => Ok(HitPolicy::First),
            "collect" | "c" => Ok(HitPolicy::Collect),
            _ => Err(DecideError::UnsupportedHitPolicy(s.to_string())),
        }
    }
}

/// Evaluate `facts` against `table` and return one output map per matched rule.
///
/// In strict mode a referenced but missing fact, or no matching rule at all,
/// is an error; otherwise missing facts read as `null` and no match yields `[]`.
pub fn decide_single_table(
    table: &CompiledTable,
    facts: &Map<String, Value>,
    strict_mode: bool,
) -> Result<Vec<Map<String, Value>>, DecideError> {
    let policy: HitPolicy = table.hit_policy.parse()?;
    let env = Env::new(facts, strict_mode);

    let mut matched = Vec::new();
    for (index, row) in table.inputs.rows.iter().enumerate() {
        if row_matches(row, &table.inputs.cols, &env)? {
            matched.push(index);
            if policy == HitPolicy::First {
                break;
            }
        }
    }
    debug!(title = %table.title, matched = ?matched, "evaluated decision table");

    if matched.is_empty() {
        return if strict_mode {
            Err(DecideError::NoMatch {
                title: table.title.clone(),
            })
        } else {
            Ok(Vec::new())
        };
    }
    if policy == HitPolicy::Unique && matched.len() > 1 {
        return Err(DecideError::MultipleMatches {
            title: table.title.clone(),
            rows: matched,
        });
    }

    matched
        .into_iter()
        .map(|index| output_row(table, index, &env))
        .collect()
}

fn row_matches(row: &InputRow, cols: &[Column], env: &Env) -> Result<bool, DecideError> {
    match row {
        InputRow::Expression(source) => {
            Ok(eval::eval(&parse_expression(source)?, env)? == ast::Value::Bool(true))
        }
        InputRow::Cells(cells) => {
            if cells.len() != cols.len() {
                return Err(DecideError::Syntax {
                    expression: cells.join(" | "),
                    message: format!("{} cells for {} input columns", cells.len(), cols.len()),
                });
            }
            for (cell, col) in cells.iter().zip(cols) {
                let test = parse_unary_test(cell)?;
                if test == UnaryTest::Any {
                    continue;
                }
                if !eval::apply_test(&test, &env.lookup(&col.id)?, env)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

fn output_row(
    table: &CompiledTable,
    index: usize,
    env: &Env,
) -> Result<Map<String, Value>, DecideError> {
    let row = table
        .outputs
        .rows
        .get(index)
        .ok_or(DecideError::MissingOutputRow(index))?;
    table
        .outputs
        .cols
        .iter()
        .zip(row)
        .map(|(col, cell)| Ok((col.id.clone(), output_value(cell, env)?)))
        .collect()
}

fn output_value(cell: &Value, env: &Env) -> Result<Value, DecideError> {
    match cell {
        Value::String(source) if source.trim().is_empty() => Ok(Value::Null),
        Value::String(source) => Ok(eval::eval(&parse_expression(source)?, env)?.into()),
        other => Ok(other.clone()),
    }
}
