use std::cmp::Ordering;
use std::fmt;

use serde_json::Number;

/// Runtime values of the FEEL subset.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    /// Inclusive `[start..end]`.
    Range(Box<Value>, Box<Value>),
}

impl Value {
    /// FEEL equality: values of different kinds are never equal.
    pub fn feel_eq(&self, other: &Value) -> bool {
        self == other
    }

    /// Ordering between two numbers or two strings; `None` otherwise.
    pub fn feel_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// `self in other`: range inclusion, list membership, or equality.
    pub fn is_in(&self, other: &Value) -> bool {
        match other {
            Value::Range(start, end) => {
                matches!(
                    self.feel_cmp(start),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(self.feel_cmp(end), Some(Ordering::Less | Ordering::Equal))
            }
            Value::List(items) => items.iter().any(|item| self.feel_eq(item)),
            other => self.feel_eq(other),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            // Contexts are outside the supported subset; compare by their JSON text.
            serde_json::Value::Object(_) => Value::String(value.to_string()),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                serde_json::Value::Number((n as i64).into())
            }
            Value::Number(n) => Number::from_f64(n).map_or(serde_json::Value::Null, Into::into),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => items.into_iter().map(serde_json::Value::from).collect(),
            range @ Value::Range(..) => serde_json::Value::String(range.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Range(start, end) => write!(f, "[{}..{}]", start, end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Not,
    Contains,
    ListContains,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "not" => Some(Function::Not),
            "contains" => Some(Function::Contains),
            "list contains" => Some(Function::ListContains),
            _ => None,
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Function::Not => 1,
            Function::Contains | Function::ListContains => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Logical operations
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),

    // Comparison operations
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    SmallerThan(Box<Expression>, Box<Expression>),
    SmallerThanOrEqual(Box<Expression>, Box<Expression>),
    In(Box<Expression>, Box<Expression>),

    Negate(Box<Expression>),
    Call(Function, Vec<Expression>),
    Range(Box<Expression>, Box<Expression>),
    List(Vec<Expression>),

    // Leaf nodes
    Literal(Value),
    Name(String),
}

impl Expression {
    /// Whether the expression yields a truth value rather than a plain value.
    /// Decides how a column cell is applied to its input.
    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            Expression::And(..)
                | Expression::Or(..)
                | Expression::Equal(..)
                | Expression::NotEqual(..)
                | Expression::GreaterThan(..)
                | Expression::GreaterThanOrEqual(..)
                | Expression::SmallerThan(..)
                | Expression::SmallerThanOrEqual(..)
                | Expression::In(..)
                | Expression::Call(..)
        )
    }
}
