//! Compilation of a single `compare` + right-hand value into a FEEL fragment.

use serde_json::Value;

use super::DecisionTableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare {
    Equals,
    NotEquals,
    IsNull,
    NotNull,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    InRange,
    NotInRange,
}

impl Compare {
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "equals" => Compare::Equals,
            "not-equals" => Compare::NotEquals,
            "is-null" => Compare::IsNull,
            "not-null" => Compare::NotNull,
            "contains" => Compare::Contains,
            "not-contains" => Compare::NotContains,
            "greater-than" => Compare::GreaterThan,
            "less-than" => Compare::LessThan,
            "greater-than-or-equal" => Compare::GreaterThanOrEqual,
            "less-than-or-equal" => Compare::LessThanOrEqual,
            "in-range" => Compare::InRange,
            "not-in-range" => Compare::NotInRange,
            _ => return None,
        })
    }
}

/// Right-hand value after interpreting its `type` tag.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Int(i64),
    /// `[start..end]`, already rendered.
    Range(String),
    Raw(Value),
}

impl Operand {
    /// `{}` or `{"type": ..., "value": ...}`.
    fn from_obj(obj: &Value) -> Result<Self, DecisionTableError> {
        let Some(map) = obj.as_object() else {
            return Err(DecisionTableError::MalformedValue(format!(
                "right operand must be an object, got {}",
                obj
            )));
        };
        let value = map.get("value").cloned().unwrap_or(Value::Null);
        match map.get("type").and_then(Value::as_str) {
            Some("int") => Ok(Operand::Int(to_int(&value)?)),
            Some("int_range") => {
                let bound = |key: &str| {
                    value.get(key).map(python_str).ok_or_else(|| {
                        DecisionTableError::MalformedValue(format!(
                            "int_range value {} has no '{}'",
                            value, key
                        ))
                    })
                };
                Ok(Operand::Range(format!("[{}..{}]", bound("start")?, bound("end")?)))
            }
            _ => Ok(Operand::Raw(value)),
        }
    }

    /// Integers (booleans included) render bare; everything else is quoted.
    fn is_int(&self) -> bool {
        match self {
            Operand::Int(_) => true,
            Operand::Raw(Value::Number(n)) => n.is_i64() || n.is_u64(),
            Operand::Raw(Value::Bool(_)) => true,
            _ => false,
        }
    }

    fn is_list(&self) -> bool {
        matches!(self, Operand::Raw(Value::Array(_)))
    }

    fn render(&self) -> String {
        match self {
            Operand::Int(n) => n.to_string(),
            Operand::Range(r) => r.clone(),
            Operand::Raw(v) => python_str(v),
        }
    }

    fn literal(&self) -> String {
        if self.is_int() {
            self.render()
        } else {
            format!("\"{}\"", self.render())
        }
    }
}

fn to_int(value: &Value) -> Result<i64, DecisionTableError> {
    let malformed = || DecisionTableError::MalformedValue(format!("{} is not an integer", value));
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(malformed),
        Value::String(s) => s.trim().parse().map_err(|_| malformed()),
        Value::Bool(b) => Ok(i64::from(*b)),
        _ => Err(malformed()),
    }
}

/// Render a JSON value the way stored tables expect: `None`, `True`/`False`,
/// bare strings, and single-quoted list/object items.
pub fn python_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => python_repr(other),
    }
}

fn python_repr(value: &Value) -> String {
    match value {
        Value::Null => "None".into(),
        Value::Bool(true) => "True".into(),
        Value::Bool(false) => "False".into(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.contains('\'') && !s.contains('"') {
                format!("\"{}\"", s.replace('\\', "\\\\"))
            } else {
                format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
            }
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_repr).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", python_repr(&Value::String(k.clone())), python_repr(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Compiles one condition against one input field.
///
/// The short form (`is_full == false`) omits the field id wherever the column
/// position already binds it; negations and `contains` always name the field.
pub struct RightOperationParser<'a> {
    field_id: &'a str,
    is_full: bool,
}

impl<'a> RightOperationParser<'a> {
    pub fn new(field_id: &'a str, is_full: bool) -> Self {
        RightOperationParser { field_id, is_full }
    }

    pub fn parse(&self, compare: &str, value_obj: &Value) -> Result<String, DecisionTableError> {
        let op = Compare::from_tag(compare)
            .ok_or_else(|| DecisionTableError::UnsupportedCompare(compare.to_string()))?;
        let value = Operand::from_obj(value_obj)?;
        Ok(self.compile(op, &value))
    }

    fn qualified(&self, op: &str, rhs: &str) -> String {
        if self.is_full {
            format!("{}{}{}", self.field_id, op, rhs)
        } else {
            format!("{}{}", op, rhs)
        }
    }

    fn compile(&self, op: Compare, value: &Operand) -> String {
        let id = self.field_id;
        match op {
            Compare::Equals if self.is_full => format!("{}={}", id, value.literal()),
            Compare::Equals => value.literal(),
            Compare::NotEquals => format!("{}!={}", id, value.literal()),
            Compare::IsNull if self.is_full => format!("{}=null", id),
            Compare::IsNull => "null".into(),
            Compare::NotNull => format!("{}!=null", id),
            Compare::Contains => format!("contains({},\"{}\")", id, value.render()),
            Compare::NotContains => format!("not(contains({},\"{}\"))", id, value.render()),
            Compare::GreaterThan => self.qualified(">", &value.render()),
            Compare::LessThan => self.qualified("<", &value.render()),
            Compare::GreaterThanOrEqual => self.qualified(">=", &value.render()),
            Compare::LessThanOrEqual => self.qualified("<=", &value.render()),
            Compare::InRange if value.is_list() => {
                format!("list contains(\"{}\", {})", value.render(), id)
            }
            Compare::InRange if self.is_full => format!("{} in {}", id, value.render()),
            Compare::InRange => value.render(),
            Compare::NotInRange if value.is_list() => {
                format!("not(list contains(\"{}\", {}))", value.render(), id)
            }
            Compare::NotInRange => format!("not({} in {})", id, value.render()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn short(compare: &str, obj: Value) -> String {
        RightOperationParser::new("f", false).parse(compare, &obj).unwrap()
    }

    fn full(compare: &str, obj: Value) -> String {
        RightOperationParser::new("f", true).parse(compare, &obj).unwrap()
    }

    #[test]
    fn equals_quotes_everything_but_integers() {
        assert_eq!(short("equals", json!({"type": "int", "value": "123"})), "123");
        assert_eq!(short("equals", json!({"type": "string", "value": "abc"})), "\"abc\"");
        assert_eq!(short("equals", json!({"type": "string", "value": 7})), "7");
        assert_eq!(short("equals", json!({"type": "string", "value": 1.5})), "\"1.5\"");
        assert_eq!(full("equals", json!({"type": "int", "value": "1"})), "f=1");
    }

    #[test]
    fn null_checks() {
        assert_eq!(short("is-null", json!({})), "null");
        assert_eq!(full("is-null", json!({})), "f=null");
        assert_eq!(short("not-null", json!({})), "f!=null");
    }

    #[test]
    fn ranges_and_lists() {
        let range = json!({"type": "int_range", "value": {"start": 1, "end": 5}});
        assert_eq!(short("in-range", range.clone()), "[1..5]");
        assert_eq!(full("in-range", range.clone()), "f in [1..5]");
        assert_eq!(short("not-in-range", range), "not(f in [1..5])");

        let list = json!({"type": "select[Range]", "value": ["option1", "option2"]});
        assert_eq!(
            short("in-range", list.clone()),
            "list contains(\"['option1', 'option2']\", f)"
        );
        assert_eq!(
            full("not-in-range", list),
            "not(list contains(\"['option1', 'option2']\", f))"
        );
    }

    #[test]
    fn comparisons_and_contains() {
        assert_eq!(short("greater-than", json!({"type": "int", "value": "5"})), ">5");
        assert_eq!(full("less-than-or-equal", json!({"type": "int", "value": 3})), "f<=3");
        assert_eq!(short("contains", json!({"value": "23"})), "contains(f,\"23\")");
        assert_eq!(short("not-contains", json!({"value": "x"})), "not(contains(f,\"x\"))");
    }

    #[test]
    fn unknown_compare_and_bad_int_fail() {
        let parser = RightOperationParser::new("f", false);
        assert_eq!(
            parser.parse("between", &json!({})),
            Err(DecisionTableError::UnsupportedCompare("between".into()))
        );
        assert!(matches!(
            parser.parse("equals", &json!({"type": "int", "value": "abc"})),
            Err(DecisionTableError::MalformedValue(_))
        ));
    }

    #[test]
    fn python_rendering() {
        assert_eq!(python_str(&json!(null)), "None");
        assert_eq!(python_str(&json!(true)), "True");
        assert_eq!(python_str(&json!(["a", 1, null])), "['a', 1, None]");
        assert_eq!(python_str(&json!({"k": "v"})), "{'k': 'v'}");
    }
}
