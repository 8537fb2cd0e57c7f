//! Tree-walking evaluation over a fact map.
//!
//! Logic is three-valued: comparisons across kinds, and functions applied to
//! the wrong kinds, yield `null`, and only `true` satisfies a rule.

use std::cmp::Ordering;

use serde_json::Map;

use super::DecideError;
use super::ast::{Expression, Function, Value};
use super::parser::{CompareOp, UnaryTest, parse_expression};

pub struct Env<'a> {
    facts: &'a Map<String, serde_json::Value>,
    strict: bool,
}

impl<'a> Env<'a> {
    pub fn new(facts: &'a Map<String, serde_json::Value>, strict: bool) -> Self {
        Env { facts, strict }
    }

    /// Absent facts are an error in strict mode and `null` otherwise.
    pub fn lookup(&self, name: &str) -> Result<Value, DecideError> {
        match self.facts.get(name) {
            Some(value) => Ok(Value::from(value)),
            None if self.strict => Err(DecideError::UnknownFact(name.to_string())),
            None => Ok(Value::Null),
        }
    }
}

pub fn eval(expr: &Expression, env: &Env) -> Result<Value, DecideError> {
    Ok(match expr {
        Expression::Literal(value) => value.clone(),
        Expression::Name(name) => env.lookup(name)?,

        Expression::And(l, r) => {
            let left = eval(l, env)?;
            if left == Value::Bool(false) {
                return Ok(left);
            }
            match (left, eval(r, env)?) {
                (_, Value::Bool(false)) => Value::Bool(false),
                (Value::Bool(true), Value::Bool(true)) => Value::Bool(true),
                _ => Value::Null,
            }
        }
        Expression::Or(l, r) => {
            let left = eval(l, env)?;
            if left == Value::Bool(true) {
                return Ok(left);
            }
            match (left, eval(r, env)?) {
                (_, Value::Bool(true)) => Value::Bool(true),
                (Value::Bool(false), Value::Bool(false)) => Value::Bool(false),
                _ => Value::Null,
            }
        }

        Expression::Equal(l, r) => Value::Bool(eval(l, env)?.feel_eq(&eval(r, env)?)),
        Expression::NotEqual(l, r) => Value::Bool(!eval(l, env)?.feel_eq(&eval(r, env)?)),
        Expression::GreaterThan(l, r) => ordered(l, r, env, |o| o == Ordering::Greater)?,
        Expression::GreaterThanOrEqual(l, r) => ordered(l, r, env, |o| o != Ordering::Less)?,
        Expression::SmallerThan(l, r) => ordered(l, r, env, |o| o == Ordering::Less)?,
        Expression::SmallerThanOrEqual(l, r) => ordered(l, r, env, |o| o != Ordering::Greater)?,
        Expression::In(l, r) => Value::Bool(eval(l, env)?.is_in(&eval(r, env)?)),

        Expression::Negate(inner) => match eval(inner, env)? {
            Value::Number(n) => Value::Number(-n),
            _ => Value::Null,
        },
        Expression::Call(function, args) => call(*function, args, env)?,
        Expression::Range(start, end) => {
            Value::Range(Box::new(eval(start, env)?), Box::new(eval(end, env)?))
        }
        Expression::List(items) => Value::List(
            items
                .iter()
                .map(|item| eval(item, env))
                .collect::<Result<_, _>>()?,
        ),
    })
}

fn ordered(
    l: &Expression,
    r: &Expression,
    env: &Env,
    accept: impl Fn(Ordering) -> bool,
) -> Result<Value, DecideError> {
    Ok(eval(l, env)?
        .feel_cmp(&eval(r, env)?)
        .map_or(Value::Null, |o| Value::Bool(accept(o))))
}

fn call(function: Function, args: &[Expression], env: &Env) -> Result<Value, DecideError> {
    let values = args
        .iter()
        .map(|arg| eval(arg, env))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(match (function, values.as_slice()) {
        (Function::Not, [Value::Bool(b)]) => Value::Bool(!b),
        (Function::Contains, [Value::String(s), Value::String(sub)]) => {
            Value::Bool(s.contains(sub.as_str()))
        }
        (Function::ListContains, [list, item]) => match as_list(list, env)? {
            Some(items) => Value::Bool(items.iter().any(|v| v.feel_eq(item))),
            None => Value::Null,
        },
        _ => Value::Null,
    })
}

/// Lists may arrive embedded in a string, e.g. `"['a', 'b']"`.
fn as_list(value: &Value, env: &Env) -> Result<Option<Vec<Value>>, DecideError> {
    match value {
        Value::List(items) => Ok(Some(items.clone())),
        Value::String(text) => match eval(&parse_expression(text)?, env)? {
            Value::List(items) => Ok(Some(items)),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Apply a column cell to that column's input value.
pub fn apply_test(test: &UnaryTest, input: &Value, env: &Env) -> Result<bool, DecideError> {
    match test {
        UnaryTest::Any => Ok(true),
        UnaryTest::Compare(op, operand) => {
            let operand = eval(operand, env)?;
            Ok(match op {
                CompareOp::NotEq => !input.feel_eq(&operand),
                CompareOp::Lt => input.feel_cmp(&operand) == Some(Ordering::Less),
                CompareOp::LtEq => matches!(
                    input.feel_cmp(&operand),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                CompareOp::Gt => input.feel_cmp(&operand) == Some(Ordering::Greater),
                CompareOp::GtEq => matches!(
                    input.feel_cmp(&operand),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
            })
        }
        // `not(<value>)` negates the test rather than the value.
        UnaryTest::Expr(Expression::Call(Function::Not, args))
            if args.len() == 1 && !args[0].is_predicate() =>
        {
            Ok(!input.is_in(&eval(&args[0], env)?))
        }
        UnaryTest::Expr(expr) if expr.is_predicate() => Ok(eval(expr, env)? == Value::Bool(true)),
        UnaryTest::Expr(expr) => Ok(input.is_in(&eval(expr, env)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dmn::parser::parse_unary_test;
    use serde_json::json;

    fn facts() -> Map<String, serde_json::Value> {
        json!({"n": 5, "s": "1234", "pick": "option1", "nothing": null})
            .as_object()
            .cloned()
            .unwrap()
    }

    fn truth(source: &str) -> Value {
        let facts = facts();
        eval(&parse_expression(source).unwrap(), &Env::new(&facts, true)).unwrap()
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(truth("n>4 and s=\"1234\""), Value::Bool(true));
        assert_eq!(truth("n>5 or nothing=null"), Value::Bool(true));
        assert_eq!(truth("n in [1..5]"), Value::Bool(true));
        assert_eq!(truth("not(n in [6..9])"), Value::Bool(true));
        assert_eq!(truth("s > 3"), Value::Null);
    }

    #[test]
    fn string_functions() {
        assert_eq!(truth("contains(s,\"23\")"), Value::Bool(true));
        assert_eq!(truth("list contains(\"['option1']\", pick)"), Value::Bool(true));
        assert_eq!(truth("list contains([\"a\", \"b\"], pick)"), Value::Bool(false));
        assert_eq!(truth("contains(n,\"5\")"), Value::Null);
    }

    #[test]
    fn strict_mode_rejects_unknown_facts() {
        let facts = facts();
        let expr = parse_expression("missing=1").unwrap();
        assert_eq!(
            eval(&expr, &Env::new(&facts, true)),
            Err(DecideError::UnknownFact("missing".into()))
        );
        assert_eq!(eval(&expr, &Env::new(&facts, false)), Ok(Value::Bool(false)));
    }

    #[test]
    fn cells_apply_to_their_input() {
        let facts = facts();
        let env = Env::new(&facts, true);
        let five = Value::Number(5.0);
        let holds = |cell: &str, input: &Value| {
            apply_test(&parse_unary_test(cell).unwrap(), input, &env).unwrap()
        };
        assert!(holds("5", &five));
        assert!(holds(">4", &five));
        assert!(!holds("<5", &five));
        assert!(holds("[1..5]", &five));
        assert!(holds("not(3)", &five));
        assert!(holds("null", &Value::Null));
        assert!(holds("n!=null", &five));
        assert!(!holds("\"5\"", &five));
    }
}
