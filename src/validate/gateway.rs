//! Gateway branch validation: every condition must point at one of the gateway's
//! `next` nodes, and every `next` node must be reachable through a condition or
//! the default condition.

use serde_json::Value;

use super::Validator;
use crate::error::ConvertError;
use crate::model::Node;

pub struct GatewayConditionValidator;

impl Validator<Node> for GatewayConditionValidator {
    fn validate(&self, data: &Node) -> Result<(), ConvertError> {
        let Some((conditions, default)) = data.branch_conditions() else {
            return Ok(());
        };
        check_branches(
            data.id(),
            &data.successors(),
            conditions.iter().map(|c| c.next_node.as_str()),
            default.map(|d| d.next_node.as_str()),
        )
    }
}

/// Same rule over a raw JSON gateway, before it becomes a typed node.
pub struct JsonGatewayConditionValidator;

impl Validator<Value> for JsonGatewayConditionValidator {
    fn validate(&self, data: &Value) -> Result<(), ConvertError> {
        let id = data.get("id").and_then(Value::as_str).unwrap_or_default();
        let next: Vec<&str> = match data.get("next") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        let conditions = data
            .get("conditions")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(branch_target).collect::<Vec<_>>())
            .unwrap_or_default();
        let default = data.get("default_condition").and_then(branch_target);
        check_branches(id, &next, conditions.into_iter(), default)
    }
}

/// A branch target is stored as `next_node`, or as `next` in older documents.
fn branch_target(branch: &Value) -> Option<&str> {
    branch
        .get("next_node")
        .or_else(|| branch.get("next"))
        .and_then(Value::as_str)
}

fn check_branches<'a>(
    gateway_id: &str,
    next: &[&str],
    conditions: impl Iterator<Item = &'a str>,
    default: Option<&'a str>,
) -> Result<(), ConvertError> {
    let mut covered = Vec::new();
    for target in conditions.chain(default) {
        if !next.contains(&target) {
            return Err(ConvertError::validate(
                "C002",
                format!(
                    "Gateway '{}' has a condition targeting '{}', which is not in its next nodes",
                    gateway_id, target
                ),
                Some(gateway_id.to_string()),
            ));
        }
        covered.push(target);
    }
    if let Some(uncovered) = next.iter().find(|n| !covered.contains(n)) {
        return Err(ConvertError::validate(
            "C003",
            format!(
                "Gateway '{}' has no condition for next node '{}'",
                gateway_id, uncovered
            ),
            Some(gateway_id.to_string()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, DefaultCondition, ExclusiveGateway};
    use serde_json::json;

    fn gateway(next: Vec<&str>, conditions: Vec<Condition>) -> Node {
        Node::ExclusiveGateway(ExclusiveGateway {
            id: "gw".into(),
            name: String::new(),
            next: Some(next.into()),
            lang: "boolrule".into(),
            conditions,
            default_condition: None,
        })
    }

    #[test]
    fn dangling_condition_is_rejected() {
        let node = gateway(vec!["a"], vec![Condition::new("c", "1 == 1", "b")]);
        let err = GatewayConditionValidator.validate(&node).unwrap_err();
        assert_eq!(err.code, "C002");
        assert!(err.message.contains("'b'"));
    }

    #[test]
    fn uncovered_branch_is_rejected() {
        let node = gateway(vec!["a", "b"], vec![Condition::new("c", "1 == 1", "a")]);
        let err = GatewayConditionValidator.validate(&node).unwrap_err();
        assert_eq!(err.code, "C003");
    }

    #[test]
    fn default_condition_covers_a_branch() {
        let Node::ExclusiveGateway(mut g) =
            gateway(vec!["a", "b"], vec![Condition::new("c", "1 == 1", "a")])
        else {
            unreachable!()
        };
        g.default_condition = Some(DefaultCondition {
            name: "otherwise".into(),
            next_node: "b".into(),
        });
        assert!(GatewayConditionValidator
            .validate(&Node::ExclusiveGateway(g))
            .is_ok());
    }

    #[test]
    fn json_gateway_accepts_legacy_next_key() {
        let data = json!({
            "id": "gw",
            "type": "exclusive_gateway",
            "next": ["a", "b"],
            "conditions": [
                {"name": "x", "expr": "1 == 1", "next": "a"},
                {"name": "y", "expr": "1 == 0", "next_node": "b"},
            ],
        });
        assert!(JsonGatewayConditionValidator.validate(&data).is_ok());
    }
}
