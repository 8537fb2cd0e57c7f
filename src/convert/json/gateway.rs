use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Settings;
use crate::convert::{ConvertContext, Converter, DataType, Validators, convert_with};
use crate::error::ConvertError;
use crate::model::{
    Condition, ConditionalParallelGateway, ConvergeGateway, DefaultCondition, ExclusiveGateway,
    Node, NodeType, ParallelGateway,
};
use crate::validate::{JsonGatewayConditionValidator, JsonTypeTagValidator};

use super::{optional, required};

/// Branch conditions of a gateway, with the default branch split out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSet {
    pub conditions: Vec<Condition>,
    pub default_condition: Option<DefaultCondition>,
}

/// Reads a condition list. An entry flagged `is_default: true` is the default
/// branch and carries no expression.
pub struct ConditionConverter;

impl Converter for ConditionConverter {
    type Source = Value;
    type Target = ConditionSet;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "ConditionConverter";

    fn convert(source: &Value, _ctx: &ConvertContext) -> Result<ConditionSet, ConvertError> {
        let entries = source.as_array().ok_or_else(|| {
            ConvertError::parse("P001", "Gateway conditions must be a list", None)
        })?;

        let mut set = ConditionSet::default();
        for entry in entries {
            let name = optional(entry, "name")?.unwrap_or_default();
            let next_node: String = match optional(entry, "next_node")? {
                Some(next_node) => next_node,
                None => required(entry, "next")?,
            };
            if optional::<bool>(entry, "is_default")? == Some(true) {
                set.default_condition = Some(DefaultCondition { name, next_node });
            } else {
                set.conditions.push(Condition {
                    name,
                    expr: required(entry, "expr")?,
                    next_node,
                });
            }
        }
        Ok(set)
    }
}

/// Conditions of an exclusive or conditional parallel gateway. An explicit
/// `default_condition` object wins over an `is_default` list entry.
fn read_conditions(source: &Value, ctx: &ConvertContext) -> Result<ConditionSet, ConvertError> {
    let conditions: Value = required(source, "conditions")?;
    let mut set = convert_with::<ConditionConverter>(&conditions, ctx)?;
    if let Some(default) = optional::<DefaultCondition>(source, "default_condition")? {
        set.default_condition = Some(default);
    }
    Ok(set)
}

/// `lang` is applied only when present and non-empty.
fn read_lang(source: &Value, lang: &mut String) -> Result<(), ConvertError> {
    if let Some(value) = optional::<String>(source, "lang")?.filter(|l| !l.is_empty()) {
        *lang = value;
    }
    Ok(())
}

fn gateway_validators(node_type: NodeType) -> Validators<Value> {
    vec![
        Box::new(JsonTypeTagValidator::new(node_type.as_str())),
        Box::new(JsonGatewayConditionValidator),
    ]
}

pub struct ParallelGatewayConverter;

impl Converter for ParallelGatewayConverter {
    type Source = Value;
    type Target = Node;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "ParallelGatewayConverter";

    fn validators(_settings: &Settings) -> Validators<Value> {
        vec![Box::new(JsonTypeTagValidator::new(
            NodeType::ParallelGateway.as_str(),
        ))]
    }

    fn convert(source: &Value, _ctx: &ConvertContext) -> Result<Node, ConvertError> {
        Ok(Node::ParallelGateway(ParallelGateway {
            id: required(source, "id")?,
            name: required(source, "name")?,
            next: required(source, "next")?,
            converge_gateway_id: required(source, "converge_gateway_id")?,
        }))
    }
}

pub struct ExclusiveGatewayConverter;

impl Converter for ExclusiveGatewayConverter {
    type Source = Value;
    type Target = Node;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "ExclusiveGatewayConverter";

    fn validators(_settings: &Settings) -> Validators<Value> {
        gateway_validators(NodeType::ExclusiveGateway)
    }

    fn convert(source: &Value, ctx: &ConvertContext) -> Result<Node, ConvertError> {
        let ConditionSet {
            conditions,
            default_condition,
        } = read_conditions(source, ctx)?;
        let mut gateway = ExclusiveGateway {
            id: required(source, "id")?,
            name: required(source, "name")?,
            next: required(source, "next")?,
            lang: "boolrule".into(),
            conditions,
            default_condition,
        };
        read_lang(source, &mut gateway.lang)?;
        Ok(Node::ExclusiveGateway(gateway))
    }
}

pub struct ConditionalParallelGatewayConverter;

impl Converter for ConditionalParallelGatewayConverter {
    type Source = Value;
    type Target = Node;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "ConditionalParallelGatewayConverter";

    fn validators(_settings: &Settings) -> Validators<Value> {
        gateway_validators(NodeType::ConditionalParallelGateway)
    }

    fn convert(source: &Value, ctx: &ConvertContext) -> Result<Node, ConvertError> {
        let ConditionSet {
            conditions,
            default_condition,
        } = read_conditions(source, ctx)?;
        let mut gateway = ConditionalParallelGateway {
            id: required(source, "id")?,
            name: required(source, "name")?,
            next: required(source, "next")?,
            lang: "boolrule".into(),
            conditions,
            default_condition,
            converge_gateway_id: required(source, "converge_gateway_id")?,
        };
        read_lang(source, &mut gateway.lang)?;
        Ok(Node::ConditionalParallelGateway(gateway))
    }
}

pub struct ConvergeGatewayConverter;

impl Converter for ConvergeGatewayConverter {
    type Source = Value;
    type Target = Node;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "ConvergeGatewayConverter";

    fn validators(_settings: &Settings) -> Validators<Value> {
        vec![Box::new(JsonTypeTagValidator::new(
            NodeType::ConvergeGateway.as_str(),
        ))]
    }

    fn convert(source: &Value, _ctx: &ConvertContext) -> Result<Node, ConvertError> {
        Ok(Node::ConvergeGateway(ConvergeGateway {
            id: required(source, "id")?,
            name: required(source, "name")?,
            next: required(source, "next")?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn is_default_entry_becomes_default_condition() {
        let set = convert_with::<ConditionConverter>(
            &json!([
                {"name": "yes", "expr": "${x} == 1", "next_node": "a"},
                {"name": "otherwise", "is_default": true, "next_node": "b"},
            ]),
            &ConvertContext::default(),
        )
        .unwrap();
        assert_eq!(set.conditions, vec![Condition::new("yes", "${x} == 1", "a")]);
        assert_eq!(
            set.default_condition,
            Some(DefaultCondition {
                name: "otherwise".into(),
                next_node: "b".into(),
            })
        );
    }

    #[test]
    fn exclusive_gateway_rejects_dangling_condition_before_converting() {
        let err = convert_with::<ExclusiveGatewayConverter>(
            &json!({
                "id": "gw",
                "type": "exclusive_gateway",
                "name": "",
                "next": ["a"],
                "conditions": [{"name": "c", "expr": "1 == 1", "next_node": "missing"}],
            }),
            &ConvertContext::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, "C002");
    }
}
