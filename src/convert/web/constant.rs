use indexmap::IndexMap;
use serde_json::Value;

use crate::config::Settings;
use crate::convert::{BiConverter, ConvertContext, Converter, DataType, Validators, convert_with};
use crate::error::ConvertError;
use crate::model::{Constant, ConstantType, SourceInfo, reference_key};
use crate::tree::WebConstant;
use crate::validate::{
    ComponentInputValidator, ConstantTypeValidator, CustomConstantValidator, Validator,
};

/// `[{key: node, value: field}]` becomes `{node: [field]}`. A node listed twice
/// keeps its last field.
pub struct SourceInfoConverter;

impl Converter for SourceInfoConverter {
    type Source = Vec<SourceInfo>;
    type Target = IndexMap<String, Vec<String>>;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "SourceInfoConverter";

    fn convert(
        source: &Vec<SourceInfo>,
        _ctx: &ConvertContext,
    ) -> Result<IndexMap<String, Vec<String>>, ConvertError> {
        Ok(source
            .iter()
            .map(|info| (info.key.clone(), vec![info.value.clone()]))
            .collect())
    }
}

impl BiConverter for SourceInfoConverter {
    fn reverse_validators(_settings: &Settings) -> Validators<IndexMap<String, Vec<String>>> {
        vec![Box::new(NonEmptySourceInfoValidator)]
    }

    fn reconvert(
        target: &IndexMap<String, Vec<String>>,
        _ctx: &ConvertContext,
    ) -> Result<Vec<SourceInfo>, ConvertError> {
        Ok(target
            .iter()
            .flat_map(|(node_id, fields)| {
                fields.iter().map(move |field| SourceInfo {
                    key: node_id.clone(),
                    value: field.clone(),
                })
            })
            .collect())
    }
}

struct NonEmptySourceInfoValidator;

impl Validator<IndexMap<String, Vec<String>>> for NonEmptySourceInfoValidator {
    fn validate(&self, data: &IndexMap<String, Vec<String>>) -> Result<(), ConvertError> {
        match data.iter().find(|(_, fields)| fields.is_empty()) {
            Some((node_id, _)) => Err(ConvertError::validate(
                "C008",
                format!("Source info of node '{}' lists no fields", node_id),
                Some(node_id.clone()),
            )),
            None => Ok(()),
        }
    }
}

fn unexpected_constant(constant: &Constant, expected: ConstantType) -> ConvertError {
    ConvertError::convert(
        "C001",
        format!(
            "Constant '{}' has type '{}', expected '{}'",
            constant.key(),
            constant.constant_type(),
            expected
        ),
        None,
    )
}

pub struct CustomConstantConverter;

impl Converter for CustomConstantConverter {
    type Source = Constant;
    type Target = WebConstant;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "CustomConstantConverter";

    fn validators(settings: &Settings) -> Validators<Constant> {
        vec![
            Box::new(ConstantTypeValidator::new(ConstantType::Custom)),
            Box::new(CustomConstantValidator::new(settings.constants.clone())),
        ]
    }

    fn convert(source: &Constant, ctx: &ConvertContext) -> Result<WebConstant, ConvertError> {
        let Constant::Custom(c) = source else {
            return Err(unexpected_constant(source, ConstantType::Custom));
        };
        Ok(WebConstant {
            name: c.name.clone(),
            key: reference_key(&c.key),
            desc: c.desc.clone(),
            value: c.value.clone(),
            custom_type: c.custom_type.clone(),
            show_type: c.show_type.clone(),
            source_tag: c.source_tag.clone(),
            source_type: ConstantType::Custom,
            source_info: convert_with::<SourceInfoConverter>(&c.source_info, ctx)?,
            validation: c.validation.clone(),
            version: Some(c.version.clone()),
            pre_render_mako: Some(c.pre_render_mako),
            is_meta: Some(c.is_meta),
            plugin_code: None,
            extra_info: None,
            index: None,
        })
    }
}

pub struct ComponentInputConverter;

impl Converter for ComponentInputConverter {
    type Source = Constant;
    type Target = WebConstant;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "ComponentInputConverter";

    fn validators(_settings: &Settings) -> Validators<Constant> {
        vec![
            Box::new(ConstantTypeValidator::new(ConstantType::ComponentInputs)),
            Box::new(ComponentInputValidator),
        ]
    }

    fn convert(source: &Constant, ctx: &ConvertContext) -> Result<WebConstant, ConvertError> {
        let Constant::ComponentInputs(c) = source else {
            return Err(unexpected_constant(source, ConstantType::ComponentInputs));
        };
        Ok(WebConstant {
            name: c.name.clone(),
            key: reference_key(&c.key),
            desc: c.desc.clone(),
            value: Value::Array(vec![c.value.clone()]),
            custom_type: c.custom_type.clone(),
            show_type: c.show_type.clone(),
            source_tag: c.source_tag.clone(),
            source_type: ConstantType::ComponentInputs,
            source_info: convert_with::<SourceInfoConverter>(&c.source_info, ctx)?,
            validation: c.validation.clone(),
            version: Some(c.version.clone()),
            pre_render_mako: None,
            is_meta: None,
            plugin_code: Some(c.plugin_code.clone()),
            extra_info: Some(c.extra_info.clone()),
            index: None,
        })
    }
}

pub struct ComponentOutputConverter;

impl Converter for ComponentOutputConverter {
    type Source = Constant;
    type Target = WebConstant;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "ComponentOutputConverter";

    fn validators(_settings: &Settings) -> Validators<Constant> {
        vec![Box::new(ConstantTypeValidator::new(ConstantType::ComponentOutputs))]
    }

    fn convert(source: &Constant, ctx: &ConvertContext) -> Result<WebConstant, ConvertError> {
        let Constant::ComponentOutputs(c) = source else {
            return Err(unexpected_constant(source, ConstantType::ComponentOutputs));
        };
        Ok(WebConstant {
            name: c.name.clone(),
            key: reference_key(&c.key),
            desc: c.desc.clone(),
            value: c.value.clone(),
            custom_type: c.custom_type.clone(),
            show_type: c.show_type.clone(),
            source_tag: c.source_tag.clone(),
            source_type: ConstantType::ComponentOutputs,
            source_info: convert_with::<SourceInfoConverter>(&c.source_info, ctx)?,
            validation: c.validation.clone(),
            version: None,
            pre_render_mako: None,
            is_meta: None,
            plugin_code: Some(c.plugin_code.clone()),
            extra_info: Some(c.extra_info.clone()),
            index: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Reconversion;

    #[test]
    fn source_info_groups_by_node_and_last_field_wins() {
        let infos = vec![
            SourceInfo { key: "n1".into(), value: "a".into() },
            SourceInfo { key: "n2".into(), value: "b".into() },
            SourceInfo { key: "n1".into(), value: "c".into() },
        ];
        let map = convert_with::<SourceInfoConverter>(&infos, &ConvertContext::default()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["n1"], vec!["c".to_string()]);
        assert_eq!(map["n2"], vec!["b".to_string()]);
    }

    #[test]
    fn source_info_reconvert_rejects_empty_entries() {
        let mut map = IndexMap::new();
        map.insert("n1".to_string(), Vec::new());
        let err = Reconversion::<SourceInfoConverter>::new(map).err().unwrap();
        assert_eq!(err.code, "C008");
        assert_eq!(err.node_id.as_deref(), Some("n1"));
    }
}
