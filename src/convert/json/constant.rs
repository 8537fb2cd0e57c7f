use serde_json::Value;

use crate::config::Settings;
use crate::convert::{ConvertContext, Converter, DataType, Validators, convert_with};
use crate::error::ConvertError;
use crate::model::{
    ComponentInputConstant, ComponentOutputConstant, Constant, ConstantType, CustomConstant,
    SourceInfo,
};
use crate::validate::{JsonComponentInputValidator, JsonCustomConstantValidator, JsonTypeTagValidator};

use super::{apply_optional, required};

pub struct SourceInfoConverter;

impl Converter for SourceInfoConverter {
    type Source = Value;
    type Target = Vec<SourceInfo>;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "SourceInfoConverter";

    fn convert(source: &Value, _ctx: &ConvertContext) -> Result<Vec<SourceInfo>, ConvertError> {
        let entries = source
            .as_array()
            .ok_or_else(|| ConvertError::parse("P001", "Constant source_info must be a list", None))?;
        entries
            .iter()
            .map(|info| {
                Ok(SourceInfo {
                    key: required(info, "key")?,
                    value: required(info, "value")?,
                })
            })
            .collect()
    }
}

fn read_source_info(source: &Value, ctx: &ConvertContext) -> Result<Vec<SourceInfo>, ConvertError> {
    let infos: Value = required(source, "source_info")?;
    convert_with::<SourceInfoConverter>(&infos, ctx)
}

pub struct CustomConstantConverter;

impl Converter for CustomConstantConverter {
    type Source = Value;
    type Target = Constant;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "CustomConstantConverter";

    fn validators(settings: &Settings) -> Validators<Value> {
        vec![
            Box::new(JsonTypeTagValidator::new(ConstantType::Custom.as_str())),
            Box::new(JsonCustomConstantValidator::new(settings.constants.clone())),
        ]
    }

    fn convert(source: &Value, ctx: &ConvertContext) -> Result<Constant, ConvertError> {
        let mut constant = CustomConstant {
            name: required(source, "name")?,
            key: required(source, "key")?,
            value: required(source, "value")?,
            version: "legacy".into(),
            desc: String::new(),
            show_type: "show".into(),
            validation: String::new(),
            custom_type: required(source, "custom_type")?,
            source_info: read_source_info(source, ctx)?,
            source_tag: required(source, "source_tag")?,
            pre_render_mako: false,
            is_meta: false,
        };
        apply_optional(source, "desc", &mut constant.desc)?;
        apply_optional(source, "validation", &mut constant.validation)?;
        apply_optional(source, "is_meta", &mut constant.is_meta)?;
        apply_optional(source, "version", &mut constant.version)?;
        apply_optional(source, "show_type", &mut constant.show_type)?;
        apply_optional(source, "pre_render_mako", &mut constant.pre_render_mako)?;
        Ok(Constant::Custom(constant))
    }
}

pub struct ComponentInputConverter;

impl Converter for ComponentInputConverter {
    type Source = Value;
    type Target = Constant;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "ComponentInputConverter";

    fn validators(_settings: &Settings) -> Validators<Value> {
        vec![
            Box::new(JsonTypeTagValidator::new(ConstantType::ComponentInputs.as_str())),
            Box::new(JsonComponentInputValidator),
        ]
    }

    fn convert(source: &Value, ctx: &ConvertContext) -> Result<Constant, ConvertError> {
        let mut constant = ComponentInputConstant {
            name: required(source, "name")?,
            key: required(source, "key")?,
            value: required(source, "value")?,
            version: required(source, "version")?,
            desc: String::new(),
            show_type: "show".into(),
            validation: String::new(),
            custom_type: required(source, "custom_type")?,
            source_info: read_source_info(source, ctx)?,
            source_tag: required(source, "source_tag")?,
            plugin_code: String::new(),
            extra_info: required(source, "extra_info")?,
        };
        apply_optional(source, "desc", &mut constant.desc)?;
        apply_optional(source, "validation", &mut constant.validation)?;
        apply_optional(source, "show_type", &mut constant.show_type)?;
        apply_optional(source, "plugin_code", &mut constant.plugin_code)?;
        Ok(Constant::ComponentInputs(constant))
    }
}

pub struct ComponentOutputConverter;

impl Converter for ComponentOutputConverter {
    type Source = Value;
    type Target = Constant;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "ComponentOutputConverter";

    fn validators(_settings: &Settings) -> Validators<Value> {
        vec![Box::new(JsonTypeTagValidator::new(
            ConstantType::ComponentOutputs.as_str(),
        ))]
    }

    fn convert(source: &Value, ctx: &ConvertContext) -> Result<Constant, ConvertError> {
        let mut constant = ComponentOutputConstant {
            name: required(source, "name")?,
            key: required(source, "key")?,
            value: required(source, "value")?,
            version: "legacy".into(),
            desc: String::new(),
            show_type: "hide".into(),
            validation: String::new(),
            custom_type: required(source, "custom_type")?,
            source_info: read_source_info(source, ctx)?,
            source_tag: required(source, "source_tag")?,
            plugin_code: String::new(),
            extra_info: required(source, "extra_info")?,
        };
        apply_optional(source, "desc", &mut constant.desc)?;
        apply_optional(source, "validation", &mut constant.validation)?;
        apply_optional(source, "show_type", &mut constant.show_type)?;
        apply_optional(source, "plugin_code", &mut constant.plugin_code)?;
        Ok(Constant::ComponentOutputs(constant))
    }
}
