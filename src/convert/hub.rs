//! Converter hub: a registry of named converters per `(source, target)` pair.
//!
//! Entries are type-erased over JSON values so converters can be looked up by
//! name at runtime. The process-wide hub is built eagerly, once, by
//! [`ConverterHub::global`].

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{ConvertContext, Conversion, Converter, DataType, json, web};
use crate::error::ConvertError;

pub type ErasedConvert = fn(Value, &ConvertContext) -> Result<Value, ConvertError>;

#[derive(Debug, Clone, Copy)]
pub struct ConverterEntry {
    pub name: &'static str,
    pub source: DataType,
    pub target: DataType,
    convert: ErasedConvert,
}

impl ConverterEntry {
    /// Deserialize `source`, validate, convert and serialize the result.
    pub fn convert(&self, source: Value, ctx: &ConvertContext) -> Result<Value, ConvertError> {
        (self.convert)(source, ctx)
    }
}

fn erased_convert<C>(source: Value, ctx: &ConvertContext) -> Result<Value, ConvertError>
where
    C: Converter,
    C::Source: DeserializeOwned,
    C::Target: Serialize,
{
    let source: C::Source = serde_json::from_value(source)?;
    let target = Conversion::<C>::with_context(source, ctx.clone())?.convert()?;
    serde_json::to_value(target).map_err(|e| {
        ConvertError::convert(
            "C001",
            format!("Converter '{}' produced unserializable output: {}", C::NAME, e),
            None,
        )
    })
}

#[derive(Debug, Default)]
pub struct ConverterHub {
    converters: HashMap<(DataType, DataType), BTreeMap<&'static str, ConverterEntry>>,
}

impl ConverterHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `C` under its name. Registering a name twice keeps the last one.
    pub fn register<C>(&mut self)
    where
        C: Converter,
        C::Source: DeserializeOwned,
        C::Target: Serialize,
    {
        let entry = ConverterEntry {
            name: C::NAME,
            source: C::SOURCE,
            target: C::TARGET,
            convert: erased_convert::<C>,
        };
        self.converters
            .entry((C::SOURCE, C::TARGET))
            .or_default()
            .insert(C::NAME, entry);
    }

    /// Register every converter shipped with this crate.
    pub fn register_all(&mut self) {
        self.register::<web::StartNodeConverter>();
        self.register::<web::EndNodeConverter>();
        self.register::<web::ComponentNodeConverter>();
        self.register::<web::ComponentConverter>();
        self.register::<web::ConditionConverter>();
        self.register::<web::ParallelGatewayConverter>();
        self.register::<web::ExclusiveGatewayConverter>();
        self.register::<web::ConditionalParallelGatewayConverter>();
        self.register::<web::ConvergeGatewayConverter>();
        self.register::<web::SourceInfoConverter>();
        self.register::<web::CustomConstantConverter>();
        self.register::<web::ComponentInputConverter>();
        self.register::<web::ComponentOutputConverter>();
        self.register::<web::PipelineConverter>();

        self.register::<json::StartNodeConverter>();
        self.register::<json::EndNodeConverter>();
        self.register::<json::ComponentNodeConverter>();
        self.register::<json::ComponentConverter>();
        self.register::<json::ConditionConverter>();
        self.register::<json::ParallelGatewayConverter>();
        self.register::<json::ExclusiveGatewayConverter>();
        self.register::<json::ConditionalParallelGatewayConverter>();
        self.register::<json::ConvergeGatewayConverter>();
        self.register::<json::SourceInfoConverter>();
        self.register::<json::CustomConstantConverter>();
        self.register::<json::ComponentInputConverter>();
        self.register::<json::ComponentOutputConverter>();
        self.register::<json::PipelineConverter>();
    }

    /// The process-wide hub, fully registered on first access.
    pub fn global() -> &'static ConverterHub {
        static HUB: OnceLock<ConverterHub> = OnceLock::new();
        HUB.get_or_init(|| {
            let mut hub = ConverterHub::new();
            hub.register_all();
            debug!(
                converters = hub.converters.values().map(BTreeMap::len).sum::<usize>(),
                "converter hub initialised"
            );
            hub
        })
    }

    /// All converters for a pair; empty when none are registered.
    pub fn get_converters(
        &self,
        source: DataType,
        target: DataType,
    ) -> impl Iterator<Item = &ConverterEntry> {
        self.converters
            .get(&(source, target))
            .into_iter()
            .flat_map(BTreeMap::values)
    }

    pub fn get_converter(
        &self,
        source: DataType,
        target: DataType,
        name: &str,
    ) -> Option<&ConverterEntry> {
        self.converters.get(&(source, target))?.get(name)
    }
}
