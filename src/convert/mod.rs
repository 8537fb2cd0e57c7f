//! Converter contract.
//!
//! A converter is a stateless unit turning one `Source` value into one `Target`
//! value between two [`DataType`]s. [`Conversion`] is the single-shot state
//! object: constructing it runs every validator, consuming it converts.

pub mod hub;
pub mod json;
pub mod web;

use std::fmt;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::ConvertError;
use crate::tree::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
use crate::validate::Validator;

pub use hub::{ConverterEntry, ConverterHub};

/// The shape a converter reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    Json,
    DataModel,
    WebPipeline,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Json => "json",
            DataType::DataModel => "data_model",
            DataType::WebPipeline => "web_pipeline",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a conversion may consult besides its source data.
#[derive(Clone)]
pub struct ConvertContext {
    pub settings: Arc<Settings>,
    pub ids: Arc<dyn IdGenerator>,
}

impl ConvertContext {
    pub fn new(settings: Settings, ids: Arc<dyn IdGenerator>) -> Self {
        ConvertContext {
            settings: Arc::new(settings),
            ids,
        }
    }

    /// Default settings with sequential ids, for reproducible output.
    pub fn deterministic() -> Self {
        Self::new(Settings::default(), Arc::new(SequentialIdGenerator::new()))
    }
}

impl Default for ConvertContext {
    fn default() -> Self {
        Self::new(Settings::default(), Arc::new(UuidIdGenerator))
    }
}

impl fmt::Debug for ConvertContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

pub type Validators<T> = Vec<Box<dyn Validator<T>>>;

pub trait Converter {
    type Source: 'static;
    type Target: 'static;

    const SOURCE: DataType;
    const TARGET: DataType;
    /// Name the hub registers this converter under.
    const NAME: &'static str;

    /// Checks run, in order, before `convert`. The first failure aborts.
    fn validators(_settings: &Settings) -> Validators<Self::Source> {
        Vec::new()
    }

    fn convert(source: &Self::Source, ctx: &ConvertContext) -> Result<Self::Target, ConvertError>;
}

/// A converter that can also run backwards, with its own validators.
pub trait BiConverter: Converter {
    fn reverse_validators(_settings: &Settings) -> Validators<Self::Target> {
        Vec::new()
    }

    fn reconvert(target: &Self::Target, ctx: &ConvertContext)
        -> Result<Self::Source, ConvertError>;
}

fn run_validators<T>(validators: &[Box<dyn Validator<T>>], data: &T) -> Result<(), ConvertError> {
    validators.iter().try_for_each(|v| v.validate(data))
}

/// A validated, not yet converted, source value.
pub struct Conversion<C: Converter> {
    source: C::Source,
    ctx: ConvertContext,
}

impl<C: Converter> Conversion<C> {
    pub fn new(source: C::Source) -> Result<Self, ConvertError> {
        Self::with_context(source, ConvertContext::default())
    }

    pub fn with_context(source: C::Source, ctx: ConvertContext) -> Result<Self, ConvertError> {
        run_validators(&C::validators(&ctx.settings), &source)?;
        Ok(Conversion { source, ctx })
    }

    pub fn source(&self) -> &C::Source {
        &self.source
    }

    pub fn convert(self) -> Result<C::Target, ConvertError> {
        C::convert(&self.source, &self.ctx)
    }
}

/// Reverse counterpart of [`Conversion`].
pub struct Reconversion<C: BiConverter> {
    target: C::Target,
    ctx: ConvertContext,
}

impl<C: BiConverter> Reconversion<C> {
    pub fn new(target: C::Target) -> Result<Self, ConvertError> {
        Self::with_context(target, ConvertContext::default())
    }

    pub fn with_context(target: C::Target, ctx: ConvertContext) -> Result<Self, ConvertError> {
        run_validators(&C::reverse_validators(&ctx.settings), &target)?;
        Ok(Reconversion { target, ctx })
    }

    pub fn reconvert(self) -> Result<C::Source, ConvertError> {
        C::reconvert(&self.target, &self.ctx)
    }
}

/// Validate and convert in one call.
pub fn convert_with<C: Converter>(
    source: &C::Source,
    ctx: &ConvertContext,
) -> Result<C::Target, ConvertError> {
    run_validators(&C::validators(&ctx.settings), source)?;
    C::convert(source, ctx)
}
