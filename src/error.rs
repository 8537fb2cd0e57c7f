//! Unified conversion error type used across all pipeline phases.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Validate,
    Convert,
    Wire,
    Remap,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Validate => write!(f, "Validate"),
            Phase::Convert => write!(f, "Convert"),
            Phase::Wire => write!(f, "Wire"),
            Phase::Remap => write!(f, "Remap"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub node_id: Option<String>,
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(id) => write!(
                f,
                "[{}:{}] {} (node '{}')",
                self.phase, self.code, self.message, id
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for ConvertError {}

impl ConvertError {
    pub fn parse(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        ConvertError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            node_id,
        }
    }

    pub fn validate(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        ConvertError {
            code: code.into(),
            phase: Phase::Validate,
            message: message.into(),
            node_id,
        }
    }

    pub fn convert(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        ConvertError {
            code: code.into(),
            phase: Phase::Convert,
            message: message.into(),
            node_id,
        }
    }

    pub fn wire(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        ConvertError {
            code: code.into(),
            phase: Phase::Wire,
            message: message.into(),
            node_id,
        }
    }

    pub fn remap(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        ConvertError {
            code: code.into(),
            phase: Phase::Remap,
            message: message.into(),
            node_id,
        }
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(e: serde_json::Error) -> Self {
        ConvertError::parse("P001", format!("Invalid data model JSON: {}", e), None)
    }
}
