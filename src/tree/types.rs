//! Web pipeline tree: the flattened, id-keyed shape handed to the execution
//! engine's validator.
//!
//! Every activity, gateway and event carries `incoming`/`outgoing` flow ids.
//! Whether a side holds one id or a list is decided by the node kind, not by
//! fan-in/fan-out, so both shapes are modelled by `Endpoints`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{AutoRetryConfig, ConstantType, Flow, TimeoutConfig};

pub const EMPTY_START_EVENT: &str = "EmptyStartEvent";
pub const EMPTY_END_EVENT: &str = "EmptyEndEvent";
pub const SERVICE_ACTIVITY: &str = "ServiceActivity";

// =============================================================================
// TOP-LEVEL TREE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebPipelineTree {
    pub id: String,
    pub name: String,
    pub start_event: EventNode,
    pub end_event: EventNode,
    pub activities: IndexMap<String, Activity>,
    pub gateways: IndexMap<String, WebGateway>,
    pub flows: IndexMap<String, Flow>,
    pub constants: IndexMap<String, WebConstant>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSide {
    Incoming,
    Outgoing,
}

impl std::fmt::Display for EndpointSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointSide::Incoming => write!(f, "incoming"),
            EndpointSide::Outgoing => write!(f, "outgoing"),
        }
    }
}

impl WebPipelineTree {
    /// Look up the `incoming` or `outgoing` field of any node in the tree.
    pub fn endpoints_mut(&mut self, node_id: &str, side: EndpointSide) -> Option<&mut Endpoints> {
        if self.activities.contains_key(node_id) {
            return self.activities.get_mut(node_id).map(|a| a.side_mut(side));
        }
        if self.gateways.contains_key(node_id) {
            return self.gateways.get_mut(node_id).map(|g| g.side_mut(side));
        }
        if self.start_event.id == node_id {
            return Some(self.start_event.side_mut(side));
        }
        if self.end_event.id == node_id {
            return Some(self.end_event.side_mut(side));
        }
        None
    }

    pub fn endpoints(&self, node_id: &str, side: EndpointSide) -> Option<&Endpoints> {
        let (incoming, outgoing) = if let Some(a) = self.activities.get(node_id) {
            (&a.incoming, &a.outgoing)
        } else if let Some(g) = self.gateways.get(node_id) {
            (g.incoming(), g.outgoing())
        } else if self.start_event.id == node_id {
            (&self.start_event.incoming, &self.start_event.outgoing)
        } else if self.end_event.id == node_id {
            (&self.end_event.incoming, &self.end_event.outgoing)
        } else {
            return None;
        };
        Some(match side {
            EndpointSide::Incoming => incoming,
            EndpointSide::Outgoing => outgoing,
        })
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.activities.contains_key(node_id)
            || self.gateways.contains_key(node_id)
            || self.start_event.id == node_id
            || self.end_event.id == node_id
    }
}

// =============================================================================
// ENDPOINTS
// =============================================================================

/// A node's flow references on one side: a single id (empty until wired) or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoints {
    One(String),
    Many(Vec<String>),
}

impl Endpoints {
    pub fn one() -> Self {
        Endpoints::One(String::new())
    }

    pub fn many() -> Self {
        Endpoints::Many(Vec::new())
    }

    /// Lists collect every flow id; a single slot keeps the latest one.
    pub fn attach(&mut self, flow_id: &str) {
        match self {
            Endpoints::Many(ids) => ids.push(flow_id.to_string()),
            Endpoints::One(id) => *id = flow_id.to_string(),
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        match self {
            Endpoints::One(id) if id.is_empty() => vec![],
            Endpoints::One(id) => vec![id.as_str()],
            Endpoints::Many(ids) => ids.iter().map(|s| s.as_str()).collect(),
        }
    }
}

// =============================================================================
// EVENTS + ACTIVITIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub incoming: Endpoints,
    pub outgoing: Endpoints,
}

impl EventNode {
    fn side_mut(&mut self, side: EndpointSide) -> &mut Endpoints {
        match side {
            EndpointSide::Incoming => &mut self.incoming,
            EndpointSide::Outgoing => &mut self.outgoing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub optional: bool,
    pub incoming: Endpoints,
    pub outgoing: Endpoints,
    pub component: WebComponent,
    pub error_ignorable: bool,
    pub skippable: bool,
    pub retryable: bool,
    pub auto_retry: AutoRetryConfig,
    pub timeout_config: TimeoutConfig,
}

impl Activity {
    fn side_mut(&mut self, side: EndpointSide) -> &mut Endpoints {
        match side {
            EndpointSide::Incoming => &mut self.incoming,
            EndpointSide::Outgoing => &mut self.outgoing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebComponent {
    pub code: String,
    pub version: String,
    pub data: IndexMap<String, WebComponentField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebComponentField {
    pub hook: bool,
    pub need_render: bool,
    pub value: Value,
}

// =============================================================================
// GATEWAYS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebGateway {
    ParallelGateway(ParallelGatewayData),
    ExclusiveGateway(BranchGatewayData),
    ConditionalParallelGateway(BranchGatewayData),
    ConvergeGateway(ConvergeGatewayData),
}

impl WebGateway {
    pub fn id(&self) -> &str {
        match self {
            WebGateway::ParallelGateway(g) => &g.id,
            WebGateway::ExclusiveGateway(g) => &g.id,
            WebGateway::ConditionalParallelGateway(g) => &g.id,
            WebGateway::ConvergeGateway(g) => &g.id,
        }
    }

    pub fn incoming(&self) -> &Endpoints {
        match self {
            WebGateway::ParallelGateway(g) => &g.incoming,
            WebGateway::ExclusiveGateway(g) => &g.incoming,
            WebGateway::ConditionalParallelGateway(g) => &g.incoming,
            WebGateway::ConvergeGateway(g) => &g.incoming,
        }
    }

    pub fn outgoing(&self) -> &Endpoints {
        match self {
            WebGateway::ParallelGateway(g) => &g.outgoing,
            WebGateway::ExclusiveGateway(g) => &g.outgoing,
            WebGateway::ConditionalParallelGateway(g) => &g.outgoing,
            WebGateway::ConvergeGateway(g) => &g.outgoing,
        }
    }

    /// The branch data of exclusive and conditional parallel gateways.
    pub fn branches(&self) -> Option<&BranchGatewayData> {
        match self {
            WebGateway::ExclusiveGateway(g) | WebGateway::ConditionalParallelGateway(g) => Some(g),
            _ => None,
        }
    }

    fn side_mut(&mut self, side: EndpointSide) -> &mut Endpoints {
        let (incoming, outgoing) = match self {
            WebGateway::ParallelGateway(g) => (&mut g.incoming, &mut g.outgoing),
            WebGateway::ExclusiveGateway(g) => (&mut g.incoming, &mut g.outgoing),
            WebGateway::ConditionalParallelGateway(g) => (&mut g.incoming, &mut g.outgoing),
            WebGateway::ConvergeGateway(g) => (&mut g.incoming, &mut g.outgoing),
        };
        match side {
            EndpointSide::Incoming => incoming,
            EndpointSide::Outgoing => outgoing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelGatewayData {
    pub id: String,
    pub name: String,
    pub incoming: Endpoints,
    pub outgoing: Endpoints,
    pub converge_gateway_id: String,
}

/// Shared shape of exclusive and conditional parallel gateways.
/// Only the conditional parallel variant carries `converge_gateway_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchGatewayData {
    pub id: String,
    pub name: String,
    pub incoming: Endpoints,
    pub outgoing: Endpoints,
    pub conditions: GatewayConditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_condition: Option<DefaultBranch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converge_gateway_id: Option<String>,
    pub extra_info: GatewayExtraInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergeGatewayData {
    pub id: String,
    pub name: String,
    pub incoming: Endpoints,
    pub outgoing: Endpoints,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayExtraInfo {
    pub parse_lang: String,
}

/// Gateway conditions before (`ByNode`) and after (`ByFlow`) flow remapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GatewayConditions {
    ByNode(Vec<NodeCondition>),
    ByFlow(IndexMap<String, FlowCondition>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCondition {
    pub name: String,
    pub evaluate: String,
    pub next_node: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowCondition {
    pub name: String,
    pub evaluate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultBranch {
    ByNode { name: String, next_node: String },
    ByFlow { name: String, flow_id: String },
}

// =============================================================================
// CONSTANTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebConstant {
    pub name: String,
    pub key: String,
    pub desc: String,
    pub value: Value,
    pub custom_type: String,
    pub show_type: String,
    pub source_tag: String,
    pub source_type: ConstantType,
    /// Node id → field keys of that node bound to this constant.
    pub source_info: IndexMap<String, Vec<String>>,
    pub validation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_render_mako: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_meta: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<Value>,
    /// Position in the source constant list; drives UI ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}
