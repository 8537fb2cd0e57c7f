//! Data model types: the typed, validated intermediate representation of a
//! workflow graph.
//!
//! JSON produced by upstream request deserialization is turned into these types
//! by `convert::json`; `convert::web` turns them into a web pipeline tree.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// TYPE TAGS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    StartEvent,
    EndEvent,
    Component,
    ParallelGateway,
    ExclusiveGateway,
    ConditionalParallelGateway,
    ConvergeGateway,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::StartEvent,
        NodeType::EndEvent,
        NodeType::Component,
        NodeType::ParallelGateway,
        NodeType::ExclusiveGateway,
        NodeType::ConditionalParallelGateway,
        NodeType::ConvergeGateway,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::StartEvent => "start_event",
            NodeType::EndEvent => "end_event",
            NodeType::Component => "component",
            NodeType::ParallelGateway => "parallel_gateway",
            NodeType::ExclusiveGateway => "exclusive_gateway",
            NodeType::ConditionalParallelGateway => "conditional_parallel_gateway",
            NodeType::ConvergeGateway => "converge_gateway",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        NodeType::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    pub fn is_gateway(&self) -> bool {
        matches!(
            self,
            NodeType::ParallelGateway
                | NodeType::ExclusiveGateway
                | NodeType::ConditionalParallelGateway
                | NodeType::ConvergeGateway
        )
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstantType {
    #[serde(rename = "custom")]
    Custom,
    #[serde(rename = "component_inputs")]
    ComponentInputs,
    #[serde(rename = "component_outputs")]
    ComponentOutputs,
}

impl ConstantType {
    pub const ALL: [ConstantType; 3] = [
        ConstantType::Custom,
        ConstantType::ComponentInputs,
        ConstantType::ComponentOutputs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConstantType::Custom => "custom",
            ConstantType::ComponentInputs => "component_inputs",
            ConstantType::ComponentOutputs => "component_outputs",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        ConstantType::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl std::fmt::Display for ConstantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// NODES
// =============================================================================

/// Successor reference(s) of a node: a single id or an ordered list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Next {
    One(String),
    Many(Vec<String>),
}

impl Next {
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Next::One(id) => vec![id.as_str()],
            Next::Many(ids) => ids.iter().map(|s| s.as_str()).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.targets().contains(&id)
    }
}

impl From<&str> for Next {
    fn from(id: &str) -> Self {
        Next::One(id.to_string())
    }
}

impl From<Vec<&str>> for Next {
    fn from(ids: Vec<&str>) -> Self {
        Next::Many(ids.into_iter().map(String::from).collect())
    }
}

/// Tagged union over every node kind. The tag is serialized as `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "start_event")]
    StartEvent(EmptyStartNode),
    #[serde(rename = "end_event")]
    EndEvent(EmptyEndNode),
    #[serde(rename = "component")]
    Component(ComponentNode),
    #[serde(rename = "parallel_gateway")]
    ParallelGateway(ParallelGateway),
    #[serde(rename = "exclusive_gateway")]
    ExclusiveGateway(ExclusiveGateway),
    #[serde(rename = "conditional_parallel_gateway")]
    ConditionalParallelGateway(ConditionalParallelGateway),
    #[serde(rename = "converge_gateway")]
    ConvergeGateway(ConvergeGateway),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::StartEvent(n) => &n.id,
            Node::EndEvent(n) => &n.id,
            Node::Component(n) => &n.id,
            Node::ParallelGateway(n) => &n.id,
            Node::ExclusiveGateway(n) => &n.id,
            Node::ConditionalParallelGateway(n) => &n.id,
            Node::ConvergeGateway(n) => &n.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::StartEvent(n) => &n.name,
            Node::EndEvent(n) => &n.name,
            Node::Component(n) => &n.name,
            Node::ParallelGateway(n) => &n.name,
            Node::ExclusiveGateway(n) => &n.name,
            Node::ConditionalParallelGateway(n) => &n.name,
            Node::ConvergeGateway(n) => &n.name,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::StartEvent(_) => NodeType::StartEvent,
            Node::EndEvent(_) => NodeType::EndEvent,
            Node::Component(_) => NodeType::Component,
            Node::ParallelGateway(_) => NodeType::ParallelGateway,
            Node::ExclusiveGateway(_) => NodeType::ExclusiveGateway,
            Node::ConditionalParallelGateway(_) => NodeType::ConditionalParallelGateway,
            Node::ConvergeGateway(_) => NodeType::ConvergeGateway,
        }
    }

    /// End events never have successors.
    pub fn next(&self) -> Option<&Next> {
        match self {
            Node::StartEvent(n) => n.next.as_ref(),
            Node::EndEvent(_) => None,
            Node::Component(n) => n.next.as_ref(),
            Node::ParallelGateway(n) => n.next.as_ref(),
            Node::ExclusiveGateway(n) => n.next.as_ref(),
            Node::ConditionalParallelGateway(n) => n.next.as_ref(),
            Node::ConvergeGateway(n) => n.next.as_ref(),
        }
    }

    pub fn successors(&self) -> Vec<&str> {
        self.next().map(|n| n.targets()).unwrap_or_default()
    }

    pub fn is_gateway(&self) -> bool {
        self.node_type().is_gateway()
    }

    /// Branch conditions for gateways that carry them.
    pub fn branch_conditions(&self) -> Option<(&[Condition], Option<&DefaultCondition>)> {
        match self {
            Node::ExclusiveGateway(g) => Some((&g.conditions, g.default_condition.as_ref())),
            Node::ConditionalParallelGateway(g) => {
                Some((&g.conditions, g.default_condition.as_ref()))
            }
            _ => None,
        }
    }

    pub fn converge_gateway_id(&self) -> Option<&str> {
        match self {
            Node::ParallelGateway(g) => Some(&g.converge_gateway_id),
            Node::ConditionalParallelGateway(g) => Some(&g.converge_gateway_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyStartNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub next: Option<Next>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyEndNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub next: Option<Next>,
    pub component: Component,
    #[serde(default = "default_true")]
    pub skippable: bool,
    #[serde(default = "default_true")]
    pub retryable: bool,
    #[serde(default)]
    pub error_ignorable: bool,
    #[serde(default)]
    pub auto_retry: AutoRetryConfig,
    #[serde(default)]
    pub timeout_config: TimeoutConfig,
}

impl ComponentNode {
    /// A component node with every optional setting at its default.
    pub fn new(id: impl Into<String>, component: Component) -> Self {
        ComponentNode {
            id: id.into(),
            name: String::new(),
            next: None,
            component,
            skippable: true,
            retryable: true,
            error_ignorable: false,
            auto_retry: AutoRetryConfig::default(),
            timeout_config: TimeoutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub code: String,
    pub version: String,
    #[serde(default)]
    pub data: Vec<ComponentField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentField {
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default = "default_true")]
    pub need_render: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoRetryConfig {
    pub enable: bool,
    pub interval: u64,
    pub times: u64,
}

impl Default for AutoRetryConfig {
    fn default() -> Self {
        AutoRetryConfig {
            enable: false,
            interval: 0,
            times: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub enable: bool,
    pub seconds: u64,
    pub action: String,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        TimeoutConfig {
            enable: false,
            seconds: 10,
            action: "forced_fail".into(),
        }
    }
}

// =============================================================================
// GATEWAYS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelGateway {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub next: Option<Next>,
    pub converge_gateway_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusiveGateway {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub next: Option<Next>,
    #[serde(default = "default_lang")]
    pub lang: String,
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_condition: Option<DefaultCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalParallelGateway {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub next: Option<Next>,
    #[serde(default = "default_lang")]
    pub lang: String,
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_condition: Option<DefaultCondition>,
    pub converge_gateway_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergeGateway {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub next: Option<Next>,
}

/// A gateway branch, addressed by the id of the node it leads to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub name: String,
    pub expr: String,
    #[serde(alias = "next")]
    pub next_node: String,
}

impl Condition {
    pub fn new(name: impl Into<String>, expr: impl Into<String>, next_node: impl Into<String>) -> Self {
        Condition {
            name: name.into(),
            expr: expr.into(),
            next_node: next_node.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultCondition {
    #[serde(default)]
    pub name: String,
    #[serde(alias = "next")]
    pub next_node: String,
}

// =============================================================================
// FLOWS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub is_default: bool,
}

// =============================================================================
// CONSTANTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub key: String,
    pub value: String,
}

/// Tagged union over constant kinds. The tag is serialized as `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Constant {
    #[serde(rename = "custom")]
    Custom(CustomConstant),
    #[serde(rename = "component_inputs")]
    ComponentInputs(ComponentInputConstant),
    #[serde(rename = "component_outputs")]
    ComponentOutputs(ComponentOutputConstant),
}

impl Constant {
    pub fn key(&self) -> &str {
        match self {
            Constant::Custom(c) => &c.key,
            Constant::ComponentInputs(c) => &c.key,
            Constant::ComponentOutputs(c) => &c.key,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Constant::Custom(c) => &c.name,
            Constant::ComponentInputs(c) => &c.name,
            Constant::ComponentOutputs(c) => &c.name,
        }
    }

    pub fn constant_type(&self) -> ConstantType {
        match self {
            Constant::Custom(_) => ConstantType::Custom,
            Constant::ComponentInputs(_) => ConstantType::ComponentInputs,
            Constant::ComponentOutputs(_) => ConstantType::ComponentOutputs,
        }
    }
}

/// Strip the `${...}` reference wrapper from a constant key, if present.
pub fn bare_key(key: &str) -> &str {
    key.strip_prefix("${")
        .and_then(|k| k.strip_suffix('}'))
        .unwrap_or(key)
}

/// Wrap a constant key as a `${...}` reference. Already-wrapped keys are kept.
pub fn reference_key(key: &str) -> String {
    format!("${{{}}}", bare_key(key))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomConstant {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default = "default_show")]
    pub show_type: String,
    #[serde(default)]
    pub validation: String,
    pub custom_type: String,
    #[serde(default)]
    pub source_info: Vec<SourceInfo>,
    pub source_tag: String,
    #[serde(default)]
    pub pre_render_mako: bool,
    #[serde(default)]
    pub is_meta: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInputConstant {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default = "default_show")]
    pub show_type: String,
    #[serde(default)]
    pub validation: String,
    #[serde(default)]
    pub custom_type: String,
    #[serde(default)]
    pub source_info: Vec<SourceInfo>,
    pub source_tag: String,
    #[serde(default)]
    pub plugin_code: String,
    #[serde(default)]
    pub extra_info: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentOutputConstant {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default = "default_hide")]
    pub show_type: String,
    #[serde(default)]
    pub validation: String,
    #[serde(default)]
    pub custom_type: String,
    #[serde(default)]
    pub source_info: Vec<SourceInfo>,
    #[serde(default)]
    pub source_tag: String,
    #[serde(default)]
    pub plugin_code: String,
    #[serde(default)]
    pub extra_info: Value,
}

// =============================================================================
// PIPELINE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Extensions {
    pub nodes: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub constants: Vec<Constant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}

impl Pipeline {
    pub fn new(id: impl Into<String>, name: impl Into<String>, nodes: Vec<Node>) -> Self {
        Pipeline {
            id: id.into(),
            name: name.into(),
            nodes,
            constants: Vec::new(),
            extensions: None,
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.node_type() == node_type)
    }
}

fn default_true() -> bool {
    true
}

fn default_lang() -> String {
    "boolrule".into()
}

fn default_version() -> String {
    "legacy".into()
}

fn default_show() -> String {
    "show".into()
}

fn default_hide() -> String {
    "hide".into()
}
