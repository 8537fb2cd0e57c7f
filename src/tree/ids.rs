//! Id generation and the final id-uniqueness pass over a web pipeline tree.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::types::*;

/// Supplies pipeline-unique node and flow ids.
pub trait IdGenerator: Send + Sync {
    fn node_id(&self) -> String;
    fn line_id(&self) -> String;
}

/// Random 32-char ids: a kind prefix (`n` node, `l` line) plus 31 hex chars.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl UuidIdGenerator {
    fn with_prefix(prefix: char) -> String {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        format!("{}{}", prefix, &hex[1..])
    }
}

impl IdGenerator for UuidIdGenerator {
    fn node_id(&self) -> String {
        Self::with_prefix('n')
    }

    fn line_id(&self) -> String {
        Self::with_prefix('l')
    }
}

/// Deterministic ids drawn from one shared counter, for reproducible output.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_with_prefix(&self, prefix: char) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{:031}", prefix, n)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn node_id(&self) -> String {
        self.next_with_prefix('n')
    }

    fn line_id(&self) -> String {
        self.next_with_prefix('l')
    }
}

// =============================================================================
// replace_all_id
// =============================================================================

/// Assign a fresh id to every node and flow, rewriting all references to them.
pub fn replace_all_id(tree: WebPipelineTree, ids: &dyn IdGenerator) -> WebPipelineTree {
    let mut node_map: HashMap<String, String> = HashMap::new();
    node_map.insert(tree.start_event.id.clone(), ids.node_id());
    node_map.insert(tree.end_event.id.clone(), ids.node_id());
    for id in tree.activities.keys().chain(tree.gateways.keys()) {
        node_map.insert(id.clone(), ids.node_id());
    }
    let line_map: HashMap<String, String> = tree
        .flows
        .keys()
        .map(|id| (id.clone(), ids.line_id()))
        .collect();

    let nodes = Renamer { map: &node_map };
    let lines = Renamer { map: &line_map };

    let rename_event = |event: EventNode| EventNode {
        id: nodes.rename(&event.id),
        incoming: lines.endpoints(&event.incoming),
        outgoing: lines.endpoints(&event.outgoing),
        ..event
    };

    let activities = tree
        .activities
        .into_values()
        .map(|activity| {
            let activity = Activity {
                id: nodes.rename(&activity.id),
                incoming: lines.endpoints(&activity.incoming),
                outgoing: lines.endpoints(&activity.outgoing),
                ..activity
            };
            (activity.id.clone(), activity)
        })
        .collect();

    let gateways = tree
        .gateways
        .into_values()
        .map(|gateway| {
            let gateway = rename_gateway(gateway, &nodes, &lines);
            (gateway.id().to_string(), gateway)
        })
        .collect();

    let flows = tree
        .flows
        .into_values()
        .map(|flow| {
            let flow = crate::model::Flow {
                id: lines.rename(&flow.id),
                source: nodes.rename(&flow.source),
                target: nodes.rename(&flow.target),
                is_default: flow.is_default,
            };
            (flow.id.clone(), flow)
        })
        .collect();

    let constants = tree
        .constants
        .into_iter()
        .map(|(key, constant)| {
            let source_info = constant
                .source_info
                .into_iter()
                .map(|(node_id, fields)| (nodes.rename(&node_id), fields))
                .collect();
            (
                key,
                WebConstant {
                    source_info,
                    ..constant
                },
            )
        })
        .collect();

    WebPipelineTree {
        id: tree.id,
        name: tree.name,
        start_event: rename_event(tree.start_event),
        end_event: rename_event(tree.end_event),
        activities,
        gateways,
        flows,
        constants,
        outputs: tree.outputs,
    }
}

struct Renamer<'a> {
    map: &'a HashMap<String, String>,
}

impl Renamer<'_> {
    /// Ids outside the map (e.g. an empty, unwired slot) are kept as-is.
    fn rename(&self, id: &str) -> String {
        self.map.get(id).cloned().unwrap_or_else(|| id.to_string())
    }

    fn endpoints(&self, endpoints: &Endpoints) -> Endpoints {
        match endpoints {
            Endpoints::One(id) => Endpoints::One(self.rename(id)),
            Endpoints::Many(ids) => Endpoints::Many(ids.iter().map(|id| self.rename(id)).collect()),
        }
    }
}

fn rename_gateway(gateway: WebGateway, nodes: &Renamer, lines: &Renamer) -> WebGateway {
    match gateway {
        WebGateway::ParallelGateway(g) => WebGateway::ParallelGateway(ParallelGatewayData {
            id: nodes.rename(&g.id),
            incoming: lines.endpoints(&g.incoming),
            outgoing: lines.endpoints(&g.outgoing),
            converge_gateway_id: nodes.rename(&g.converge_gateway_id),
            ..g
        }),
        WebGateway::ExclusiveGateway(g) => {
            WebGateway::ExclusiveGateway(rename_branch_gateway(g, nodes, lines))
        }
        WebGateway::ConditionalParallelGateway(g) => {
            WebGateway::ConditionalParallelGateway(rename_branch_gateway(g, nodes, lines))
        }
        WebGateway::ConvergeGateway(g) => WebGateway::ConvergeGateway(ConvergeGatewayData {
            id: nodes.rename(&g.id),
            incoming: lines.endpoints(&g.incoming),
            outgoing: lines.endpoints(&g.outgoing),
            ..g
        }),
    }
}

fn rename_branch_gateway(
    g: BranchGatewayData,
    nodes: &Renamer,
    lines: &Renamer,
) -> BranchGatewayData {
    let conditions = match g.conditions {
        GatewayConditions::ByNode(list) => GatewayConditions::ByNode(
            list.into_iter()
                .map(|c| NodeCondition {
                    next_node: nodes.rename(&c.next_node),
                    ..c
                })
                .collect(),
        ),
        GatewayConditions::ByFlow(map) => GatewayConditions::ByFlow(
            map.into_iter()
                .map(|(flow_id, c)| (lines.rename(&flow_id), c))
                .collect::<IndexMap<_, _>>(),
        ),
    };
    let default_condition = g.default_condition.map(|d| match d {
        DefaultBranch::ByNode { name, next_node } => DefaultBranch::ByNode {
            name,
            next_node: nodes.rename(&next_node),
        },
        DefaultBranch::ByFlow { name, flow_id } => DefaultBranch::ByFlow {
            name,
            flow_id: lines.rename(&flow_id),
        },
    });

    BranchGatewayData {
        id: nodes.rename(&g.id),
        incoming: lines.endpoints(&g.incoming),
        outgoing: lines.endpoints(&g.outgoing),
        conditions,
        default_condition,
        converge_gateway_id: g.converge_gateway_id.map(|id| nodes.rename(&id)),
        ..g
    }
}
