//! The persisted rule chain shape and its conversion to and from [`RuleGraph`].

use super::{ChainForward, ChainId, Edge, Node, RuleGraph};
use crate::error::GraphError;
use crate::registry::NodeRegistry;
use crate::relation::RelationResolver;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Complete rule chain as exchanged with the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleChainMetadata {
    #[serde(default, alias = "first_node_index")]
    pub first_node_index: Option<usize>,
    #[serde(default)]
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub connections: Vec<WireConnection>,
    #[serde(default, alias = "rule_chain_connections")]
    pub rule_chain_connections: Vec<WireChainConnection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", alias = "nodeType", alias = "node_type")]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub configuration: Value,
    #[serde(default, skip_serializing_if = "Value::is_null", alias = "additional_info")]
    pub additional_info: Value,
    #[serde(default, skip_serializing_if = "is_false", alias = "isExternal", alias = "is_external")]
    pub external: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireConnection {
    #[serde(alias = "from_index")]
    pub from_index: usize,
    #[serde(alias = "to_index")]
    pub to_index: usize,
    #[serde(rename = "type", default)]
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireChainConnection {
    #[serde(alias = "from_index")]
    pub from_index: usize,
    #[serde(alias = "target_rule_chain_id")]
    pub target_rule_chain_id: ChainId,
    #[serde(rename = "type", default)]
    pub relation: String,
    #[serde(default)]
    pub additional_info: Value,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RuleGraph {
    /// Builds a graph from persisted metadata. Every node configuration is
    /// normalized through its codec; connections are checked against the
    /// graph invariants.
    pub fn from_metadata(
        registry: Arc<NodeRegistry>,
        resolver: RelationResolver,
        metadata: RuleChainMetadata,
    ) -> Result<Self, GraphError> {
        let mut graph = RuleGraph::with_resolver(registry, resolver);

        for (position, wire) in metadata.nodes.into_iter().enumerate() {
            let configuration = graph.registry.normalize(&wire.node_type, &wire.configuration);
            graph.nodes.push(Node {
                id: wire.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                label: wire.name,
                node_type: wire.node_type,
                configuration,
                is_external: wire.external,
                // External nodes never become the root, as with `set_root`.
                is_root: !wire.external && metadata.first_node_index == Some(position),
                additional_info: wire.additional_info,
            });
        }
        graph.nodes_added = graph.nodes.len() as u64;

        for connection in metadata.connections {
            let source_id = graph.node_id_at(connection.from_index, connection.from_index)?;
            let target_id = graph.node_id_at(connection.from_index, connection.to_index)?;
            graph.connect(&source_id, &target_id, &connection.relation)?;
        }

        for connection in metadata.rule_chain_connections {
            let source_id = graph.node_id_at(connection.from_index, connection.from_index)?;
            graph.add_forward(
                &source_id,
                connection.target_rule_chain_id,
                &connection.relation,
                connection.additional_info,
            )?;
        }

        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            forwards = graph.forwards.len(),
            "Loaded rule chain"
        );
        Ok(graph)
    }

    /// Produces the persisted shape of the graph.
    pub fn to_metadata(&self) -> RuleChainMetadata {
        let positions: AHashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let nodes = self
            .nodes
            .iter()
            .map(|n| WireNode {
                id: Some(n.id.clone()),
                node_type: n.node_type.clone(),
                name: n.label.clone(),
                configuration: n.configuration.clone(),
                additional_info: n.additional_info.clone(),
                external: n.is_external,
            })
            .collect();

        let connections = self
            .edges
            .iter()
            .filter_map(|e: &Edge| {
                Some(WireConnection {
                    from_index: *positions.get(e.source_id.as_str())?,
                    to_index: *positions.get(e.target_id.as_str())?,
                    relation: e.effective_relation().to_string(),
                })
            })
            .collect();

        let rule_chain_connections = self
            .forwards
            .iter()
            .filter_map(|f: &ChainForward| {
                Some(WireChainConnection {
                    from_index: *positions.get(f.source_id.as_str())?,
                    target_rule_chain_id: f.target_chain_id.clone(),
                    relation: f.effective_relation().to_string(),
                    additional_info: f.additional_info.clone(),
                })
            })
            .collect();

        RuleChainMetadata {
            first_node_index: self.nodes.iter().position(|n| n.is_root),
            nodes,
            connections,
            rule_chain_connections,
        }
    }

    fn node_id_at(&self, from_index: usize, index: usize) -> Result<String, GraphError> {
        self.nodes
            .get(index)
            .map(|n| n.id.clone())
            .ok_or(GraphError::InvalidConnection {
                from_index,
                missing_index: index,
            })
    }
}
