//! The rule chain aggregate: nodes, relation edges and forwards into other
//! rule chains.
//!
//! Invariants held by every mutation:
//! - labels of outgoing connections (edges and forwards together) are unique
//!   per source node, with an empty label counting as [`DEFAULT_RELATION`];
//! - at most one node is the root;
//! - no edge or forward references a node that is not in the graph.
//!
//! [`DEFAULT_RELATION`]: crate::relation::DEFAULT_RELATION

use crate::config::{NodeConfig, parse_config_text};
use crate::error::GraphError;
use crate::registry::NodeRegistry;
use crate::relation::{ConnectionRef, RelationOption, RelationResolver, normalize_relation};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

mod wire;

pub use wire::{RuleChainMetadata, WireChainConnection, WireConnection, WireNode};

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub node_type: String,
    /// Canonical configuration object for `node_type`.
    pub configuration: Value,
    /// Read-only reference into another rule chain.
    pub is_external: bool,
    pub is_root: bool,
    pub additional_info: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    /// Empty means the default relation.
    pub relation: String,
}

impl Edge {
    pub fn effective_relation(&self) -> &str {
        normalize_relation(&self.relation)
    }
}

/// Target rule chain of a forward; stored ids may be numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainId::Numeric(id) => write!(f, "{}", id),
            ChainId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for ChainId {
    fn from(id: i64) -> Self {
        ChainId::Numeric(id)
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        ChainId::Text(id.to_string())
    }
}

/// An outgoing connection into a different rule chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainForward {
    /// Stable position key; never reused within a graph.
    pub index: u32,
    pub source_id: String,
    pub target_chain_id: ChainId,
    pub relation: String,
    /// Kept verbatim.
    pub additional_info: Value,
}

impl ChainForward {
    pub fn effective_relation(&self) -> &str {
        normalize_relation(&self.relation)
    }
}

pub struct RuleGraph {
    registry: Arc<NodeRegistry>,
    resolver: RelationResolver,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    forwards: Vec<ChainForward>,
    next_forward_index: u32,
    nodes_added: u64,
    forward_edit: Option<u32>,
}

impl RuleGraph {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self::with_resolver(registry, RelationResolver::default())
    }

    pub fn with_resolver(registry: Arc<NodeRegistry>, resolver: RelationResolver) -> Self {
        Self {
            registry,
            resolver,
            nodes: Vec::new(),
            edges: Vec::new(),
            forwards: Vec::new(),
            next_forward_index: 0,
            nodes_added: 0,
            forward_edit: None,
        }
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &RelationResolver {
        &self.resolver
    }

    // --- Queries ---

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn forwards(&self) -> &[ChainForward] {
        &self.forwards
    }

    pub fn edge(&self, edge_id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == edge_id)
    }

    pub fn forward(&self, index: u32) -> Option<&ChainForward> {
        self.forwards.iter().find(|f| f.index == index)
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_root)
    }

    pub fn node_label(&self, node_id: &str) -> Option<&str> {
        self.node(node_id).map(|n| n.label.as_str())
    }

    /// Nodes the user may select and edit; external references are hidden.
    pub fn editable_nodes(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| !n.is_external).collect()
    }

    /// Outgoing edges of `node_id` in creation order.
    pub fn outgoing_edges(&self, node_id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.source_id == node_id).collect()
    }

    pub fn outgoing_forwards(&self, node_id: &str) -> Vec<&ChainForward> {
        self.forwards
            .iter()
            .filter(|f| f.source_id == node_id)
            .collect()
    }

    /// Decodes the configuration of `node_id` into a typed record.
    pub fn node_config<T: NodeConfig>(&self, node_id: &str) -> Option<T> {
        self.node(node_id).map(|n| T::decode(&n.configuration))
    }

    /// Current script expression of `node_id`, for node types with an
    /// expression slot.
    pub fn node_expression(&self, node_id: &str) -> Option<&str> {
        let node = self.node(node_id)?;
        let slot = self.registry.get(&node.node_type).expression?;
        node.configuration.get(slot.field).and_then(Value::as_str)
    }

    /// Labels taken by connections leaving `source_id`, excluding `editing`.
    /// Derived from current state on every call.
    pub fn used_relations(
        &self,
        source_id: &str,
        editing: Option<&ConnectionRef>,
    ) -> AHashSet<String> {
        let edges = self
            .edges
            .iter()
            .filter(|e| e.source_id == source_id)
            .filter(|e| !matches!(editing, Some(ConnectionRef::Edge(id)) if *id == e.id))
            .map(|e| e.effective_relation().to_string());
        let forwards = self
            .forwards
            .iter()
            .filter(|f| f.source_id == source_id)
            .filter(|f| !matches!(editing, Some(ConnectionRef::Forward(index)) if *index == f.index))
            .map(|f| f.effective_relation().to_string());
        edges.chain(forwards).collect()
    }

    /// Relations `source_id` may use, with the ones already taken flagged.
    pub fn relation_options(
        &self,
        source_id: &str,
        editing: Option<&ConnectionRef>,
    ) -> Result<Vec<RelationOption>, GraphError> {
        let node = self.require_node(source_id)?;
        let spec = self.registry.get(&node.node_type);
        let used = self.used_relations(source_id, editing);
        Ok(self
            .resolver
            .options(&spec.relations, &node.configuration, &used))
    }

    // --- Node mutations ---

    /// Adds a node with the default label and configuration of `node_type`.
    /// The first node ever added to the graph becomes its root.
    pub fn add_node(&mut self, node_type: &str) -> &Node {
        let spec = self.registry.get(node_type);
        let node = Node {
            id: Uuid::new_v4().to_string(),
            label: spec.label.clone(),
            node_type: node_type.to_string(),
            configuration: spec.default_configuration(),
            is_external: false,
            is_root: self.nodes_added == 0,
            additional_info: Value::Null,
        };
        self.nodes_added += 1;
        debug!(node_id = %node.id, node_type, "Added node");
        self.nodes.push(node);
        &self.nodes[self.nodes.len() - 1]
    }

    /// Makes `node_id` the only root. Returns `false` without changing
    /// anything when the node is missing or external.
    pub fn set_root(&mut self, node_id: &str) -> bool {
        match self.node(node_id) {
            Some(node) if !node.is_external => {}
            _ => return false,
        }
        for node in &mut self.nodes {
            node.is_root = node.id == node_id;
        }
        true
    }

    pub fn rename_node(&mut self, node_id: &str, label: impl Into<String>) -> Result<(), GraphError> {
        let node = self.editable_node_mut(node_id)?;
        node.label = label.into();
        Ok(())
    }

    /// Changes the type of a node. Its configuration is reset to the new
    /// type's defaults.
    pub fn set_node_type(&mut self, node_id: &str, node_type: &str) -> Result<(), GraphError> {
        let defaults = self.registry.get(node_type).default_configuration();
        let node = self.editable_node_mut(node_id)?;
        node.node_type = node_type.to_string();
        node.configuration = defaults;
        debug!(node_id, node_type, "Changed node type");
        Ok(())
    }

    /// Stores `raw` after normalizing it through the node type's codec.
    pub fn set_configuration(&mut self, node_id: &str, raw: &Value) -> Result<(), GraphError> {
        let node_type = self.require_node(node_id)?.node_type.clone();
        let normalized = self.registry.normalize(&node_type, raw);
        self.editable_node_mut(node_id)?.configuration = normalized;
        Ok(())
    }

    /// Parses configuration text typed into the raw editor and stores it.
    /// Returns the inline warning when the text could not be used.
    pub fn set_configuration_text(
        &mut self,
        node_id: &str,
        text: &str,
    ) -> Result<Option<String>, GraphError> {
        let parsed = parse_config_text(text);
        self.set_configuration(node_id, &parsed.value)?;
        Ok(parsed.warning)
    }

    /// Removes a node together with every edge touching it and every forward
    /// leaving it.
    pub fn delete_node(&mut self, node_id: &str) -> Result<Node, GraphError> {
        let position = self
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        let node = self.nodes.remove(position);

        self.edges
            .retain(|e| e.source_id != node_id && e.target_id != node_id);
        self.forwards.retain(|f| f.source_id != node_id);
        if let Some(index) = self.forward_edit {
            if self.forward(index).is_none() {
                self.forward_edit = None;
            }
        }

        debug!(node_id, "Deleted node");
        Ok(node)
    }

    // --- Edge mutations ---

    pub fn connect(
        &mut self,
        source_id: &str,
        target_id: &str,
        relation: &str,
    ) -> Result<&Edge, GraphError> {
        self.require_node(source_id)?;
        self.require_node(target_id)?;
        self.ensure_relation_free(source_id, relation, None)?;

        let edge = Edge {
            id: Uuid::new_v4().to_string(),
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            relation: relation.to_string(),
        };
        debug!(edge_id = %edge.id, source_id, target_id, relation, "Connected nodes");
        self.edges.push(edge);
        Ok(&self.edges[self.edges.len() - 1])
    }

    pub fn relabel_edge(&mut self, edge_id: &str, relation: &str) -> Result<(), GraphError> {
        let source_id = self
            .edge(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?
            .source_id
            .clone();
        self.ensure_relation_free(
            &source_id,
            relation,
            Some(&ConnectionRef::Edge(edge_id.to_string())),
        )?;
        if let Some(edge) = self.edges.iter_mut().find(|e| e.id == edge_id) {
            edge.relation = relation.to_string();
        }
        Ok(())
    }

    pub fn delete_edge(&mut self, edge_id: &str) -> Result<Edge, GraphError> {
        let position = self
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;
        Ok(self.edges.remove(position))
    }

    // --- Chain forwards ---

    pub fn add_forward(
        &mut self,
        source_id: &str,
        target_chain_id: ChainId,
        relation: &str,
        additional_info: Value,
    ) -> Result<&ChainForward, GraphError> {
        self.require_node(source_id)?;
        self.ensure_relation_free(source_id, relation, None)?;

        let forward = ChainForward {
            index: self.next_forward_index,
            source_id: source_id.to_string(),
            target_chain_id,
            relation: relation.to_string(),
            additional_info,
        };
        self.next_forward_index += 1;
        debug!(index = forward.index, source_id, target_chain = %forward.target_chain_id, "Added chain forward");
        self.forwards.push(forward);
        Ok(&self.forwards[self.forwards.len() - 1])
    }

    pub fn delete_forward(&mut self, index: u32) -> Result<ChainForward, GraphError> {
        let position = self
            .forwards
            .iter()
            .position(|f| f.index == index)
            .ok_or(GraphError::ForwardNotFound(index))?;
        if self.forward_edit == Some(index) {
            self.forward_edit = None;
        }
        Ok(self.forwards.remove(position))
    }

    /// Opens an edit session on one forward and returns a draft copy. The
    /// graph is untouched until the draft is committed. Opening a new session
    /// abandons any previous one.
    pub fn begin_forward_edit(&mut self, index: u32) -> Result<ChainForward, GraphError> {
        let draft = self
            .forward(index)
            .cloned()
            .ok_or(GraphError::ForwardNotFound(index))?;
        self.forward_edit = Some(index);
        Ok(draft)
    }

    /// Applies a draft. On error the session stays open so the draft can be
    /// corrected and committed again.
    pub fn commit_forward_edit(&mut self, draft: ChainForward) -> Result<(), GraphError> {
        let active = self.forward_edit.ok_or(GraphError::NoActiveForwardEdit)?;
        if draft.index != active {
            return Err(GraphError::ForwardEditMismatch {
                active,
                draft: draft.index,
            });
        }
        self.require_node(&draft.source_id)?;
        self.ensure_relation_free(
            &draft.source_id,
            &draft.relation,
            Some(&ConnectionRef::Forward(active)),
        )?;

        let slot = self
            .forwards
            .iter_mut()
            .find(|f| f.index == active)
            .ok_or(GraphError::ForwardNotFound(active))?;
        *slot = draft;
        self.forward_edit = None;
        Ok(())
    }

    pub fn cancel_forward_edit(&mut self) {
        self.forward_edit = None;
    }

    pub fn forward_edit_in_progress(&self) -> Option<u32> {
        self.forward_edit
    }

    // --- Helpers ---

    fn require_node(&self, node_id: &str) -> Result<&Node, GraphError> {
        self.node(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))
    }

    fn editable_node_mut(&mut self, node_id: &str) -> Result<&mut Node, GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        if node.is_external {
            return Err(GraphError::ReadOnlyNode(node_id.to_string()));
        }
        Ok(node)
    }

    fn ensure_relation_free(
        &self,
        source_id: &str,
        relation: &str,
        editing: Option<&ConnectionRef>,
    ) -> Result<(), GraphError> {
        let relation = normalize_relation(relation);
        if self.used_relations(source_id, editing).contains(relation) {
            warn!(source_id, relation, "Rejected duplicate relation");
            return Err(GraphError::DuplicateRelation {
                source_id: source_id.to_string(),
                relation: relation.to_string(),
            });
        }
        Ok(())
    }
}
