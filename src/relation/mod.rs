//! Relation labels: the catalog of known labels, per-type relation strategies,
//! and the resolver that turns them into connectable options.

use crate::config::{MsgTypeSwitchConfig, NodeConfig};
use ahash::AHashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The relation an unlabeled connection is treated as.
pub const DEFAULT_RELATION: &str = "Success";

/// Relations every message-type switch offers before its own mappings.
pub const SWITCH_BUILTIN_RELATIONS: [&str; 2] = ["Other", "Missing"];

/// Maps an empty label to [`DEFAULT_RELATION`].
pub fn normalize_relation(relation: &str) -> &str {
    if relation.is_empty() {
        DEFAULT_RELATION
    } else {
        relation
    }
}

/// A known relation label and its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Ordered list of known relation labels. Used for display and to filter
/// static relation lists down to labels the platform knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationCatalog {
    entries: Vec<RelationDescriptor>,
}

const BUILTIN_RELATIONS: &[(&str, &str)] = &[
    ("Success", "The message was processed successfully"),
    ("Failure", "Processing the message raised an error"),
    ("True", "The condition holds for the message"),
    ("False", "The condition does not hold for the message"),
    ("Missing", "The message lacks the data the node needs"),
    ("Other", "No configured branch matched the message"),
    ("Created", "A new entity or alarm was created"),
    ("Updated", "An existing entity or alarm was updated"),
    ("Deleted", "An entity or attribute was deleted"),
    ("Cleared", "An active alarm was cleared"),
    ("Timeout", "The node gave up waiting for a response"),
    ("Acknowledged", "The message was acknowledged to its source"),
];

impl Default for RelationCatalog {
    fn default() -> Self {
        Self::new(
            BUILTIN_RELATIONS
                .iter()
                .map(|(name, description)| RelationDescriptor {
                    name: name.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        )
    }
}

impl RelationCatalog {
    pub fn new(entries: Vec<RelationDescriptor>) -> Self {
        Self { entries }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.description.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

/// How a node type decides which relations it can emit.
#[derive(Debug, Clone)]
pub enum RelationStrategy {
    /// A fixed list, filtered down to labels present in the catalog.
    Static(Vec<String>),
    /// Computed from the node's own configuration.
    Dynamic(fn(&Value) -> Vec<String>),
}

impl RelationStrategy {
    pub fn fixed(labels: &[&str]) -> Self {
        RelationStrategy::Static(labels.iter().map(|l| l.to_string()).collect())
    }
}

/// Relations of a message-type switch: the built-ins followed by each
/// mapping's relation (or its type when the relation is empty), deduplicated
/// in first-seen order.
pub fn switch_relations(configuration: &Value) -> Vec<String> {
    let config = MsgTypeSwitchConfig::decode(configuration);
    SWITCH_BUILTIN_RELATIONS
        .iter()
        .map(|r| r.to_string())
        .chain(
            config
                .mappings
                .iter()
                .map(|m| m.effective_relation().to_string()),
        )
        .filter(|r| !r.is_empty())
        .unique()
        .collect()
}

/// Identifies the outgoing connection currently being edited, so its own
/// label is not counted as taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionRef {
    Edge(String),
    Forward(u32),
}

/// One relation offered when connecting a node's outgoing edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationOption {
    pub label: String,
    pub description: Option<String>,
    /// Already taken by another connection from the same source.
    pub used: bool,
}

/// Resolves the relation labels a node may use for a new or edited connection.
#[derive(Debug, Clone, Default)]
pub struct RelationResolver {
    catalog: RelationCatalog,
}

impl RelationResolver {
    pub fn new(catalog: RelationCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RelationCatalog {
        &self.catalog
    }

    /// Ordered legal labels for a node of the given strategy and configuration.
    pub fn available(&self, strategy: &RelationStrategy, configuration: &Value) -> Vec<String> {
        match strategy {
            RelationStrategy::Static(labels) => labels
                .iter()
                .filter(|label| self.catalog.contains(label))
                .cloned()
                .collect(),
            RelationStrategy::Dynamic(compute) => compute(configuration),
        }
    }

    /// Legal labels annotated with whether a sibling connection already uses them.
    pub fn options(
        &self,
        strategy: &RelationStrategy,
        configuration: &Value,
        used: &AHashSet<String>,
    ) -> Vec<RelationOption> {
        self.available(strategy, configuration)
            .into_iter()
            .map(|label| RelationOption {
                used: used.contains(&label),
                description: self.catalog.description(&label).map(str::to_string),
                label,
            })
            .collect()
    }
}
