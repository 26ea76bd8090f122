//! Node type registry.
//!
//! Each type tag maps to one [`NodeSpec`]: its configuration codec, default
//! configuration, relation strategy and, for script nodes, the expression
//! slot that is validated. New node types are added by registration.

use crate::config::{ConfigCodec, PassthroughCodec};
use crate::relation::RelationStrategy;
use crate::validation::ExpectedKind;
use ahash::AHashMap;
use serde_json::{Map, Value};

mod catalog;

pub use catalog::NODE_TYPES;

/// The configuration field holding a node's script expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionSlot {
    pub field: &'static str,
    pub expected: Option<ExpectedKind>,
}

/// Everything the editor needs to know about one node type.
pub struct NodeSpec {
    pub type_tag: String,
    pub label: String,
    pub codec: Box<dyn ConfigCodec>,
    pub relations: RelationStrategy,
    pub expression: Option<ExpressionSlot>,
}

impl NodeSpec {
    pub fn new(
        type_tag: impl Into<String>,
        label: impl Into<String>,
        codec: Box<dyn ConfigCodec>,
        relations: RelationStrategy,
        expression: Option<ExpressionSlot>,
    ) -> Self {
        Self {
            type_tag: type_tag.into(),
            label: label.into(),
            codec,
            relations,
            expression,
        }
    }

    /// Spec used for type tags nobody registered.
    fn generic() -> Self {
        Self::new(
            "",
            "Node",
            Box::new(PassthroughCodec::new(Value::Object(Map::new()))),
            RelationStrategy::fixed(&["Success", "Failure"]),
            None,
        )
    }

    pub fn default_configuration(&self) -> Value {
        self.codec.defaults()
    }

    /// Result kind the node's expression must produce, if it has one.
    pub fn expected_kind(&self) -> Option<ExpectedKind> {
        self.expression.and_then(|slot| slot.expected)
    }
}

impl std::fmt::Debug for NodeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeSpec")
            .field("type_tag", &self.type_tag)
            .field("label", &self.label)
            .field("mode", &self.codec.mode())
            .field("relations", &self.relations)
            .field("expression", &self.expression)
            .finish()
    }
}

pub struct NodeRegistry {
    specs: AHashMap<String, NodeSpec>,
    order: Vec<String>,
    fallback: NodeSpec,
}

pub struct NodeRegistryBuilder {
    specs: AHashMap<String, NodeSpec>,
    order: Vec<String>,
}

impl NodeRegistryBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            specs: AHashMap::new(),
            order: Vec::new(),
        };
        catalog::register_default_nodes(&mut builder);
        builder
    }

    /// Starts from an empty registry instead of the built-in catalog.
    pub fn empty() -> Self {
        Self {
            specs: AHashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers a node type, replacing any spec with the same tag.
    pub fn with_node(mut self, spec: NodeSpec) -> Self {
        self.insert(spec);
        self
    }

    fn insert(&mut self, spec: NodeSpec) {
        if !self.specs.contains_key(&spec.type_tag) {
            self.order.push(spec.type_tag.clone());
        }
        self.specs.insert(spec.type_tag.clone(), spec);
    }

    pub fn build(self) -> NodeRegistry {
        NodeRegistry {
            specs: self.specs,
            order: self.order,
            fallback: NodeSpec::generic(),
        }
    }
}

impl Default for NodeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    pub fn builder() -> NodeRegistryBuilder {
        NodeRegistryBuilder::new()
    }

    /// The spec for `type_tag`, or a generic pass-through spec for unknown tags.
    pub fn get(&self, type_tag: &str) -> &NodeSpec {
        self.specs.get(type_tag).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.specs.contains_key(type_tag)
    }

    /// Registered type tags in registration order.
    pub fn type_tags(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Decodes and re-encodes `raw` with the codec registered for `type_tag`.
    pub fn normalize(&self, type_tag: &str, raw: &Value) -> Value {
        self.get(type_tag).codec.normalize(raw)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        NodeRegistryBuilder::new().build()
    }
}
