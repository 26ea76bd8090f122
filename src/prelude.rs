//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! rulegraph crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use rulegraph::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! let settings = EditorSettings::from_file("path/to/editor.json")?;
//! let registry = Arc::new(NodeRegistry::default());
//! let text = std::fs::read_to_string("path/to/chain.json")?;
//! let metadata: RuleChainMetadata = serde_json::from_str(&text)?;
//! let graph = RuleGraph::from_metadata(registry, settings.relation_resolver(), metadata)?;
//! println!("Loaded {} nodes", graph.nodes().len());
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::graph::{ChainForward, ChainId, Edge, Node, RuleChainMetadata, RuleGraph};

// Configuration codecs
pub use crate::config::{CodecMode, ConfigCodec, NodeConfig, ParsedConfig, parse_config_text};
pub use crate::registry::{ExpressionSlot, NodeRegistry, NodeSpec};

// Relations
pub use crate::relation::{
    ConnectionRef, DEFAULT_RELATION, RelationCatalog, RelationOption, RelationResolver,
    RelationStrategy,
};

// Validation and suggestions
pub use crate::settings::EditorSettings;
pub use crate::suggest::{PathSuggester, PathSuggestion, filter_suggestions, suggest_paths};
pub use crate::validation::{
    ExpectedKind, ExpressionCheck, ExpressionValidator, SampleMessage, ValidationRequest,
    ValidationState, ValidationStatus, ValidationVerdict,
};

// Error types
pub use crate::error::{GraphError, SettingsError, ValidationError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
