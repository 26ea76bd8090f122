//! # rulegraph - Rule Chain Graph and Configuration Engine
//!
//! **rulegraph** is the model behind a visual editor for IoT message-processing
//! pipelines. A rule chain is a directed graph of typed processing nodes joined
//! by labeled relation edges; every node carries a type-specific configuration
//! object that has been written under many historical field names.
//!
//! ## Building Blocks
//!
//! 1.  **Configuration codecs** ([`config`]): decode a raw JSON object into one
//!     canonical record per node type, tolerating legacy aliases, and encode it
//!     back. Decoding never fails.
//! 2.  **Node registry** ([`registry`]): maps each type tag to its codec,
//!     default configuration, relation strategy and expression slot.
//! 3.  **Relations** ([`relation`]): the labels a node may use for an outgoing
//!     connection, and which of them are already taken.
//! 4.  **Rule graph** ([`graph`]): the aggregate owning nodes, edges and
//!     forwards into other chains, enforcing unique relation labels per source.
//! 5.  **Expression validation** ([`validation`]): debounced, cancelable remote
//!     checks of script expressions with a small status state machine.
//! 6.  **Path suggestions** ([`suggest`]): bounded dotted-path candidates
//!     walked out of a sample message.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rulegraph::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let registry = Arc::new(NodeRegistry::default());
//!     let mut graph = RuleGraph::new(registry);
//!
//!     let filter = graph.add_node("Filter.ScriptFilterNode").id.clone();
//!     let save = graph.add_node("Telemetry.MsgTimeseriesNode").id.clone();
//!
//!     // Legacy field names are normalized on the way in.
//!     graph.set_configuration_text(&save, r#"{"device_id_path": "sn", "use_server_ts": false}"#)?;
//!
//!     graph.connect(&filter, &save, "True")?;
//!     // A second "True" edge from the same node is rejected.
//!     assert!(graph.connect(&filter, &save, "True").is_err());
//!
//!     for option in graph.relation_options(&filter, None)? {
//!         println!("{} (used: {})", option.label, option.used);
//!     }
//!
//!     for suggestion in suggest_paths(r#"{"temperature": {"value": 21.5}}"#) {
//!         println!("{}", suggestion.label);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod registry;
pub mod relation;
pub mod settings;
pub mod suggest;
pub mod validation;

#[cfg(feature = "python-bindings")]
mod python;
