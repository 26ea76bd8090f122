use crate::config::parse_config_text;
use crate::graph::{RuleChainMetadata, RuleGraph};
use crate::registry::NodeRegistry;
use crate::relation::RelationResolver;
use crate::suggest::PathSuggester;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::sync::Arc;

/// Rule chain editor model.
///
/// Loads a rule chain once and answers the questions the editor asks while
/// the user connects nodes.
#[pyclass(name = "RuleChain")]
struct RuleChainPy {
    graph: RuleGraph,
}

#[pymethods]
impl RuleChainPy {
    /// Loads and normalizes a rule chain.
    ///
    /// Args:
    ///     metadata_json (str): The rule chain metadata as JSON, with `nodes`,
    ///         `connections` and `ruleChainConnections`.
    ///
    /// Raises:
    ///     ValueError: If the JSON is malformed or the chain breaks a graph
    ///         invariant (dangling index, duplicate relation).
    #[new]
    fn new(metadata_json: &str) -> PyResult<Self> {
        let metadata: RuleChainMetadata = serde_json::from_str(metadata_json)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let graph = RuleGraph::from_metadata(
            Arc::new(NodeRegistry::default()),
            RelationResolver::default(),
            metadata,
        )
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(RuleChainPy { graph })
    }

    /// Returns `(label, used)` pairs for the relations a node may connect with.
    fn relation_options(&self, node_id: &str) -> PyResult<Vec<(String, bool)>> {
        let options = self
            .graph
            .relation_options(node_id, None)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(options.into_iter().map(|o| (o.label, o.used)).collect())
    }

    /// Serializes the normalized rule chain back to JSON.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.graph.to_metadata())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }
}

/// Normalizes a node configuration for the given type tag.
///
/// Malformed input degrades to the type's defaults, as in the editor.
#[pyfunction]
fn normalize_config(node_type: &str, configuration_json: &str) -> PyResult<String> {
    let registry = NodeRegistry::default();
    let parsed = parse_config_text(configuration_json);
    let normalized = registry.normalize(node_type, &parsed.value);
    serde_json::to_string(&normalized).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Dotted path suggestions for a sample JSON message.
#[pyfunction]
fn suggest_paths(sample_json: &str) -> Vec<String> {
    PathSuggester::default()
        .suggest(sample_json)
        .into_iter()
        .map(|s| s.value)
        .collect()
}

/// Rule chain graph and configuration engine.
///
/// This module provides Python bindings to the rulegraph Rust library.
#[pymodule]
fn rulegraph(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<RuleChainPy>()?;
    m.add_function(wrap_pyfunction!(normalize_config, m)?)?;
    m.add_function(wrap_pyfunction!(suggest_paths, m)?)?;
    Ok(())
}
