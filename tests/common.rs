//! Common test utilities for building rule graphs, chains and checkers.
use async_trait::async_trait;
use rulegraph::prelude::*;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An empty graph over the built-in node catalog.
#[allow(dead_code)]
pub fn empty_graph() -> RuleGraph {
    RuleGraph::new(Arc::new(NodeRegistry::default()))
}

/// A small chain: filter -> (True) save timeseries, filter -> (False) log.
///
/// Returns the graph and the ids `(filter, save, log)`.
#[allow(dead_code)]
pub fn create_simple_graph() -> (RuleGraph, String, String, String) {
    let mut graph = empty_graph();
    let filter = graph.add_node("Filter.ScriptFilterNode").id.clone();
    let save = graph.add_node("Telemetry.MsgTimeseriesNode").id.clone();
    let log = graph.add_node("Action.LogNode").id.clone();
    graph.connect(&filter, &save, "True").unwrap();
    graph.connect(&filter, &log, "False").unwrap();
    (graph, filter, save, log)
}

/// Persisted chain with legacy configuration field names, one external node
/// and one forward into another chain.
#[allow(dead_code)]
pub fn legacy_chain_json() -> Value {
    json!({
        "firstNodeIndex": 0,
        "nodes": [
            {
                "id": "switch",
                "type": "Filter.MsgTypeSwitchNode",
                "name": "Route by type",
                "configuration": { "message_types": ["ping", "pong"] }
            },
            {
                "id": "save",
                "type": "Telemetry.MsgTimeseriesNode",
                "name": "Save",
                "configuration": { "device_id_path": "sn", "use_server_ts": false, "ts_path": "ts", "legacy": 1 }
            },
            {
                "id": "attrs",
                "type": "Telemetry.MsgAttributesNode",
                "name": "Attributes",
                "configuration": { "fields": ["fw"], "notify_device": true, "color": "red" },
                "additionalInfo": { "layoutX": 10, "layoutY": 20 }
            },
            {
                "id": "shared",
                "type": "Flow.RuleChainInputNode",
                "name": "Shared chain",
                "configuration": {},
                "external": true
            }
        ],
        "connections": [
            { "fromIndex": 0, "toIndex": 1, "type": "ping" },
            { "fromIndex": 0, "toIndex": 2, "type": "pong" },
            { "fromIndex": 1, "toIndex": 3, "type": "Success" }
        ],
        "ruleChainConnections": [
            { "fromIndex": 0, "targetRuleChainId": 42, "type": "Other", "additionalInfo": { "ruleChainName": "Fallback" } }
        ]
    })
}

/// Scripted expression checker. Expressions listed in `delays` sleep before
/// answering; `"boom"` fails in transport; `"reject"` is rejected without a
/// message and expressions starting with `bad` are rejected with one.
#[allow(dead_code)]
pub struct ScriptedChecker {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<ValidationRequest>>,
    pub delays: Vec<(String, Duration)>,
}

#[allow(dead_code)]
impl ScriptedChecker {
    pub fn new() -> Arc<Self> {
        Self::with_delays(Vec::new())
    }

    pub fn with_delays(delays: Vec<(&str, Duration)>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            delays: delays
                .into_iter()
                .map(|(expr, delay)| (expr.to_string(), delay))
                .collect(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ValidationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ExpressionCheck for ScriptedChecker {
    async fn check(
        &self,
        request: ValidationRequest,
    ) -> std::result::Result<ValidationVerdict, ValidationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some((_, delay)) = self.delays.iter().find(|(e, _)| *e == request.expression) {
            tokio::time::sleep(*delay).await;
        }

        if request.expression == "boom" {
            return Err(ValidationError::Transport("connection reset".to_string()));
        }
        if request.expression == "reject" {
            return Ok(ValidationVerdict {
                valid: false,
                error: None,
            });
        }
        if request.expression.starts_with("bad") {
            return Ok(ValidationVerdict::invalid(format!(
                "syntax error in '{}'",
                request.expression
            )));
        }
        Ok(ValidationVerdict::valid())
    }
}
