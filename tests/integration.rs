mod common;

use common::*;
use rulegraph::config::{AttributesConfig, TimeseriesConfig};
use rulegraph::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn load(value: serde_json::Value) -> std::result::Result<RuleGraph, GraphError> {
    let metadata: RuleChainMetadata = serde_json::from_value(value).expect("valid metadata JSON");
    RuleGraph::from_metadata(
        Arc::new(NodeRegistry::default()),
        RelationResolver::default(),
        metadata,
    )
}

#[test]
fn test_load_legacy_chain() {
    let graph = load(legacy_chain_json()).unwrap();

    assert_eq!(graph.nodes().len(), 4);
    assert_eq!(graph.edges().len(), 3);
    assert_eq!(graph.forwards().len(), 1);
    assert_eq!(graph.root().map(|n| n.id.as_str()), Some("switch"));

    let save = graph.node_config::<TimeseriesConfig>("save").unwrap();
    assert_eq!(save.device_id_path, "sn");
    assert!(!save.use_server_ts);
    assert_eq!(save.ts_path, "ts");
    assert!(graph.node("save").unwrap().configuration.get("legacy").is_none());

    let attrs = graph.node_config::<AttributesConfig>("attrs").unwrap();
    assert!(attrs.notify_device);
    assert_eq!(attrs.attributes[0].key, "fw");
    assert_eq!(graph.node("attrs").unwrap().configuration["color"], json!("red"));
}

#[test]
fn test_loaded_switch_relation_options() {
    let graph = load(legacy_chain_json()).unwrap();
    let options = graph.relation_options("switch", None).unwrap();
    let summary: Vec<(&str, bool)> = options.iter().map(|o| (o.label.as_str(), o.used)).collect();
    assert_eq!(
        summary,
        vec![("Other", true), ("Missing", false), ("ping", true), ("pong", true)]
    );
}

#[test]
fn test_external_nodes_are_read_only() {
    let mut graph = load(legacy_chain_json()).unwrap();
    let shared = graph.node("shared").unwrap();
    assert!(shared.is_external);

    assert_eq!(
        graph.rename_node("shared", "Renamed").unwrap_err(),
        GraphError::ReadOnlyNode("shared".to_string())
    );
    assert_eq!(
        graph.set_configuration("shared", &json!({ "x": 1 })).unwrap_err(),
        GraphError::ReadOnlyNode("shared".to_string())
    );
    assert!(!graph.set_root("shared"));
    assert!(graph.editable_nodes().iter().all(|n| n.id != "shared"));
    assert_eq!(graph.editable_nodes().len(), 3);
}

#[test]
fn test_metadata_round_trip() {
    let graph = load(legacy_chain_json()).unwrap();
    let first = graph.to_metadata();

    let text = serde_json::to_string(&first).unwrap();
    let wire: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(wire["firstNodeIndex"], json!(0));
    assert_eq!(wire["ruleChainConnections"][0]["targetRuleChainId"], json!(42));
    assert_eq!(wire["ruleChainConnections"][0]["type"], json!("Other"));
    assert_eq!(wire["nodes"][3]["external"], json!(true));
    assert_eq!(
        wire["nodes"][0]["configuration"],
        json!({ "mappings": [
            { "type": "ping", "relation": "" },
            { "type": "pong", "relation": "" }
        ] })
    );

    let reloaded = load(wire).unwrap();
    assert_eq!(reloaded.to_metadata(), first);
}

#[test]
fn test_unlabeled_connection_saved_as_default() {
    let graph = load(json!({
        "nodes": [
            { "type": "Action.LogNode", "name": "a" },
            { "type": "Action.LogNode", "name": "b" }
        ],
        "connections": [{ "from_index": 0, "to_index": 1 }]
    }))
    .unwrap();

    assert!(graph.root().is_none());
    assert_eq!(graph.to_metadata().connections[0].relation, "Success");
}

#[test]
fn test_dangling_connection_rejected() {
    let result = load(json!({
        "nodes": [{ "type": "Action.LogNode", "name": "only" }],
        "connections": [{ "fromIndex": 0, "toIndex": 5, "type": "Success" }]
    }));
    assert_eq!(
        result.err(),
        Some(GraphError::InvalidConnection {
            from_index: 0,
            missing_index: 5,
        })
    );
}

#[test]
fn test_duplicate_persisted_relation_rejected() {
    let result = load(json!({
        "nodes": [
            { "id": "a", "type": "Action.LogNode", "name": "a" },
            { "id": "b", "type": "Action.LogNode", "name": "b" }
        ],
        "connections": [
            { "fromIndex": 0, "toIndex": 1, "type": "Success" },
            { "fromIndex": 0, "toIndex": 1, "type": "" }
        ]
    }));
    assert!(matches!(
        result,
        Err(GraphError::DuplicateRelation { ref relation, .. }) if relation == "Success"
    ));
}

#[test]
fn test_textual_chain_ids() {
    let graph = load(json!({
        "nodes": [{ "id": "a", "type": "Action.LogNode", "name": "a" }],
        "ruleChainConnections": [
            { "fromIndex": 0, "targetRuleChainId": "d4c1-77", "type": "Failure" }
        ]
    }))
    .unwrap();
    assert_eq!(
        graph.forwards()[0].target_chain_id,
        ChainId::Text("d4c1-77".to_string())
    );
    assert_eq!(graph.forwards()[0].target_chain_id.to_string(), "d4c1-77");
}

#[test]
fn test_external_first_node_index_is_ignored() {
    let mut chain = legacy_chain_json();
    chain["firstNodeIndex"] = json!(3);
    let graph = load(chain).unwrap();

    assert!(graph.node("shared").unwrap().is_external);
    assert!(graph.root().is_none());
    assert_eq!(graph.to_metadata().first_node_index, None);
}
