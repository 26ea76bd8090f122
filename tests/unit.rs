//! Unit tests for core rulegraph types.
use rulegraph::prelude::*;
use rulegraph::relation::normalize_relation;
use rulegraph::validation::DEFAULT_DEBOUNCE;
use std::time::Duration;

#[test]
fn test_graph_error_display() {
    let err = GraphError::DuplicateRelation {
        source_id: "n1".to_string(),
        relation: "True".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Node 'n1' already has an outgoing connection labeled 'True'"
    );
    assert_eq!(
        GraphError::InvalidConnection {
            from_index: 2,
            missing_index: 9,
        }
        .to_string(),
        "Connection from index 2 references missing node index 9"
    );
    assert_eq!(
        GraphError::ReadOnlyNode("ext".to_string()).to_string(),
        "Node 'ext' is an external reference and cannot be edited"
    );
}

#[test]
fn test_validation_error_display() {
    assert_eq!(
        ValidationError::Transport("timed out".to_string()).to_string(),
        "Transport failure: timed out"
    );
}

#[test]
fn test_settings_defaults() {
    let settings = EditorSettings::default();
    assert_eq!(settings.debounce(), DEFAULT_DEBOUNCE);
    assert_eq!(settings.suggestions.max_depth, 5);
    assert_eq!(settings.suggestions.max_array_items, 4);
    assert_eq!(settings.suggestions.max_paths, 80);
    assert_eq!(settings.suggestions.max_visible, 8);
    assert!(settings.relations.is_none());
    assert_eq!(settings.relation_catalog(), RelationCatalog::default());

    assert_eq!(EditorSettings::from_json("{}").unwrap(), settings);
}

#[test]
fn test_settings_from_json() {
    let settings = EditorSettings::from_json(
        r#"{
            "validationDebounceMs": 200,
            "suggestions": { "maxVisible": 3 },
            "relations": [{ "name": "Success" }, { "name": "Escalated", "description": "Sent upstream" }]
        }"#,
    )
    .unwrap();

    assert_eq!(settings.debounce(), Duration::from_millis(200));
    assert_eq!(settings.suggestions.max_visible, 3);
    assert_eq!(settings.suggestions.max_paths, 80);
    assert_eq!(settings.path_suggester().limits().max_visible, 3);

    let catalog = settings.relation_catalog();
    assert!(catalog.contains("Escalated"));
    assert!(!catalog.contains("Failure"));
    assert_eq!(catalog.description("Escalated"), Some("Sent upstream"));
    assert_eq!(catalog.description("Success"), Some(""));
}

#[test]
fn test_settings_errors() {
    assert!(matches!(
        EditorSettings::from_json("{ \"validationDebounceMs\": \"soon\" }"),
        Err(SettingsError::Parse(_))
    ));
    assert!(matches!(
        EditorSettings::from_file("definitely/not/here.json"),
        Err(SettingsError::Io(_))
    ));
}

#[test]
fn test_normalize_relation() {
    assert_eq!(normalize_relation(""), "Success");
    assert_eq!(normalize_relation("Failure"), "Failure");
    assert_eq!(DEFAULT_RELATION, "Success");
}

#[test]
fn test_validation_state_serialization() {
    let state = ValidationState::error("expression is required.");
    assert_eq!(
        serde_json::to_value(&state).unwrap(),
        serde_json::json!({ "status": "error", "error": "expression is required." })
    );
    assert_eq!(
        serde_json::to_value(ValidationState::valid()).unwrap(),
        serde_json::json!({ "status": "valid" })
    );
    assert_eq!(ValidationState::default().status, ValidationStatus::Idle);
}

#[test]
fn test_chain_id_forms() {
    let numeric: ChainId = serde_json::from_str("17").unwrap();
    let textual: ChainId = serde_json::from_str("\"abc\"").unwrap();
    assert_eq!(numeric, ChainId::Numeric(17));
    assert_eq!(textual, ChainId::from("abc"));
    assert_eq!(numeric.to_string(), "17");
}
