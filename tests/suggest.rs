use rulegraph::prelude::*;
use rulegraph::suggest::SuggestionLimits;
use serde_json::{Map, Value, json};

fn values(suggestions: &[PathSuggestion]) -> Vec<&str> {
    suggestions.iter().map(|s| s.value.as_str()).collect()
}

#[test]
fn test_nested_object_and_array_paths() {
    let suggestions = suggest_paths(r#"{"a":{"b":[1,2,3]}}"#);
    assert_eq!(values(&suggestions), vec!["a", "a.b", "a.b.0", "a.b.1", "a.b.2"]);
    assert!(suggestions.iter().all(|s| s.label == s.value));
}

#[test]
fn test_only_first_array_items_visited() {
    let suggestions = suggest_paths(r#"{"items":[{"v":1},{"v":2},{"v":3},{"v":4},{"v":5},{"v":6}]}"#);
    let paths = values(&suggestions);
    assert!(paths.contains(&"items.3.v"));
    assert!(!paths.contains(&"items.4"));
    assert!(!paths.contains(&"items.5.v"));
}

#[test]
fn test_depth_limit() {
    let suggestions = suggest_paths(r#"{"a":{"b":{"c":{"d":{"e":{"f":{"g":1}}}}}}}"#);
    let paths = values(&suggestions);
    assert!(paths.contains(&"a.b.c.d.e"));
    assert!(!paths.contains(&"a.b.c.d.e.f"));
    assert!(paths.iter().all(|p| p.split('.').count() <= 5));
}

#[test]
fn test_total_paths_capped() {
    let mut wide = Map::new();
    for i in 0..200 {
        wide.insert(format!("key{:03}", i), json!(i));
    }
    let text = Value::Object(wide).to_string();
    assert_eq!(suggest_paths(&text).len(), 80);
}

#[test]
fn test_invalid_or_scalar_sample_yields_nothing() {
    assert!(suggest_paths("{ not json").is_empty());
    assert!(suggest_paths("").is_empty());
    assert!(suggest_paths("42").is_empty());
    assert!(suggest_paths("[]").is_empty());
}

#[test]
fn test_root_array_paths_are_indices() {
    let suggestions = suggest_paths(r#"[{"t":1},{"t":2}]"#);
    assert_eq!(values(&suggestions), vec!["0", "0.t", "1", "1.t"]);
}

#[test]
fn test_filter_by_query() {
    let suggester = PathSuggester::default();
    let all = suggester.suggest(r#"{"Temperature":1,"humidity":2,"temp_min":3}"#);

    let hits = suggester.filter(&all, "TEMP");
    assert_eq!(values(&hits), vec!["Temperature", "temp_min"]);

    assert!(suggester.filter(&all, "pressure").is_empty());
}

#[test]
fn test_filter_caps_visible_suggestions() {
    let suggester = PathSuggester::default();
    let mut wide = Map::new();
    for i in 0..20 {
        wide.insert(format!("field{:02}", i), json!(i));
    }
    let all = suggester.suggest_value(&Value::Object(wide));
    assert_eq!(all.len(), 20);
    assert_eq!(suggester.filter(&all, "field").len(), 8);
    assert_eq!(suggester.filter(&all, "").len(), 8);
}

#[test]
fn test_custom_limits() {
    let suggester = PathSuggester::new(SuggestionLimits {
        max_depth: 2,
        max_array_items: 1,
        max_paths: 3,
        max_visible: 2,
    });
    let all = suggester.suggest(r#"{"a":{"b":{"c":1}},"list":[1,2],"z":0}"#);
    assert_eq!(values(&all), vec!["a", "a.b", "list"]);
    assert_eq!(suggester.limits().max_paths, 3);
}

#[test]
fn test_filter_suggestions_with_explicit_cap() {
    let all = suggest_paths(r#"{"alpha":1,"alpine":2,"beta":3}"#);
    assert_eq!(values(&filter_suggestions(&all, "al", 1)), vec!["alpha"]);
    assert_eq!(values(&filter_suggestions(&all, " BETA ", 8)), vec!["beta"]);
}
