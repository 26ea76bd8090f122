use super::fields::{
    object_or_empty, pick, pick_bool, pick_string, pick_string_list, scalar_to_string,
    without_keys,
};
use super::{CodecMode, NodeConfig};
use serde_json::{Map, Value, json};

const TRANSFORM_EXPRESSION: &[&str] = &[
    "expression",
    "jqExpression",
    "jq_expression",
    "script",
    "transform",
];

/// Settings of the `Transform.ScriptTransformNode` node. The expression must
/// yield an object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformConfig {
    pub expression: String,
}

impl NodeConfig for TransformConfig {
    const MODE: CodecMode = CodecMode::Full;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        Self {
            expression: pick_string(&obj, TRANSFORM_EXPRESSION, ""),
        }
    }

    fn encode(&self) -> Value {
        json!({ "expression": self.expression })
    }
}

const SPLIT_EXPRESSION: &[&str] = &["expression", "jqExpression", "jq_expression", "script"];

/// Settings of the `Transform.SplitArrayMsgNode` node. The expression must
/// yield an array; every element becomes its own message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitArrayConfig {
    pub expression: String,
    pub extra: Map<String, Value>,
}

impl NodeConfig for SplitArrayConfig {
    const MODE: CodecMode = CodecMode::Partial;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        Self {
            expression: pick_string(&obj, SPLIT_EXPRESSION, ""),
            extra: without_keys(obj, &[SPLIT_EXPRESSION]),
        }
    }

    fn encode(&self) -> Value {
        let mut out = self.extra.clone();
        out.insert("expression".into(), Value::String(self.expression.clone()));
        Value::Object(out)
    }
}

const RENAME_MAPPING: &[&str] = &[
    "renameKeysMapping",
    "mapping",
    "mappings",
    "rename_keys_mapping",
    "keysMapping",
];
const FROM_METADATA: &[&str] = &["fromMetadata", "from_metadata"];

/// Settings of the `Transform.RenameKeysNode` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameKeysConfig {
    pub from_metadata: bool,
    pub pairs: Vec<RenamePair>,
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenamePair {
    pub source: String,
    pub target: String,
}

impl RenamePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

fn decode_rename_pairs(raw: &Value) -> Vec<RenamePair> {
    match raw {
        Value::Object(mapping) => mapping
            .iter()
            .map(|(source, target)| RenamePair {
                source: source.clone(),
                target: scalar_to_string(target).unwrap_or_default(),
            })
            .collect(),
        // Some older editors saved the pairs list directly.
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|entry| RenamePair {
                source: pick_string(entry, &["source", "from"], ""),
                target: pick_string(entry, &["target", "to"], ""),
            })
            .collect(),
        _ => Vec::new(),
    }
}

impl NodeConfig for RenameKeysConfig {
    const MODE: CodecMode = CodecMode::Partial;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        Self {
            from_metadata: pick_bool(&obj, FROM_METADATA, false),
            pairs: pick(&obj, RENAME_MAPPING)
                .map(decode_rename_pairs)
                .unwrap_or_default(),
            extra: without_keys(obj, &[RENAME_MAPPING, FROM_METADATA]),
        }
    }

    fn encode(&self) -> Value {
        let mapping: Map<String, Value> = self
            .pairs
            .iter()
            .filter(|pair| !pair.source.is_empty() && !pair.target.is_empty())
            .map(|pair| (pair.source.clone(), Value::String(pair.target.clone())))
            .collect();

        let mut out = self.extra.clone();
        out.insert("fromMetadata".into(), Value::Bool(self.from_metadata));
        out.insert("renameKeysMapping".into(), Value::Object(mapping));
        Value::Object(out)
    }
}

const DELETE_KEYS: &[&str] = &["keys", "deleteKeys", "delete_keys", "keysToDelete"];

/// Settings of the `Transform.DeleteKeysNode` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteKeysConfig {
    pub from_metadata: bool,
    pub keys: Vec<String>,
    pub extra: Map<String, Value>,
}

impl NodeConfig for DeleteKeysConfig {
    const MODE: CodecMode = CodecMode::Partial;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        Self {
            from_metadata: pick_bool(&obj, FROM_METADATA, false),
            keys: pick_string_list(&obj, DELETE_KEYS),
            extra: without_keys(obj, &[DELETE_KEYS, FROM_METADATA]),
        }
    }

    fn encode(&self) -> Value {
        let mut out = self.extra.clone();
        out.insert("fromMetadata".into(), Value::Bool(self.from_metadata));
        out.insert(
            "keys".into(),
            Value::Array(
                self.keys
                    .iter()
                    .filter(|key| !key.is_empty())
                    .cloned()
                    .map(Value::String)
                    .collect(),
            ),
        );
        Value::Object(out)
    }
}
