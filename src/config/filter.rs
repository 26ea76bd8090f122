use super::fields::{
    object_or_empty, pick_array, pick_bool, pick_string, pick_string_list, scalar_to_string,
    without_keys,
};
use super::{CodecMode, NodeConfig};
use serde_json::{Map, Value, json};

const MESSAGE_NAMES: &[&str] = &["messageNames", "message_names", "bodyKeys"];
const METADATA_NAMES: &[&str] = &["metadataNames", "metadata_names", "headerNames", "header_names"];
const CHECK_ALL_KEYS: &[&str] = &["checkAllKeys", "check_all_keys"];

const HEADER_PREFIX: &str = "headers.";

/// Settings of the `Filter.CheckMessageNode` node.
///
/// Header keys live on the wire as `headers.<key>` paths but are edited as
/// bare names.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckMessageConfig {
    pub message_names: Vec<String>,
    pub header_keys: Vec<String>,
    pub check_all_keys: bool,
    pub extra: Map<String, Value>,
}

impl Default for CheckMessageConfig {
    fn default() -> Self {
        Self {
            message_names: Vec::new(),
            header_keys: Vec::new(),
            check_all_keys: true,
            extra: Map::new(),
        }
    }
}

fn strip_header_prefix(path: String) -> String {
    match path.strip_prefix(HEADER_PREFIX) {
        Some(key) => key.to_string(),
        None => path,
    }
}

fn qualify_header_key(key: &str) -> String {
    // Keys containing a dot are already full paths.
    if key.is_empty() || key.contains('.') {
        key.to_string()
    } else {
        format!("{}{}", HEADER_PREFIX, key)
    }
}

impl NodeConfig for CheckMessageConfig {
    const MODE: CodecMode = CodecMode::Partial;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        Self {
            message_names: pick_string_list(&obj, MESSAGE_NAMES),
            header_keys: pick_string_list(&obj, METADATA_NAMES)
                .into_iter()
                .map(strip_header_prefix)
                .collect(),
            check_all_keys: pick_bool(&obj, CHECK_ALL_KEYS, true),
            extra: without_keys(obj, &[MESSAGE_NAMES, METADATA_NAMES, CHECK_ALL_KEYS]),
        }
    }

    fn encode(&self) -> Value {
        let mut out = self.extra.clone();
        out.insert("messageNames".into(), json!(self.message_names));
        out.insert(
            "metadataNames".into(),
            Value::Array(
                self.header_keys
                    .iter()
                    .map(|key| Value::String(qualify_header_key(key)))
                    .collect(),
            ),
        );
        out.insert("checkAllKeys".into(), Value::Bool(self.check_all_keys));
        Value::Object(out)
    }
}

const MESSAGE_TYPES: &[&str] = &["messageTypes", "message_types", "types"];

/// Settings of the `Filter.MsgTypeFilterNode` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MsgTypeFilterConfig {
    pub message_types: Vec<String>,
}

impl NodeConfig for MsgTypeFilterConfig {
    const MODE: CodecMode = CodecMode::Full;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        Self {
            message_types: pick_string_list(&obj, MESSAGE_TYPES),
        }
    }

    fn encode(&self) -> Value {
        json!({ "messageTypes": self.message_types })
    }
}

/// Legacy sources for switch mappings, in priority order. The last two hold
/// bare message type strings.
const SWITCH_SOURCES: &[&str] = &["mappings", "messageTypeMappings", "message_types", "messageTypes"];

const MAPPING_TYPE: &[&str] = &["type", "messageType", "message_type"];
const MAPPING_RELATION: &[&str] = &["relation", "relationType", "relation_type"];

/// Settings of the `Filter.MsgTypeSwitchNode` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MsgTypeSwitchConfig {
    pub mappings: Vec<MsgTypeMapping>,
}

/// Routes one message type to an outgoing relation. An empty relation routes
/// under the message type itself.
#[derive(Debug, Clone, PartialEq)]
pub struct MsgTypeMapping {
    pub message_type: String,
    pub relation: String,
}

impl MsgTypeMapping {
    /// Object entries are kept even when blank; they are rows being edited.
    fn decode(raw: &Value) -> Option<Self> {
        match raw {
            Value::Object(entry) => Some(Self {
                message_type: pick_string(entry, MAPPING_TYPE, ""),
                relation: pick_string(entry, MAPPING_RELATION, ""),
            }),
            other => Some(Self {
                message_type: scalar_to_string(other)?,
                relation: String::new(),
            }),
        }
    }

    /// The relation label this mapping routes to.
    pub fn effective_relation(&self) -> &str {
        if self.relation.is_empty() {
            &self.message_type
        } else {
            &self.relation
        }
    }
}

impl NodeConfig for MsgTypeSwitchConfig {
    const MODE: CodecMode = CodecMode::Full;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        Self {
            mappings: pick_array(&obj, SWITCH_SOURCES)
                .map(|items| items.iter().filter_map(MsgTypeMapping::decode).collect())
                .unwrap_or_default(),
        }
    }

    fn encode(&self) -> Value {
        let mappings: Vec<Value> = self
            .mappings
            .iter()
            .map(|m| json!({ "type": m.message_type, "relation": m.relation }))
            .collect();
        json!({ "mappings": mappings })
    }
}

const FILTER_EXPRESSION: &[&str] = &["expression", "jqExpression", "jq_expression", "script", "filter"];

/// Settings of the `Filter.ScriptFilterNode` node. The expression must yield
/// a boolean.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptFilterConfig {
    pub expression: String,
}

impl NodeConfig for ScriptFilterConfig {
    const MODE: CodecMode = CodecMode::Full;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        Self {
            expression: pick_string(&obj, FILTER_EXPRESSION, ""),
        }
    }

    fn encode(&self) -> Value {
        json!({ "expression": self.expression })
    }
}
