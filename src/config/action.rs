use super::fields::{object_or_empty, pick_string, without_keys};
use super::{CodecMode, NodeConfig};
use serde_json::{Map, Value};

const LEVEL: &[&str] = &["level", "logLevel", "log_level"];
const MESSAGE: &[&str] = &["message", "template", "format"];

/// Settings of the `Action.LogNode` node.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub level: String,
    /// Template rendered for each message; empty logs the message as is.
    pub message: String,
    pub extra: Map<String, Value>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            message: String::new(),
            extra: Map::new(),
        }
    }
}

impl NodeConfig for LogConfig {
    const MODE: CodecMode = CodecMode::Partial;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        Self {
            level: pick_string(&obj, LEVEL, "INFO"),
            message: pick_string(&obj, MESSAGE, ""),
            extra: without_keys(obj, &[LEVEL, MESSAGE]),
        }
    }

    fn encode(&self) -> Value {
        let mut out = self.extra.clone();
        out.insert("level".into(), Value::String(self.level.clone()));
        out.insert("message".into(), Value::String(self.message.clone()));
        Value::Object(out)
    }
}
