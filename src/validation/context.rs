use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEVICE_HEADERS: &[(&str, &[&str])] = &[
    ("name", &["deviceName", "device_name"]),
    ("type", &["deviceType", "device_type"]),
    ("id", &["deviceId", "device_id"]),
];

/// A test message used to evaluate expressions and to derive path suggestions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleMessage {
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub headers: Map<String, Value>,
    #[serde(default, alias = "msgType", alias = "message_type")]
    pub message_type: String,
}

impl SampleMessage {
    pub fn new(body: Value, headers: Map<String, Value>, message_type: impl Into<String>) -> Self {
        Self {
            body,
            headers,
            message_type: message_type.into(),
        }
    }

    /// Builds a sample from editor text. Unparsable body text becomes `{}` and
    /// anything but an object in the header text becomes an empty map.
    pub fn from_text(body: &str, headers: &str, message_type: impl Into<String>) -> Self {
        let body = serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Map::new()));
        let headers = match serde_json::from_str(headers) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self::new(body, headers, message_type)
    }

    /// Device descriptor assembled from well-known header keys.
    fn device(&self) -> Value {
        let device: Map<String, Value> = DEVICE_HEADERS
            .iter()
            .filter_map(|(field, keys)| {
                keys.iter()
                    .find_map(|key| self.headers.get(*key))
                    .map(|value| (field.to_string(), value.clone()))
            })
            .collect();
        Value::Object(device)
    }

    /// The evaluation context handed to the expression checker.
    pub fn context(&self) -> Value {
        let headers = Value::Object(self.headers.clone());
        let message_type = Value::String(self.message_type.clone());

        let mut metadata = Map::new();
        metadata.insert("headers".into(), headers.clone());
        metadata.insert("message_type".into(), message_type.clone());
        metadata.insert("msgType".into(), message_type.clone());
        metadata.insert("device".into(), self.device());
        let metadata = Value::Object(metadata);

        let mut context = Map::new();
        context.insert("msg".into(), self.body.clone());
        context.insert("payload".into(), self.body.clone());
        context.insert("metadata".into(), metadata.clone());
        context.insert("meta".into(), metadata);
        context.insert("headers".into(), headers);
        context.insert("msgType".into(), message_type.clone());
        context.insert("message_type".into(), message_type);
        Value::Object(context)
    }
}
