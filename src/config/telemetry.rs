use super::fields::{
    object_or_empty, pick_array, pick_bool, pick_object, pick_string, scalar_to_string,
    without_keys,
};
use super::{CodecMode, NodeConfig};
use serde_json::{Map, Value, json};

const DEVICE_ID_PATH: &[&str] = &["deviceIdPath", "device_id_path"];
const USE_SERVER_TS: &[&str] = &["useServerTs", "use_server_ts"];
const TS_PATH: &[&str] = &["tsPath", "ts_path"];
const VALUES: &[&str] = &["values", "valueMappings", "value_mappings"];

const VALUE_KEY: &[&str] = &["key", "name"];
const VALUE_PATH: &[&str] = &["valuePath", "value_path", "value"];
const VALUE_TYPE: &[&str] = &["valueType", "value_type", "type"];

/// Settings of the `Telemetry.MsgTimeseriesNode` node.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesConfig {
    pub device_id_path: String,
    pub use_server_ts: bool,
    /// Ignored on the wire while `use_server_ts` is set.
    pub ts_path: String,
    pub values: Vec<TimeseriesValue>,
}

/// One telemetry key extracted from the incoming message.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesValue {
    pub key: String,
    pub value_path: String,
    pub value_type: String,
}

impl Default for TimeseriesConfig {
    fn default() -> Self {
        Self {
            device_id_path: "device_id".to_string(),
            use_server_ts: true,
            ts_path: String::new(),
            values: Vec::new(),
        }
    }
}

impl TimeseriesValue {
    fn decode(raw: &Value) -> Option<Self> {
        let entry = raw.as_object()?;
        Some(Self {
            key: pick_string(entry, VALUE_KEY, ""),
            value_path: pick_string(entry, VALUE_PATH, ""),
            value_type: pick_string(entry, VALUE_TYPE, "string"),
        })
    }
}

impl NodeConfig for TimeseriesConfig {
    const MODE: CodecMode = CodecMode::Full;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        let defaults = Self::default();
        Self {
            device_id_path: pick_string(&obj, DEVICE_ID_PATH, &defaults.device_id_path),
            use_server_ts: pick_bool(&obj, USE_SERVER_TS, defaults.use_server_ts),
            ts_path: pick_string(&obj, TS_PATH, &defaults.ts_path),
            values: pick_array(&obj, VALUES)
                .map(|items| items.iter().filter_map(TimeseriesValue::decode).collect())
                .unwrap_or_default(),
        }
    }

    fn encode(&self) -> Value {
        let ts_path = if self.use_server_ts {
            ""
        } else {
            self.ts_path.as_str()
        };
        let values: Vec<Value> = self
            .values
            .iter()
            .map(|v| {
                json!({
                    "key": v.key,
                    "valuePath": v.value_path,
                    "valueType": v.value_type,
                })
            })
            .collect();
        json!({
            "deviceIdPath": self.device_id_path,
            "useServerTs": self.use_server_ts,
            "tsPath": ts_path,
            "values": values,
        })
    }
}

const PROCESSING_SETTINGS: &[&str] = &["processingSettings", "processing_settings"];
const PROCESSING_TYPE: &[&str] = &["type", "processingType", "processing_type"];
const SCOPE: &[&str] = &["scope", "attributeScope", "attribute_scope"];
const NOTIFY_DEVICE: &[&str] = &["notifyDevice", "notify_device"];
const SEND_UPDATED_NOTIFICATION: &[&str] = &[
    "sendAttributesUpdatedNotification",
    "send_attributes_updated_notification",
];
const UPDATE_ONLY_ON_CHANGE: &[&str] = &[
    "updateAttributesOnlyOnValueChange",
    "update_attributes_only_on_value_change",
];
const ATTRIBUTES: &[&str] = &["attributes", "attributeMappings", "attribute_mappings", "fields"];

const ATTRIBUTE_KEY: &[&str] = &["key", "name", "attribute"];
const ATTRIBUTE_PATH: &[&str] = &["valuePath", "value_path", "path", "value"];

/// Settings of the `Telemetry.MsgAttributesNode` node.
///
/// Partial codec: keys outside this schema survive a save.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributesConfig {
    pub processing_type: String,
    /// Other keys found inside `processingSettings`, kept as they were.
    pub processing_extra: Map<String, Value>,
    pub scope: String,
    pub notify_device: bool,
    pub send_attributes_updated_notification: bool,
    pub update_attributes_only_on_value_change: bool,
    pub attributes: Vec<AttributeMapping>,
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMapping {
    pub key: String,
    pub value_path: String,
}

impl Default for AttributesConfig {
    fn default() -> Self {
        Self {
            processing_type: "ON_EVERY_MESSAGE".to_string(),
            processing_extra: Map::new(),
            scope: "CLIENT_SCOPE".to_string(),
            notify_device: false,
            send_attributes_updated_notification: false,
            update_attributes_only_on_value_change: true,
            attributes: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl AttributeMapping {
    fn decode(raw: &Value) -> Option<Self> {
        match raw {
            Value::Object(entry) => {
                let key = pick_string(entry, ATTRIBUTE_KEY, "");
                let value_path = pick_string(entry, ATTRIBUTE_PATH, &key);
                Some(Self { key, value_path })
            }
            // Bare names read the attribute from a path of the same name.
            other => scalar_to_string(other).map(|key| Self {
                value_path: key.clone(),
                key,
            }),
        }
    }
}

impl NodeConfig for AttributesConfig {
    const MODE: CodecMode = CodecMode::Partial;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        let defaults = Self::default();

        let (processing_type, processing_extra) = match pick_object(&obj, PROCESSING_SETTINGS) {
            Some(settings) => (
                pick_string(settings, PROCESSING_TYPE, &defaults.processing_type),
                without_keys(settings.clone(), &[PROCESSING_TYPE]),
            ),
            None => (defaults.processing_type.clone(), Map::new()),
        };

        let attributes = pick_array(&obj, ATTRIBUTES)
            .map(|items| items.iter().filter_map(AttributeMapping::decode).collect())
            .unwrap_or_default();

        Self {
            processing_type,
            processing_extra,
            scope: pick_string(&obj, SCOPE, &defaults.scope),
            notify_device: pick_bool(&obj, NOTIFY_DEVICE, defaults.notify_device),
            send_attributes_updated_notification: pick_bool(
                &obj,
                SEND_UPDATED_NOTIFICATION,
                defaults.send_attributes_updated_notification,
            ),
            update_attributes_only_on_value_change: pick_bool(
                &obj,
                UPDATE_ONLY_ON_CHANGE,
                defaults.update_attributes_only_on_value_change,
            ),
            attributes,
            extra: without_keys(
                obj,
                &[
                    PROCESSING_SETTINGS,
                    SCOPE,
                    NOTIFY_DEVICE,
                    SEND_UPDATED_NOTIFICATION,
                    UPDATE_ONLY_ON_CHANGE,
                    ATTRIBUTES,
                ],
            ),
        }
    }

    fn encode(&self) -> Value {
        let mut out = self.extra.clone();

        let mut processing = self.processing_extra.clone();
        processing.insert("type".into(), Value::String(self.processing_type.clone()));
        out.insert("processingSettings".into(), Value::Object(processing));

        out.insert("scope".into(), Value::String(self.scope.clone()));
        out.insert("notifyDevice".into(), Value::Bool(self.notify_device));
        out.insert(
            "sendAttributesUpdatedNotification".into(),
            Value::Bool(self.send_attributes_updated_notification),
        );
        out.insert(
            "updateAttributesOnlyOnValueChange".into(),
            Value::Bool(self.update_attributes_only_on_value_change),
        );
        out.insert(
            "attributes".into(),
            Value::Array(
                self.attributes
                    .iter()
                    .map(|a| json!({ "key": a.key, "valuePath": a.value_path }))
                    .collect(),
            ),
        );
        Value::Object(out)
    }
}

