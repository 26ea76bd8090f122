//! Node configuration codecs.
//!
//! Every node type stores its settings as a JSON object. Over time the same
//! setting has been written under several field names, so each codec decodes
//! a raw object into one canonical record (trying the canonical key first and
//! then each legacy alias in a fixed order) and encodes the record back using
//! canonical keys only.
//!
//! Decoding is total: anything that is not a JSON object is read as `{}` and
//! every field falls back to its documented default.
//!
//! Codecs come in two flavours, see [`CodecMode`].

use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

pub mod action;
pub mod calculated;
pub(crate) mod fields;
pub mod filter;
pub mod telemetry;
pub mod transform;

pub use action::LogConfig;
pub use calculated::{CalculatedField, CalculatedFieldsConfig, CalculatedOutput, OutputType};
pub use filter::{
    CheckMessageConfig, MsgTypeFilterConfig, MsgTypeMapping, MsgTypeSwitchConfig,
    ScriptFilterConfig,
};
pub use telemetry::{AttributeMapping, AttributesConfig, TimeseriesConfig, TimeseriesValue};
pub use transform::{DeleteKeysConfig, RenameKeysConfig, RenamePair, SplitArrayConfig, TransformConfig};

/// How a codec treats keys it does not know about when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecMode {
    /// Emits the canonical shape only; every other key is discarded.
    Full,
    /// Spreads the original object first, then overwrites known fields.
    /// Legacy aliases that were read are still removed.
    Partial,
}

/// A canonical, typed configuration record for one node type.
pub trait NodeConfig: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const MODE: CodecMode;

    /// Reads a raw JSON value. Never fails.
    fn decode(raw: &Value) -> Self;

    /// Writes the canonical JSON object.
    fn encode(&self) -> Value;

    /// Parses configuration text and decodes it, degrading to defaults.
    fn decode_text(text: &str) -> Self {
        Self::decode(&parse_config_text(text).value)
    }
}

/// Object-safe view over a node configuration codec, used by the registry.
pub trait ConfigCodec: Send + Sync {
    fn mode(&self) -> CodecMode;

    /// The configuration a freshly created node of this type receives.
    fn defaults(&self) -> Value;

    /// Decodes and re-encodes `raw`, producing the canonical wire object.
    fn normalize(&self, raw: &Value) -> Value;
}

/// Adapts a [`NodeConfig`] record type into a [`ConfigCodec`].
pub struct TypedCodec<T>(PhantomData<fn() -> T>);

impl<T> TypedCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TypedCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NodeConfig> ConfigCodec for TypedCodec<T> {
    fn mode(&self) -> CodecMode {
        T::MODE
    }

    fn defaults(&self) -> Value {
        T::default().encode()
    }

    fn normalize(&self, raw: &Value) -> Value {
        T::decode(raw).encode()
    }
}

/// Codec for node types without a dedicated schema: keeps the object verbatim.
pub struct PassthroughCodec {
    defaults: Value,
}

impl PassthroughCodec {
    pub fn new(defaults: Value) -> Self {
        let defaults = match defaults {
            Value::Object(_) => defaults,
            _ => Value::Object(Map::new()),
        };
        Self { defaults }
    }
}

impl ConfigCodec for PassthroughCodec {
    fn mode(&self) -> CodecMode {
        CodecMode::Partial
    }

    fn defaults(&self) -> Value {
        self.defaults.clone()
    }

    fn normalize(&self, raw: &Value) -> Value {
        Value::Object(fields::object_or_empty(raw))
    }
}

/// Result of reading configuration text typed into the raw editor.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfig {
    /// The parsed object, or `{}` when the text could not be used.
    pub value: Value,
    /// Inline, non-blocking message describing why the text was not used.
    pub warning: Option<String>,
}

/// Parses raw configuration text. Blank text is an empty object.
pub fn parse_config_text(text: &str) -> ParsedConfig {
    if text.trim().is_empty() {
        return ParsedConfig {
            value: Value::Object(Map::new()),
            warning: None,
        };
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => ParsedConfig {
            value,
            warning: None,
        },
        Ok(_) => {
            debug!("Configuration text is valid JSON but not an object, using defaults");
            ParsedConfig {
                value: Value::Object(Map::new()),
                warning: Some("Configuration must be a JSON object".to_string()),
            }
        }
        Err(e) => {
            debug!(error = %e, "Configuration text is not valid JSON, using defaults");
            ParsedConfig {
                value: Value::Object(Map::new()),
                warning: Some(format!("Invalid JSON: {}", e)),
            }
        }
    }
}
