use super::fields::{
    object_or_empty, pick, pick_array, pick_object, pick_string, scalar_to_string, without_keys,
};
use super::{CodecMode, NodeConfig};
use serde_json::{Map, Number, Value};

const FIELDS: &[&str] = &["fields", "calculatedFields", "calculated_fields"];

const FIELD_NAME: &[&str] = &["name", "key", "outputName"];
const FIELD_EXPRESSION: &[&str] = &["expression", "expr", "formula"];
const OUTPUT: &[&str] = &["output"];
const OUTPUT_TYPE: &[&str] = &["outputType", "output_type"];
const OUTPUT_TYPE_NESTED: &[&str] = &["type", "outputType", "output_type"];
const SCOPE: &[&str] = &["scope", "attributeScope"];
const DECIMALS: &[&str] = &["decimalsByDefault", "decimals_by_default", "decimals"];

/// Where a calculated value is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputType {
    #[default]
    TimeSeries,
    Attributes,
}

impl OutputType {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputType::TimeSeries => "TIME_SERIES",
            OutputType::Attributes => "ATTRIBUTES",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TIME_SERIES" | "TIMESERIES" => Some(OutputType::TimeSeries),
            "ATTRIBUTES" | "ATTRIBUTE" => Some(OutputType::Attributes),
            _ => None,
        }
    }
}

/// Settings of the `Enrichment.CalculatedFieldsNode` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculatedFieldsConfig {
    pub fields: Vec<CalculatedField>,
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculatedField {
    pub name: String,
    pub expression: String,
    pub output: CalculatedOutput,
    /// Unrecognized keys of the field entry, written back unchanged.
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedOutput {
    pub output_type: OutputType,
    /// Only written for [`OutputType::Attributes`].
    pub scope: String,
    /// Text as entered; empty means "not set". Numeric text is written as a number.
    pub decimals_by_default: String,
    /// Unrecognized keys of the nested `output` object.
    pub extra: Map<String, Value>,
}

impl Default for CalculatedOutput {
    fn default() -> Self {
        Self {
            output_type: OutputType::TimeSeries,
            scope: "SERVER_SCOPE".to_string(),
            decimals_by_default: String::new(),
            extra: Map::new(),
        }
    }
}

/// Numeric coercion first, falling back to the trimmed text.
fn coerce_decimals(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Number(int.into());
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(trimmed.to_string()))
}

impl CalculatedField {
    fn decode(raw: &Value) -> Option<Self> {
        let entry = raw.as_object()?;
        let nested = pick_object(entry, OUTPUT);
        let defaults = CalculatedOutput::default();

        let output_type = pick(entry, OUTPUT_TYPE)
            .or_else(|| nested.and_then(|o| pick(o, OUTPUT_TYPE_NESTED)))
            .and_then(Value::as_str)
            .and_then(OutputType::parse)
            .unwrap_or_default();

        let scope = nested
            .and_then(|o| pick(o, SCOPE))
            .or_else(|| pick(entry, SCOPE))
            .and_then(scalar_to_string)
            .unwrap_or(defaults.scope);

        let decimals_by_default = nested
            .and_then(|o| pick(o, DECIMALS))
            .or_else(|| pick(entry, DECIMALS))
            .and_then(scalar_to_string)
            .unwrap_or_default();

        let output_extra = nested
            .map(|o| without_keys(o.clone(), &[OUTPUT_TYPE_NESTED, SCOPE, DECIMALS]))
            .unwrap_or_default();

        Some(Self {
            name: pick_string(entry, FIELD_NAME, ""),
            expression: pick_string(entry, FIELD_EXPRESSION, ""),
            output: CalculatedOutput {
                output_type,
                scope,
                decimals_by_default,
                extra: output_extra,
            },
            extra: without_keys(
                entry.clone(),
                &[FIELD_NAME, FIELD_EXPRESSION, OUTPUT, OUTPUT_TYPE, SCOPE, DECIMALS],
            ),
        })
    }

    fn encode(&self) -> Value {
        let kind = self.output.output_type.as_str();

        let mut output = self.output.extra.clone();
        output.insert("type".into(), Value::String(kind.to_string()));
        if self.output.output_type == OutputType::Attributes {
            output.insert("scope".into(), Value::String(self.output.scope.clone()));
        }
        if !self.output.decimals_by_default.trim().is_empty() {
            output.insert(
                "decimalsByDefault".into(),
                coerce_decimals(&self.output.decimals_by_default),
            );
        }

        let mut field = self.extra.clone();
        field.insert("name".into(), Value::String(self.name.clone()));
        field.insert("expression".into(), Value::String(self.expression.clone()));
        field.insert("outputType".into(), Value::String(kind.to_string()));
        field.insert("output".into(), Value::Object(output));
        Value::Object(field)
    }
}

impl NodeConfig for CalculatedFieldsConfig {
    const MODE: CodecMode = CodecMode::Partial;

    fn decode(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        Self {
            fields: pick_array(&obj, FIELDS)
                .map(|items| items.iter().filter_map(CalculatedField::decode).collect())
                .unwrap_or_default(),
            extra: without_keys(obj, &[FIELDS]),
        }
    }

    fn encode(&self) -> Value {
        let mut out = self.extra.clone();
        out.insert(
            "fields".into(),
            Value::Array(self.fields.iter().map(CalculatedField::encode).collect()),
        );
        Value::Object(out)
    }
}
