use super::{ExpressionSlot, NodeRegistryBuilder, NodeSpec};
use crate::config::{
    AttributesConfig, CalculatedFieldsConfig, CheckMessageConfig, ConfigCodec, DeleteKeysConfig,
    LogConfig, MsgTypeFilterConfig, MsgTypeSwitchConfig, PassthroughCodec, RenameKeysConfig,
    ScriptFilterConfig, SplitArrayConfig, TimeseriesConfig, TransformConfig, TypedCodec,
};
use crate::relation::{RelationStrategy, switch_relations};
use crate::validation::ExpectedKind;
use serde_json::{Value, json};

const SUCCESS_FAILURE: &[&str] = &["Success", "Failure"];
const CONDITION: &[&str] = &["True", "False", "Failure"];

fn typed<T: crate::config::NodeConfig>() -> Box<dyn ConfigCodec> {
    Box::new(TypedCodec::<T>::new())
}

fn passthrough(defaults: Value) -> Box<dyn ConfigCodec> {
    Box::new(PassthroughCodec::new(defaults))
}

fn fixed(labels: &[&str]) -> RelationStrategy {
    RelationStrategy::fixed(labels)
}

fn script(expected: Option<ExpectedKind>) -> Option<ExpressionSlot> {
    Some(ExpressionSlot {
        field: "expression",
        expected,
    })
}

/// Defines the built-in node catalog and its registration function.
macro_rules! define_node_catalog {
    ( $( ($tag:expr, $label:expr, $codec:expr, $relations:expr, $expression:expr) ),* $(,)? ) => {
        /// Type tags of every built-in node, in catalog order.
        pub const NODE_TYPES: &[&str] = &[ $( $tag ),* ];

        pub(super) fn register_default_nodes(builder: &mut NodeRegistryBuilder) {
            $( builder.insert(NodeSpec::new($tag, $label, $codec, $relations, $expression)); )*
        }
    };
}

define_node_catalog! {
    // Filters
    ("Filter.ScriptFilterNode", "Script filter", typed::<ScriptFilterConfig>(), fixed(CONDITION), script(Some(ExpectedKind::Boolean))),
    ("Filter.ScriptSwitchNode", "Script switch", passthrough(json!({ "expression": "" })), fixed(&["Success", "Failure", "True", "False", "Other"]), script(None)),
    ("Filter.MsgTypeFilterNode", "Message type filter", typed::<MsgTypeFilterConfig>(), fixed(CONDITION), None),
    ("Filter.MsgTypeSwitchNode", "Message type switch", typed::<MsgTypeSwitchConfig>(), RelationStrategy::Dynamic(switch_relations), None),
    ("Filter.CheckMessageNode", "Check message", typed::<CheckMessageConfig>(), fixed(&["True", "False", "Missing"]), None),
    ("Filter.CheckRelationNode", "Check relation", passthrough(json!({ "direction": "FROM", "relationType": "Contains" })), fixed(CONDITION), None),
    ("Filter.OriginatorTypeFilterNode", "Originator type filter", passthrough(json!({ "originatorTypes": [] })), fixed(CONDITION), None),
    ("Filter.OriginatorTypeSwitchNode", "Originator type switch", passthrough(json!({})), fixed(&["Other", "Failure"]), None),
    ("Filter.GpsGeofencingFilterNode", "GPS geofencing filter", passthrough(json!({ "latitudeKeyName": "latitude", "longitudeKeyName": "longitude", "perimeterType": "POLYGON" })), fixed(CONDITION), None),
    ("Filter.CheckAlarmStatusNode", "Check alarm status", passthrough(json!({ "alarmStatusList": [] })), fixed(CONDITION), None),

    // Enrichment
    ("Enrichment.OriginatorAttributesNode", "Originator attributes", passthrough(json!({ "clientAttributeNames": [], "sharedAttributeNames": [], "serverAttributeNames": [], "latestTsKeyNames": [] })), fixed(SUCCESS_FAILURE), None),
    ("Enrichment.OriginatorFieldsNode", "Originator fields", passthrough(json!({ "fieldsMapping": {} })), fixed(SUCCESS_FAILURE), None),
    ("Enrichment.RelatedAttributesNode", "Related entity attributes", passthrough(json!({ "attrMapping": {} })), fixed(SUCCESS_FAILURE), None),
    ("Enrichment.TenantAttributesNode", "Tenant attributes", passthrough(json!({ "attrMapping": {} })), fixed(SUCCESS_FAILURE), None),
    ("Enrichment.CustomerAttributesNode", "Customer attributes", passthrough(json!({ "attrMapping": {} })), fixed(SUCCESS_FAILURE), None),
    ("Enrichment.GetTelemetryNode", "Originator telemetry", passthrough(json!({ "latestTsKeyNames": [], "fetchMode": "FIRST" })), fixed(SUCCESS_FAILURE), None),
    ("Enrichment.CalculatedFieldsNode", "Calculated fields", typed::<CalculatedFieldsConfig>(), fixed(SUCCESS_FAILURE), None),

    // Transformation
    ("Transform.ScriptTransformNode", "Script transformation", typed::<TransformConfig>(), fixed(SUCCESS_FAILURE), script(Some(ExpectedKind::Object))),
    ("Transform.RenameKeysNode", "Rename keys", typed::<RenameKeysConfig>(), fixed(SUCCESS_FAILURE), None),
    ("Transform.DeleteKeysNode", "Delete keys", typed::<DeleteKeysConfig>(), fixed(SUCCESS_FAILURE), None),
    ("Transform.SplitArrayMsgNode", "Split array message", typed::<SplitArrayConfig>(), fixed(SUCCESS_FAILURE), script(Some(ExpectedKind::Array))),
    ("Transform.ChangeOriginatorNode", "Change originator", passthrough(json!({ "originatorSource": "CUSTOMER" })), fixed(SUCCESS_FAILURE), None),
    ("Transform.ToEmailNode", "To email", passthrough(json!({ "fromTemplate": "", "toTemplate": "", "subjectTemplate": "", "bodyTemplate": "" })), fixed(SUCCESS_FAILURE), None),
    ("Transform.CopyKeysNode", "Copy keys", passthrough(json!({ "keys": [], "fromMetadata": false })), fixed(SUCCESS_FAILURE), None),
    ("Transform.JsonPathNode", "JSON path", passthrough(json!({ "jsonPath": "$" })), fixed(SUCCESS_FAILURE), None),

    // Telemetry
    ("Telemetry.MsgTimeseriesNode", "Save timeseries", typed::<TimeseriesConfig>(), fixed(SUCCESS_FAILURE), None),
    ("Telemetry.MsgAttributesNode", "Save attributes", typed::<AttributesConfig>(), fixed(SUCCESS_FAILURE), None),
    ("Telemetry.DeleteAttributesNode", "Delete attributes", passthrough(json!({ "scope": "SERVER_SCOPE", "keys": [] })), fixed(SUCCESS_FAILURE), None),

    // Actions
    ("Action.LogNode", "Log", typed::<LogConfig>(), fixed(SUCCESS_FAILURE), None),
    ("Action.CreateAlarmNode", "Create alarm", passthrough(json!({ "alarmType": "General Alarm", "severity": "CRITICAL", "propagate": false })), fixed(&["Created", "Updated", "False", "Failure"]), None),
    ("Action.ClearAlarmNode", "Clear alarm", passthrough(json!({ "alarmType": "General Alarm" })), fixed(&["Cleared", "False", "Failure"]), None),
    ("Action.DelayNode", "Delay", passthrough(json!({ "periodInSeconds": 60, "maxPendingMsgs": 1000 })), fixed(SUCCESS_FAILURE), None),
    ("Action.GeneratorNode", "Generator", passthrough(json!({ "msgCount": 0, "periodInSeconds": 1 })), fixed(SUCCESS_FAILURE), None),
    ("Action.MsgCountNode", "Message count", passthrough(json!({ "interval": 1, "telemetryPrefix": "messageCount" })), fixed(SUCCESS_FAILURE), None),
    ("Action.CreateRelationNode", "Create relation", passthrough(json!({ "direction": "FROM", "relationType": "Contains" })), fixed(SUCCESS_FAILURE), None),
    ("Action.DeleteRelationNode", "Delete relation", passthrough(json!({ "direction": "FROM", "relationType": "Contains" })), fixed(SUCCESS_FAILURE), None),
    ("Action.AssignToCustomerNode", "Assign to customer", passthrough(json!({ "customerNamePattern": "" })), fixed(SUCCESS_FAILURE), None),
    ("Action.UnassignFromCustomerNode", "Unassign from customer", passthrough(json!({ "customerNamePattern": "" })), fixed(SUCCESS_FAILURE), None),
    ("Action.DeviceStateNode", "Device state", passthrough(json!({ "event": "ACTIVITY_EVENT" })), fixed(SUCCESS_FAILURE), None),

    // External
    ("External.RestApiCallNode", "REST API call", passthrough(json!({ "restEndpointUrlPattern": "", "requestMethod": "POST", "headers": {}, "readTimeoutMs": 0 })), fixed(&["Success", "Failure", "Timeout"]), None),
    ("External.MqttNode", "MQTT", passthrough(json!({ "topicPattern": "", "host": "", "port": 1883 })), fixed(SUCCESS_FAILURE), None),
    ("External.KafkaNode", "Kafka", passthrough(json!({ "topicPattern": "", "bootstrapServers": "localhost:9092" })), fixed(SUCCESS_FAILURE), None),
    ("External.SendEmailNode", "Send email", passthrough(json!({ "useSystemSmtpSettings": true })), fixed(SUCCESS_FAILURE), None),
    ("External.SendSmsNode", "Send SMS", passthrough(json!({ "numbersToTemplate": "", "smsMessageTemplate": "" })), fixed(SUCCESS_FAILURE), None),

    // Flow
    ("Flow.RuleChainInputNode", "Rule chain", passthrough(json!({ "ruleChainId": null })), fixed(SUCCESS_FAILURE), None),
    ("Flow.RuleChainOutputNode", "Output", passthrough(json!({})), fixed(&[]), None),
    ("Flow.AckNode", "Acknowledge", passthrough(json!({})), fixed(&["Acknowledged", "Success"]), None),
    ("Flow.CheckpointNode", "Checkpoint", passthrough(json!({ "queueName": "HighPriority" })), fixed(SUCCESS_FAILURE), None),
}
