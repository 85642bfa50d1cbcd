// Log Entries
//
// Typed view of the entry resources returned by the logging API, and the
// factory that builds them from decoded JSON.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::client::Client;
use crate::logger::Logger;

pub mod timestamp;

pub use timestamp::{format_rfc3339_nanos, parse_rfc3339_nanos};

/// Payload carried by an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `textPayload`: a plain string.
    Text(String),

    /// `jsonPayload`: a structured object, kept in wire order.
    Struct(Map<String, Value>),
}

/// One immutable log record.
#[derive(Debug, Clone)]
pub struct Entry {
    insert_id: String,
    timestamp: DateTime<Utc>,
    logger: Arc<Logger>,
    resource: Map<String, Value>,
    severity: Option<String>,
    labels: BTreeMap<String, String>,
    payload: Payload,
}

impl Entry {
    pub fn insert_id(&self) -> &str {
        &self.insert_id
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Monitored-resource descriptor, passed through uninterpreted.
    pub fn resource(&self) -> &Map<String, Value> {
        &self.resource
    }

    pub fn severity(&self) -> Option<&str> {
        self.severity.as_deref()
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// Entry resource as decoded from the wire, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    pub log_name: Option<String>,
    pub insert_id: Option<String>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub resource: Map<String, Value>,
    pub severity: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub text_payload: Option<String>,
    pub json_payload: Option<Map<String, Value>>,
}

impl RawEntry {
    pub fn from_value(value: Value) -> Result<Self, EntryError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Reasons an entry resource cannot be turned into an `Entry`.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("entry resource has neither textPayload nor jsonPayload")]
    UnknownPayload,

    #[error("entry resource has both textPayload and jsonPayload")]
    AmbiguousPayload,

    #[error("entry resource is missing `{0}`")]
    MissingField(&'static str),

    #[error("invalid log name `{0}`: expected projects/{{project}}/logs/{{name}}")]
    InvalidLogName(String),

    #[error("invalid timestamp `{value}`: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("entry resource could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl EntryError {
    /// Every entry error is a rejection of caller/server-supplied input.
    pub fn is_invalid_argument(&self) -> bool {
        true
    }
}

/// Build a typed entry from its raw resource.
///
/// Loggers are resolved through `loggers`; a name not yet present gets a new
/// handle bound to `client`, so entries sharing a `logName` share a handle.
pub fn materialize(
    client: &Client,
    raw: RawEntry,
    loggers: &mut HashMap<String, Arc<Logger>>,
) -> Result<Entry, EntryError> {
    let payload = match (raw.text_payload, raw.json_payload) {
        (Some(text), None) => Payload::Text(text),
        (None, Some(object)) => Payload::Struct(object),
        (Some(_), Some(_)) => return Err(EntryError::AmbiguousPayload),
        (None, None) => return Err(EntryError::UnknownPayload),
    };

    let log_name = raw.log_name.ok_or(EntryError::MissingField("logName"))?;
    let insert_id = raw.insert_id.ok_or(EntryError::MissingField("insertId"))?;
    let raw_timestamp = raw.timestamp.ok_or(EntryError::MissingField("timestamp"))?;

    let (project, name) =
        split_log_name(&log_name).ok_or_else(|| EntryError::InvalidLogName(log_name.clone()))?;

    if project != client.project() {
        debug!(
            log_name = %log_name,
            client_project = client.project(),
            "entry belongs to a different project than its client"
        );
    }

    let logger = match loggers.get(name) {
        Some(logger) => Arc::clone(logger),
        None => {
            trace!(logger = name, "creating logger handle");
            let logger = Arc::new(client.logger(name));
            loggers.insert(name.to_string(), Arc::clone(&logger));
            logger
        }
    };

    let timestamp = parse_rfc3339_nanos(&raw_timestamp).map_err(|source| {
        EntryError::InvalidTimestamp {
            value: raw_timestamp.clone(),
            source,
        }
    })?;

    Ok(Entry {
        insert_id,
        timestamp,
        logger,
        resource: raw.resource,
        severity: raw.severity,
        labels: raw.labels,
        payload,
    })
}

/// Split `projects/{project}/logs/{name}` into its project and name.
fn split_log_name(log_name: &str) -> Option<(&str, &str)> {
    let rest = log_name.strip_prefix("projects/")?;
    let (project, name) = rest.split_once("/logs/")?;

    if project.is_empty() || project.contains('/') || name.is_empty() {
        return None;
    }
    Some((project, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ReplayTransport;
    use serde_json::json;

    const TIMESTAMP: &str = "2016-03-01T12:34:56.123456789Z";

    fn client() -> Client {
        Client::new("PROJECT", Arc::new(ReplayTransport::default()))
    }

    fn raw(value: Value) -> RawEntry {
        RawEntry::from_value(value).unwrap()
    }

    #[test]
    fn text_payload_builds_text_entry() {
        let client = client();
        let mut loggers = HashMap::new();

        let entry = materialize(
            &client,
            raw(json!({
                "logName": "projects/PROJECT/logs/LOGGER_NAME",
                "insertId": "IID1",
                "timestamp": TIMESTAMP,
                "resource": {"type": "global"},
                "textPayload": "TEXT",
            })),
            &mut loggers,
        )
        .unwrap();

        assert_eq!(entry.payload(), &Payload::Text("TEXT".into()));
        assert_eq!(entry.insert_id(), "IID1");
        assert_eq!(format_rfc3339_nanos(entry.timestamp()), TIMESTAMP);
        assert_eq!(entry.resource().get("type"), Some(&json!("global")));
        assert_eq!(entry.logger().name(), "LOGGER_NAME");
        assert!(Client::ptr_eq(entry.logger().client(), &client));
        assert_eq!(loggers.len(), 1);
    }

    #[test]
    fn json_payload_builds_struct_entry() {
        let client = client();
        let mut loggers = HashMap::new();
        let payload = json!({"message": "MESSAGE", "weather": "partly cloudy"});

        let entry = materialize(
            &client,
            raw(json!({
                "logName": "projects/PROJECT/logs/LOGGER_NAME",
                "insertId": "IID1",
                "timestamp": TIMESTAMP,
                "severity": "ERROR",
                "labels": {"zone": "us-central1-a"},
                "jsonPayload": payload,
            })),
            &mut loggers,
        )
        .unwrap();

        match entry.payload() {
            Payload::Struct(object) => assert_eq!(Value::Object(object.clone()), payload),
            other => panic!("expected struct payload, got {other:?}"),
        }
        assert_eq!(entry.severity(), Some("ERROR"));
        assert_eq!(entry.labels().get("zone").map(String::as_str), Some("us-central1-a"));
        assert!(entry.resource().is_empty());
    }

    #[test]
    fn unknown_payload_is_rejected() {
        let client = client();
        let mut loggers = HashMap::new();

        let err = materialize(&client, raw(json!({"unknownPayload": {}})), &mut loggers)
            .unwrap_err();

        assert!(matches!(err, EntryError::UnknownPayload));
        assert!(err.is_invalid_argument());
        assert!(loggers.is_empty());
    }

    #[test]
    fn both_payloads_are_rejected() {
        let err = materialize(
            &client(),
            raw(json!({
                "logName": "projects/PROJECT/logs/LOGGER_NAME",
                "insertId": "IID1",
                "timestamp": TIMESTAMP,
                "textPayload": "TEXT",
                "jsonPayload": {},
            })),
            &mut HashMap::new(),
        )
        .unwrap_err();

        assert!(matches!(err, EntryError::AmbiguousPayload));
    }

    #[test]
    fn cached_logger_is_reused() {
        let client = client();
        let mut loggers = HashMap::new();
        let resource = json!({
            "logName": "projects/PROJECT/logs/LOGGER_NAME",
            "insertId": "IID",
            "timestamp": TIMESTAMP,
            "textPayload": "TEXT",
        });

        let first = materialize(&client, raw(resource.clone()), &mut loggers).unwrap();
        let second = materialize(&client, raw(resource), &mut loggers).unwrap();

        assert!(Arc::ptr_eq(first.logger(), second.logger()));
        assert_eq!(loggers.len(), 1);
    }

    #[test]
    fn foreign_project_log_name_keeps_client_project() {
        let entry = materialize(
            &client(),
            raw(json!({
                "logName": "projects/OTHER/logs/syslog",
                "insertId": "IID",
                "timestamp": TIMESTAMP,
                "textPayload": "TEXT",
            })),
            &mut HashMap::new(),
        )
        .unwrap();

        assert_eq!(entry.logger().name(), "syslog");
        assert_eq!(entry.logger().project(), "PROJECT");
    }

    #[test]
    fn malformed_log_name_is_rejected() {
        for log_name in ["syslog", "projects//logs/syslog", "projects/PROJECT/logs/", "projects/a/b/logs/c"] {
            let err = materialize(
                &client(),
                raw(json!({
                    "logName": log_name,
                    "insertId": "IID",
                    "timestamp": TIMESTAMP,
                    "textPayload": "TEXT",
                })),
                &mut HashMap::new(),
            )
            .unwrap_err();

            assert!(
                matches!(err, EntryError::InvalidLogName(ref name) if name == log_name),
                "unexpected error for {log_name}: {err}"
            );
        }
    }

    #[test]
    fn missing_insert_id_is_rejected() {
        let err = materialize(
            &client(),
            raw(json!({
                "logName": "projects/PROJECT/logs/syslog",
                "timestamp": TIMESTAMP,
                "textPayload": "TEXT",
            })),
            &mut HashMap::new(),
        )
        .unwrap_err();

        assert!(matches!(err, EntryError::MissingField("insertId")));
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let err = materialize(
            &client(),
            raw(json!({
                "logName": "projects/PROJECT/logs/syslog",
                "insertId": "IID",
                "timestamp": "not-a-time",
                "textPayload": "TEXT",
            })),
            &mut HashMap::new(),
        )
        .unwrap_err();

        assert!(matches!(err, EntryError::InvalidTimestamp { ref value, .. } if value == "not-a-time"));
    }

    #[test]
    fn non_object_json_payload_fails_to_decode() {
        let err = RawEntry::from_value(json!({"jsonPayload": "not an object"})).unwrap_err();
        assert!(matches!(err, EntryError::Decode(_)));
    }
}
