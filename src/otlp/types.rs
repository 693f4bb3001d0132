//! OTLP/JSON trace and log types
//!
//! These model the fields the comparator and the outline renderer need,
//! not the complete OTLP protocol. Identifiers and timestamps are kept
//! as they arrive so golden documents can be inspected, but they never
//! take part in comparisons.

use serde::{Deserialize, Deserializer};
use std::fmt;

use super::value::{AttributeValue, Attributes};

/// Deserialize `null` the same way as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which signal a resource group carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Spans,
    Logs,
}

impl Signal {
    /// Plural label for the entities of this signal
    pub fn entity_label(self) -> &'static str {
        match self {
            Self::Spans => "spans",
            Self::Logs => "log records",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spans => f.write_str("resourceSpans"),
            Self::Logs => f.write_str("resourceLogs"),
        }
    }
}

/// The process or page producing telemetry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dropped_attributes_count: u32,
}

/// Instrumentation scope identity
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentationScope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

/// Span status
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Status {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// A timed event attached to a span
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub time_unix_nano: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dropped_attributes_count: u32,
}

/// A single traced operation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    #[serde(default, deserialize_with = "null_as_default")]
    pub trace_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub span_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parent_span_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kind: i32,
    #[serde(default)]
    pub start_time_unix_nano: serde_json::Value,
    #[serde(default)]
    pub end_time_unix_nano: serde_json::Value,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dropped_attributes_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dropped_events_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dropped_links_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
}

/// A discrete log entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    #[serde(default)]
    pub time_unix_nano: serde_json::Value,
    #[serde(default)]
    pub observed_time_unix_nano: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity_number: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity_text: String,
    #[serde(default)]
    pub body: AttributeValue,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dropped_attributes_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trace_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub span_id: String,
}

/// Spans grouped under one instrumentation scope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSpans {
    #[serde(default, deserialize_with = "null_as_default")]
    pub scope: InstrumentationScope,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spans: Vec<Span>,
}

/// Log records grouped under one instrumentation scope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeLogs {
    #[serde(default, deserialize_with = "null_as_default")]
    pub scope: InstrumentationScope,
    #[serde(default, deserialize_with = "null_as_default")]
    pub log_records: Vec<LogRecord>,
}

/// Span scopes under one resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpans {
    #[serde(default)]
    pub resource: Option<Resource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scope_spans: Vec<ScopeSpans>,
}

/// Log scopes under one resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLogs {
    #[serde(default)]
    pub resource: Option<Resource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scope_logs: Vec<ScopeLogs>,
}

/// A resource group, discriminated once at parse time
#[derive(Debug, Clone)]
pub enum ResourceGroup {
    Spans(ResourceSpans),
    Logs(ResourceLogs),
}

impl ResourceGroup {
    pub fn signal(&self) -> Signal {
        match self {
            Self::Spans(_) => Signal::Spans,
            Self::Logs(_) => Signal::Logs,
        }
    }

    pub fn resource(&self) -> Option<&Resource> {
        match self {
            Self::Spans(rs) => rs.resource.as_ref(),
            Self::Logs(rl) => rl.resource.as_ref(),
        }
    }

    /// Scope groups in document order
    pub fn scopes(&self) -> Vec<ScopeGroup<'_>> {
        match self {
            Self::Spans(rs) => rs
                .scope_spans
                .iter()
                .map(|ss| ScopeGroup {
                    scope: &ss.scope,
                    entities: ss.spans.iter().map(Entity::Span).collect(),
                })
                .collect(),
            Self::Logs(rl) => rl
                .scope_logs
                .iter()
                .map(|sl| ScopeGroup {
                    scope: &sl.scope,
                    entities: sl.log_records.iter().map(Entity::LogRecord).collect(),
                })
                .collect(),
        }
    }
}

/// A borrowed view of one scope and its entities
#[derive(Debug, Clone)]
pub struct ScopeGroup<'a> {
    pub scope: &'a InstrumentationScope,
    pub entities: Vec<Entity<'a>>,
}

impl ScopeGroup<'_> {
    pub fn name(&self) -> &str {
        &self.scope.name
    }
}

/// A telemetry entity inside a scope
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Span(&'a Span),
    LogRecord(&'a LogRecord),
}

impl Entity<'_> {
    /// Singular label used in index paths
    pub fn label(&self) -> &'static str {
        match self {
            Self::Span(_) => "span",
            Self::LogRecord(_) => "log",
        }
    }
}
