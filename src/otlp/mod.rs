//! OTLP/JSON entity trees
//!
//! Captured export payloads and golden documents are both parsed into an
//! [`EntityTree`]. Accepted shapes:
//!
//! - one export request body: `{"resourceSpans": [...]}`, `{"resourceLogs": [...]}`
//!   or both keys (spans first)
//! - an array of export request bodies, concatenated in order
//! - a bare array of resource groups

mod types;
mod value;

pub use types::*;
pub use value::{AttributeValue, Attributes, KeyValue};

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::common::{Error, Result};

const RESOURCE_SPANS: &str = "resourceSpans";
const RESOURCE_LOGS: &str = "resourceLogs";

/// An ordered sequence of resource groups
#[derive(Debug, Clone, Default)]
pub struct EntityTree {
    pub groups: Vec<ResourceGroup>,
}

impl EntityTree {
    /// Parse a tree from an already decoded JSON document
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut groups = Vec::new();
        match value {
            Value::Object(_) => push_export_body(value, &mut groups).map_err(Error::Payload)?,
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if is_export_body(item) {
                        push_export_body(item, &mut groups)
                            .map_err(|e| Error::Payload(format!("request {}: {}", i, e)))?;
                    } else {
                        groups.push(
                            parse_group(item)
                                .map_err(|e| Error::Payload(format!("entry {}: {}", i, e)))?,
                        );
                    }
                }
            }
            other => {
                return Err(Error::Payload(format!(
                    "expected an object or array, got {}",
                    json_kind(other)
                )))
            }
        }
        Ok(Self { groups })
    }

    /// Parse a tree from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Read and decode a captured payload file
pub fn read_payload(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
    serde_json::from_str(&text)
        .map_err(|e| Error::Payload(format!("{} is not valid JSON: {}", path.display(), e)))
}

/// Number of export request bodies in a payload
///
/// An object counts as one request, an array counts its export bodies.
/// A bare array of resource groups carries no request boundaries and
/// counts as one request.
pub fn count_export_requests(value: &Value) -> usize {
    match value {
        Value::Object(_) => 1,
        Value::Array(items) => {
            let bodies = items.iter().filter(|item| is_export_body(item)).count();
            if bodies == 0 && !items.is_empty() {
                1
            } else {
                bodies
            }
        }
        _ => 0,
    }
}

fn is_export_body(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|o| o.contains_key(RESOURCE_SPANS) || o.contains_key(RESOURCE_LOGS))
}

fn push_export_body(
    value: &Value,
    groups: &mut Vec<ResourceGroup>,
) -> std::result::Result<(), String> {
    let Some(body) = value.as_object() else {
        return Err("export body must be an object".to_string());
    };
    if !is_export_body(value) {
        return Err(format!(
            "export body has neither '{}' nor '{}'",
            RESOURCE_SPANS, RESOURCE_LOGS
        ));
    }

    if let Some(spans) = body.get(RESOURCE_SPANS).filter(|v| !v.is_null()) {
        let parsed = Vec::<ResourceSpans>::deserialize(spans)
            .map_err(|e| format!("{}: {}", RESOURCE_SPANS, e))?;
        groups.extend(parsed.into_iter().map(ResourceGroup::Spans));
    }
    if let Some(logs) = body.get(RESOURCE_LOGS).filter(|v| !v.is_null()) {
        let parsed = Vec::<ResourceLogs>::deserialize(logs)
            .map_err(|e| format!("{}: {}", RESOURCE_LOGS, e))?;
        groups.extend(parsed.into_iter().map(ResourceGroup::Logs));
    }
    Ok(())
}

/// Discriminate a resource group by its scope field
fn parse_group(value: &Value) -> std::result::Result<ResourceGroup, String> {
    let Some(group) = value.as_object() else {
        return Err(format!(
            "resource group must be an object, got {}",
            json_kind(value)
        ));
    };
    match (group.contains_key("scopeSpans"), group.contains_key("scopeLogs")) {
        (true, false) => ResourceSpans::deserialize(value)
            .map(ResourceGroup::Spans)
            .map_err(|e| e.to_string()),
        (false, true) => ResourceLogs::deserialize(value)
            .map(ResourceGroup::Logs)
            .map_err(|e| e.to_string()),
        (true, true) => Err("resource group has both 'scopeSpans' and 'scopeLogs'".to_string()),
        (false, false) => {
            Err("resource group has neither 'scopeSpans' nor 'scopeLogs'".to_string())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
