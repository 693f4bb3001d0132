//! Attribute values and attribute lists as carried by OTLP/JSON

use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fmt;

/// A resolved OTLP `AnyValue`
///
/// `intValue` is accepted both as a JSON number and as a decimal string
/// since OTLP/JSON encodes 64-bit integers as strings.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Option<RawAnyValue>")]
pub enum AttributeValue {
    String(String),
    Int(i64),
    Bool(bool),
    Double(f64),
    Bytes(String),
    Array(Vec<AttributeValue>),
    KvList(Vec<KeyValue>),
    #[default]
    Null,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnyValue {
    string_value: Option<String>,
    int_value: Option<IntRepr>,
    bool_value: Option<bool>,
    double_value: Option<f64>,
    bytes_value: Option<String>,
    array_value: Option<RawValues<AttributeValue>>,
    kvlist_value: Option<RawValues<KeyValue>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntRepr {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(bound = "T: Deserialize<'de>")]
struct RawValues<T> {
    #[serde(default)]
    values: Vec<T>,
}

impl TryFrom<Option<RawAnyValue>> for AttributeValue {
    type Error = String;

    fn try_from(raw: Option<RawAnyValue>) -> Result<Self, Self::Error> {
        let Some(raw) = raw else {
            return Ok(Self::Null);
        };

        let mut resolved = Vec::with_capacity(1);
        if let Some(s) = raw.string_value {
            resolved.push(Self::String(s));
        }
        if let Some(i) = raw.int_value {
            resolved.push(Self::Int(match i {
                IntRepr::Number(n) => n,
                IntRepr::Text(t) => t
                    .trim()
                    .parse()
                    .map_err(|_| format!("intValue '{}' is not a 64-bit integer", t))?,
            }));
        }
        if let Some(b) = raw.bool_value {
            resolved.push(Self::Bool(b));
        }
        if let Some(d) = raw.double_value {
            resolved.push(Self::Double(d));
        }
        if let Some(b) = raw.bytes_value {
            resolved.push(Self::Bytes(b));
        }
        if let Some(a) = raw.array_value {
            resolved.push(Self::Array(a.values));
        }
        if let Some(kv) = raw.kvlist_value {
            resolved.push(Self::KvList(kv.values));
        }

        match resolved.len() {
            0 => Ok(Self::Null),
            1 => Ok(resolved.remove(0)),
            n => Err(format!("AnyValue carries {} variants, expected exactly one", n)),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{:?}", s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Double(d) => write!(f, "{:?}", d),
            Self::Bytes(b) => write!(f, "bytes({})", b),
            Self::Array(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            Self::KvList(entries) => {
                f.write_str("{")?;
                for (i, kv) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", kv)?;
                }
                f.write_str("}")
            }
            Self::Null => f.write_str("null"),
        }
    }
}

/// A single attribute
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyValue {
    pub key: String,
    #[serde(default)]
    pub value: AttributeValue,
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}={}", self.key, self.value)
    }
}

/// An attribute list with unique keys
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes(Vec<KeyValue>);

impl Attributes {
    /// Build an attribute list, rejecting duplicate keys
    pub fn new(entries: Vec<KeyValue>) -> Result<Self, String> {
        let mut seen = HashSet::with_capacity(entries.len());
        for kv in &entries {
            if !seen.insert(kv.key.as_str()) {
                return Err(format!("duplicate attribute key '{}'", kv.key));
            }
        }
        Ok(Self(entries))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries ordered by key
    pub fn sorted(&self) -> Vec<&KeyValue> {
        let mut entries: Vec<&KeyValue> = self.0.iter().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Option::<Vec<KeyValue>>::deserialize(deserializer)?.unwrap_or_default();
        Self::new(entries).map_err(serde::de::Error::custom)
    }
}
