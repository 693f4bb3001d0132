//! Comparison failures and the index paths that localize them

use std::fmt;
use thiserror::Error;

use crate::otlp::Signal;

/// Location of a mismatch inside an entity tree
///
/// Renders as `resource[0].scope[1]("app").span[2].event[0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityPath {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Resource(usize),
    ResourceAttributes,
    Scope { index: usize, name: String },
    Entity { label: &'static str, index: usize },
    Event(usize),
}

impl EntityPath {
    /// The tree itself
    pub fn root() -> Self {
        Self::default()
    }

    pub fn resource(&self, index: usize) -> Self {
        self.with(Segment::Resource(index))
    }

    pub fn resource_attributes(&self) -> Self {
        self.with(Segment::ResourceAttributes)
    }

    pub fn scope(&self, index: usize, name: &str) -> Self {
        self.with(Segment::Scope {
            index,
            name: name.to_string(),
        })
    }

    pub fn entity(&self, label: &'static str, index: usize) -> Self {
        self.with(Segment::Entity { label, index })
    }

    pub fn event(&self, index: usize) -> Self {
        self.with(Segment::Event(index))
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn with(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Resource(index) => write!(f, "resource[{}]", index)?,
                Segment::ResourceAttributes => f.write_str("resource")?,
                Segment::Scope { index, name } => write!(f, "scope[{}]({:?})", index, name)?,
                Segment::Entity { label, index } => write!(f, "{}[{}]", label, index)?,
                Segment::Event(index) => write!(f, "event[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// What a length mismatch counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    ResourceGroups,
    Scopes,
    Entities(Signal),
    Attributes,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceGroups => f.write_str("resource groups"),
            Self::Scopes => f.write_str("scopes"),
            Self::Entities(signal) => f.write_str(signal.entity_label()),
            Self::Attributes => f.write_str("attributes"),
        }
    }
}

/// A single reason two entity trees differ
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Mismatch {
    #[error("expected telemetry to be {}, but it was {}", presence(.expected), presence(.received))]
    Presence { expected: bool, received: bool },

    #[error("{path}: expected {expected} {level}, got {received}{}", diff_suffix(.diff))]
    LengthMismatch {
        path: EntityPath,
        level: Level,
        expected: usize,
        received: usize,
        diff: Option<String>,
    },

    #[error("{path}: expected {expected}, got {received}")]
    SignalMismatch {
        path: EntityPath,
        expected: Signal,
        received: Signal,
    },

    #[error("resource {index} differs: {source}")]
    ResourceMismatch {
        index: usize,
        #[source]
        source: Box<Mismatch>,
    },

    #[error("{path}: expected scope {expected:?}, got {received:?}")]
    ScopeMismatch {
        path: EntityPath,
        expected: String,
        received: String,
    },

    #[error("{path}: {}", describe_attribute(.key, .received_key, .expected, .received))]
    AttributeMismatch {
        path: EntityPath,
        key: String,
        /// Set when the keys themselves differ
        received_key: Option<String>,
        expected: String,
        received: String,
    },

    #[error("{path}: field '{field}' expected {expected}, got {received}")]
    ScalarFieldMismatch {
        path: EntityPath,
        field: &'static str,
        expected: String,
        received: String,
    },

    #[error("{path}: expected {expected} events, got {received}")]
    EventCountMismatch {
        path: EntityPath,
        expected: usize,
        received: usize,
    },
}

impl Mismatch {
    /// Short stable name of the mismatch kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Presence { .. } => "presence",
            Self::LengthMismatch { .. } => "length",
            Self::SignalMismatch { .. } => "signal",
            Self::ResourceMismatch { .. } => "resource",
            Self::ScopeMismatch { .. } => "scope",
            Self::AttributeMismatch { .. } => "attribute",
            Self::ScalarFieldMismatch { .. } => "field",
            Self::EventCountMismatch { .. } => "event-count",
        }
    }
}

fn presence(present: &bool) -> &'static str {
    if *present {
        "present"
    } else {
        "absent"
    }
}

fn diff_suffix(diff: &Option<String>) -> String {
    match diff {
        Some(diff) if !diff.is_empty() => format!("\n{}", diff.trim_end()),
        _ => String::new(),
    }
}

fn describe_attribute(
    key: &str,
    received_key: &Option<String>,
    expected: &str,
    received: &str,
) -> String {
    match received_key {
        Some(received_key) => format!(
            "attribute key mismatch, expected {:?}={}, got {:?}={}",
            key, expected, received_key, received
        ),
        None => format!("attribute {:?} expected {}, got {}", key, expected, received),
    }
}
