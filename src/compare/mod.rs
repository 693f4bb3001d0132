//! Golden-file entity comparator
//!
//! Decides structural and value equality between a received and an
//! expected [`EntityTree`]. Entities are paired by position, attribute
//! lists by key. Known nondeterministic attributes are skipped, and
//! scopes whose entities cannot be ordered deterministically are only
//! counted.
//!
//! The walk is fail-fast by default: the first mismatch ends the
//! comparison. [`CompareOptions::collect_all`] keeps walking sibling
//! branches so a single run reports every discrepancy.

mod attributes;
mod entity;
mod mismatch;
pub mod outline;

pub use attributes::compare_attributes;
pub use entity::{compare_entity, compare_events, compare_log_record, compare_span};
pub use mismatch::{EntityPath, Level, Mismatch};

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use crate::otlp::{EntityTree, ResourceGroup, ScopeGroup, Signal};

/// Attribute keys whose values differ on every run
pub const IGNORED_ATTRIBUTES: &[&str] = &["session.id", "log.record.uid", "user_agent.original"];

/// Scopes whose entities are emitted in nondeterministic order
pub const REDUCED_SCOPES: &[&str] = &[
    "@opentelemetry/instrumentation-fetch",
    "@opentelemetry/instrumentation-xml-http-request",
    "@opentelemetry/instrumentation-document-load",
    "@opentelemetry/instrumentation-user-interaction",
];

/// Exclusion and reporting policy for a comparison
#[derive(Debug, Clone)]
pub struct CompareOptions {
    ignored_attributes: BTreeSet<String>,
    reduced_scopes: BTreeSet<String>,
    collect_all: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignored_attributes: IGNORED_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
            reduced_scopes: REDUCED_SCOPES.iter().map(|s| s.to_string()).collect(),
            collect_all: false,
        }
    }
}

impl CompareOptions {
    /// Add attribute keys to the exclusion set
    pub fn ignore_attributes(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.ignored_attributes.extend(keys);
        self
    }

    /// Add scopes to the count-only set
    pub fn reduce_scopes(mut self, scopes: impl IntoIterator<Item = String>) -> Self {
        self.reduced_scopes.extend(scopes);
        self
    }

    /// Report every mismatch instead of stopping at the first
    pub fn collect_all(mut self, collect_all: bool) -> Self {
        self.collect_all = collect_all;
        self
    }

    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignored_attributes.contains(key)
    }

    pub fn is_reduced(&self, scope: &str) -> bool {
        self.reduced_scopes.contains(scope)
    }

    pub fn collects_all(&self) -> bool {
        self.collect_all
    }

    pub fn ignored_attributes(&self) -> impl Iterator<Item = &str> {
        self.ignored_attributes.iter().map(String::as_str)
    }

    pub fn reduced_scopes(&self) -> impl Iterator<Item = &str> {
        self.reduced_scopes.iter().map(String::as_str)
    }
}

/// Verdict of a comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub pass: bool,
    pub message: String,
    pub mismatches: Vec<Mismatch>,
}

impl ComparisonResult {
    fn from_mismatches(mismatches: Vec<Mismatch>) -> Self {
        let message = match mismatches.as_slice() {
            [] => "received telemetry matches expected".to_string(),
            [only] => only.to_string(),
            many => {
                let mut message = format!("{} mismatches:", many.len());
                for (i, m) in many.iter().enumerate() {
                    message.push_str(&format!("\n  {}. {}", i + 1, m));
                }
                message
            }
        };
        Self {
            pass: mismatches.is_empty(),
            message,
            mismatches,
        }
    }
}

/// Compare two optional trees with the default policy
pub fn compare(received: Option<&EntityTree>, expected: Option<&EntityTree>) -> ComparisonResult {
    compare_with(received, expected, &CompareOptions::default())
}

/// Compare two optional trees
///
/// Both absent passes. Exactly one absent is a [`Mismatch::Presence`].
pub fn compare_with(
    received: Option<&EntityTree>,
    expected: Option<&EntityTree>,
    options: &CompareOptions,
) -> ComparisonResult {
    let mismatches = match (received, expected) {
        (None, None) => Vec::new(),
        (Some(received), Some(expected)) => compare_entity_tree(received, expected, options),
        (received, expected) => vec![Mismatch::Presence {
            expected: expected.is_some(),
            received: received.is_some(),
        }],
    };
    ComparisonResult::from_mismatches(mismatches)
}

/// Collected mismatches and whether the walk may continue after one
struct Findings {
    mismatches: Vec<Mismatch>,
    collect_all: bool,
}

impl Findings {
    fn record(&mut self, mismatch: Mismatch) -> ControlFlow<()> {
        tracing::debug!(kind = mismatch.kind(), "{}", mismatch);
        self.mismatches.push(mismatch);
        if self.collect_all {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }

    fn check(&mut self, outcome: Result<(), Mismatch>) -> ControlFlow<()> {
        match outcome {
            Ok(()) => ControlFlow::Continue(()),
            Err(mismatch) => self.record(mismatch),
        }
    }
}

/// Compare two present trees, returning every recorded mismatch
///
/// In fail-fast mode the result holds at most one mismatch.
pub fn compare_entity_tree(
    received: &EntityTree,
    expected: &EntityTree,
    options: &CompareOptions,
) -> Vec<Mismatch> {
    let mut findings = Findings {
        mismatches: Vec::new(),
        collect_all: options.collects_all(),
    };

    if received.len() != expected.len() {
        let _ = findings.record(Mismatch::LengthMismatch {
            path: EntityPath::root(),
            level: Level::ResourceGroups,
            expected: expected.len(),
            received: received.len(),
            diff: Some(outline::tree_diff(received, expected, options)),
        });
        return findings.mismatches;
    }

    for (index, (r, e)) in received.groups.iter().zip(&expected.groups).enumerate() {
        if compare_resource_group(index, r, e, options, &mut findings).is_break() {
            break;
        }
    }
    findings.mismatches
}

/// Compare one resource group: signal, resource attributes, scopes
fn compare_resource_group(
    index: usize,
    received: &ResourceGroup,
    expected: &ResourceGroup,
    options: &CompareOptions,
    findings: &mut Findings,
) -> ControlFlow<()> {
    let path = EntityPath::root().resource(index);

    if received.signal() != expected.signal() {
        return findings.record(Mismatch::SignalMismatch {
            path,
            expected: expected.signal(),
            received: received.signal(),
        });
    }

    if let Err(mismatch) = compare_resource(index, received, expected, options) {
        return findings.record(mismatch);
    }

    let received_scopes = received.scopes();
    let expected_scopes = expected.scopes();
    if received_scopes.len() != expected_scopes.len() {
        return findings.record(Mismatch::LengthMismatch {
            path,
            level: Level::Scopes,
            expected: expected_scopes.len(),
            received: received_scopes.len(),
            diff: None,
        });
    }

    for (scope_index, (r, e)) in received_scopes.iter().zip(&expected_scopes).enumerate() {
        let scope_path = path.scope(scope_index, e.name());
        if compare_scope(&scope_path, expected.signal(), r, e, options, findings).is_break() {
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

/// Compare resource attributes when both sides carry a resource
fn compare_resource(
    index: usize,
    received: &ResourceGroup,
    expected: &ResourceGroup,
    options: &CompareOptions,
) -> Result<(), Mismatch> {
    let (Some(r), Some(e)) = (received.resource(), expected.resource()) else {
        return Ok(());
    };
    let path = EntityPath::root().resource(index).resource_attributes();
    compare_attributes(&path, &r.attributes, &e.attributes, options).map_err(|source| {
        Mismatch::ResourceMismatch {
            index,
            source: Box::new(source),
        }
    })
}

/// Compare one scope: identity, entity count, then entities unless reduced
fn compare_scope(
    path: &EntityPath,
    signal: Signal,
    received: &ScopeGroup<'_>,
    expected: &ScopeGroup<'_>,
    options: &CompareOptions,
    findings: &mut Findings,
) -> ControlFlow<()> {
    if received.name() != expected.name() {
        return findings.record(Mismatch::ScopeMismatch {
            path: path.clone(),
            expected: expected.name().to_string(),
            received: received.name().to_string(),
        });
    }

    if received.entities.len() != expected.entities.len() {
        return findings.record(Mismatch::LengthMismatch {
            path: path.clone(),
            level: Level::Entities(signal),
            expected: expected.entities.len(),
            received: received.entities.len(),
            diff: None,
        });
    }

    if options.is_reduced(expected.name()) {
        tracing::trace!(scope = expected.name(), "Reduced scope, entity content not compared");
        return ControlFlow::Continue(());
    }

    for (index, (r, e)) in received.entities.iter().zip(&expected.entities).enumerate() {
        let entity_path = path.entity(e.label(), index);
        if findings
            .check(compare_entity(&entity_path, r, e, options))
            .is_break()
        {
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}
