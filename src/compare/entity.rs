//! Span, log record and event comparison
//!
//! Core scalar fields are checked as one unit before attributes. Ids and
//! timestamps are not part of the core and never compared.

use super::attributes::compare_attributes;
use super::mismatch::{EntityPath, Mismatch};
use super::CompareOptions;
use crate::otlp::{Entity, Event, LogRecord, Signal, Span};

/// The first core field that differs, rendered for the report
struct Difference {
    field: &'static str,
    expected: String,
    received: String,
}

/// Compare one typed field, rendering both sides only when they differ
fn differs<T: PartialEq + ?Sized>(
    field: &'static str,
    received: &T,
    expected: &T,
    render: fn(&T) -> String,
) -> Option<Difference> {
    (received != expected).then(|| Difference {
        field,
        expected: render(expected),
        received: render(received),
    })
}

fn quoted(s: &str) -> String {
    format!("{:?}", s)
}

fn shown<T: ToString>(value: &T) -> String {
    value.to_string()
}

fn span_core(r: &Span, e: &Span) -> Option<Difference> {
    differs("name", r.name.as_str(), e.name.as_str(), quoted)
        .or_else(|| differs("kind", &r.kind, &e.kind, shown))
        .or_else(|| differs("status.code", &r.status.code, &e.status.code, shown))
        .or_else(|| {
            differs(
                "status.message",
                r.status.message.as_str(),
                e.status.message.as_str(),
                quoted,
            )
        })
        .or_else(|| {
            differs(
                "droppedAttributesCount",
                &r.dropped_attributes_count,
                &e.dropped_attributes_count,
                shown,
            )
        })
        .or_else(|| {
            differs(
                "droppedEventsCount",
                &r.dropped_events_count,
                &e.dropped_events_count,
                shown,
            )
        })
        .or_else(|| {
            differs(
                "droppedLinksCount",
                &r.dropped_links_count,
                &e.dropped_links_count,
                shown,
            )
        })
}

fn log_core(r: &LogRecord, e: &LogRecord) -> Option<Difference> {
    differs("body", &r.body, &e.body, shown)
        .or_else(|| differs("severityNumber", &r.severity_number, &e.severity_number, shown))
        .or_else(|| {
            differs(
                "severityText",
                r.severity_text.as_str(),
                e.severity_text.as_str(),
                quoted,
            )
        })
        .or_else(|| {
            differs(
                "droppedAttributesCount",
                &r.dropped_attributes_count,
                &e.dropped_attributes_count,
                shown,
            )
        })
}

fn event_core(r: &Event, e: &Event) -> Option<Difference> {
    differs("name", r.name.as_str(), e.name.as_str(), quoted).or_else(|| {
        differs(
            "droppedAttributesCount",
            &r.dropped_attributes_count,
            &e.dropped_attributes_count,
            shown,
        )
    })
}

/// Core fields are one equality check, reported by the first field that differs
fn compare_core(path: &EntityPath, difference: Option<Difference>) -> Result<(), Mismatch> {
    match difference {
        Some(d) => Err(Mismatch::ScalarFieldMismatch {
            path: path.clone(),
            field: d.field,
            expected: d.expected,
            received: d.received,
        }),
        None => Ok(()),
    }
}

/// Compare two entities of the same scope position
pub fn compare_entity(
    path: &EntityPath,
    received: &Entity<'_>,
    expected: &Entity<'_>,
    options: &CompareOptions,
) -> Result<(), Mismatch> {
    match (received, expected) {
        (Entity::Span(r), Entity::Span(e)) => compare_span(path, r, e, options),
        (Entity::LogRecord(r), Entity::LogRecord(e)) => compare_log_record(path, r, e, options),
        (r, e) => Err(Mismatch::SignalMismatch {
            path: path.clone(),
            expected: signal_of(e),
            received: signal_of(r),
        }),
    }
}

fn signal_of(entity: &Entity<'_>) -> Signal {
    match entity {
        Entity::Span(_) => Signal::Spans,
        Entity::LogRecord(_) => Signal::Logs,
    }
}

/// Compare two spans: core fields, attributes, then events
pub fn compare_span(
    path: &EntityPath,
    received: &Span,
    expected: &Span,
    options: &CompareOptions,
) -> Result<(), Mismatch> {
    compare_core(path, span_core(received, expected))?;
    compare_attributes(path, &received.attributes, &expected.attributes, options)?;
    compare_events(path, &received.events, &expected.events, options)
}

/// Compare two log records: core fields, then attributes
pub fn compare_log_record(
    path: &EntityPath,
    received: &LogRecord,
    expected: &LogRecord,
    options: &CompareOptions,
) -> Result<(), Mismatch> {
    compare_core(path, log_core(received, expected))?;
    compare_attributes(path, &received.attributes, &expected.attributes, options)
}

/// Compare span events by position
pub fn compare_events(
    path: &EntityPath,
    received: &[Event],
    expected: &[Event],
    options: &CompareOptions,
) -> Result<(), Mismatch> {
    if received.len() != expected.len() {
        return Err(Mismatch::EventCountMismatch {
            path: path.clone(),
            expected: expected.len(),
            received: received.len(),
        });
    }

    for (index, (r, e)) in received.iter().zip(expected).enumerate() {
        let path = path.event(index);
        compare_core(&path, event_core(r, e))?;
        compare_attributes(&path, &r.attributes, &e.attributes, options)?;
    }
    Ok(())
}
