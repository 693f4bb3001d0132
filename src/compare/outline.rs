//! Text outlines of entity trees, used to render structural diffs
//!
//! Excluded attributes are left out so the diff only shows differences
//! that can fail a comparison. Reduced scopes only show their entity count.

use similar::TextDiff;
use std::fmt::Write;

use super::CompareOptions;
use crate::otlp::{Attributes, Entity, EntityTree, ResourceGroup};

/// Render a tree as an indented outline
pub fn render_tree(tree: &EntityTree, options: &CompareOptions) -> String {
    let mut out = String::new();
    for (index, group) in tree.groups.iter().enumerate() {
        render_group(&mut out, index, group, options);
    }
    out
}

/// Unified diff between the outlines of the expected and received trees
pub fn tree_diff(received: &EntityTree, expected: &EntityTree, options: &CompareOptions) -> String {
    unified(&render_tree(expected, options), &render_tree(received, options))
}

/// Unified diff between two attribute lists, one `key = value` per line
pub fn attribute_diff(received: &Attributes, expected: &Attributes) -> String {
    unified(&render_attribute_lines(expected), &render_attribute_lines(received))
}

fn unified(expected: &str, received: &str) -> String {
    TextDiff::from_lines(expected, received)
        .unified_diff()
        .context_radius(3)
        .header("expected", "received")
        .to_string()
}

fn render_attribute_lines(attributes: &Attributes) -> String {
    let mut out = String::new();
    for kv in attributes.sorted() {
        let _ = writeln!(out, "{} = {}", kv.key, kv.value);
    }
    out
}

fn render_group(out: &mut String, index: usize, group: &ResourceGroup, options: &CompareOptions) {
    let _ = writeln!(out, "resource[{}] {}", index, group.signal());
    if let Some(resource) = group.resource() {
        render_attributes(out, 1, &resource.attributes, options);
    }

    for (scope_index, scope) in group.scopes().iter().enumerate() {
        let _ = writeln!(out, "  scope[{}] {:?}", scope_index, scope.name());
        if options.is_reduced(scope.name()) {
            let _ = writeln!(
                out,
                "    ({} {}, content not compared)",
                scope.entities.len(),
                group.signal().entity_label()
            );
            continue;
        }

        for (entity_index, entity) in scope.entities.iter().enumerate() {
            render_entity(out, entity_index, entity, options);
        }
    }
}

fn render_entity(out: &mut String, index: usize, entity: &Entity<'_>, options: &CompareOptions) {
    match entity {
        Entity::Span(span) => {
            let _ = writeln!(
                out,
                "    span[{}] {:?} kind={} status={}",
                index, span.name, span.kind, span.status.code
            );
            render_attributes(out, 3, &span.attributes, options);
            for (event_index, event) in span.events.iter().enumerate() {
                let _ = writeln!(out, "      event[{}] {:?}", event_index, event.name);
                render_attributes(out, 4, &event.attributes, options);
            }
        }
        Entity::LogRecord(log) => {
            let _ = writeln!(
                out,
                "    log[{}] severity={} {:?} body={}",
                index, log.severity_number, log.severity_text, log.body
            );
            render_attributes(out, 3, &log.attributes, options);
        }
    }
}

fn render_attributes(out: &mut String, depth: usize, attributes: &Attributes, options: &CompareOptions) {
    let indent = "  ".repeat(depth);
    for kv in attributes.sorted() {
        if options.is_ignored(&kv.key) {
            continue;
        }
        let _ = writeln!(out, "{}{} = {}", indent, kv.key, kv.value);
    }
}
