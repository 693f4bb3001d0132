//! Attribute-list equality
//!
//! Lists are compared as sets keyed by `key`: both sides are sorted by key
//! and walked pairwise. Excluded keys are skipped without affecting the
//! verdict.

use super::mismatch::{EntityPath, Level, Mismatch};
use super::outline;
use super::CompareOptions;
use crate::otlp::Attributes;

/// Compare two attribute lists, failing on the first difference
pub fn compare_attributes(
    path: &EntityPath,
    received: &Attributes,
    expected: &Attributes,
    options: &CompareOptions,
) -> Result<(), Mismatch> {
    if received.len() != expected.len() {
        return Err(Mismatch::LengthMismatch {
            path: path.clone(),
            level: Level::Attributes,
            expected: expected.len(),
            received: received.len(),
            diff: Some(outline::attribute_diff(received, expected)),
        });
    }

    for (r, e) in received.sorted().into_iter().zip(expected.sorted()) {
        if r.key == e.key && options.is_ignored(&e.key) {
            continue;
        }

        if r.key != e.key {
            return Err(Mismatch::AttributeMismatch {
                path: path.clone(),
                key: e.key.clone(),
                received_key: Some(r.key.clone()),
                expected: e.value.to_string(),
                received: r.value.to_string(),
            });
        }

        if r.value != e.value {
            return Err(Mismatch::AttributeMismatch {
                path: path.clone(),
                key: e.key.clone(),
                received_key: None,
                expected: e.value.to_string(),
                received: r.value.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(v: serde_json::Value) -> Attributes {
        serde_json::from_value(v).unwrap()
    }

    fn path() -> EntityPath {
        EntityPath::root().resource(0)
    }

    #[test]
    fn test_order_independent() {
        let a = attrs(json!([
            {"key": "a", "value": {"intValue": "1"}},
            {"key": "b", "value": {"stringValue": "two"}}
        ]));
        let b = attrs(json!([
            {"key": "b", "value": {"stringValue": "two"}},
            {"key": "a", "value": {"intValue": 1}}
        ]));
        assert!(compare_attributes(&path(), &a, &b, &CompareOptions::default()).is_ok());
    }

    #[test]
    fn test_value_mismatch_names_key() {
        let received = attrs(json!([{"key": "x", "value": {"intValue": 2}}]));
        let expected = attrs(json!([{"key": "x", "value": {"intValue": 1}}]));
        let err = compare_attributes(&path(), &received, &expected, &CompareOptions::default())
            .unwrap_err();
        match err {
            Mismatch::AttributeMismatch {
                key,
                received_key,
                expected,
                received,
                ..
            } => {
                assert_eq!(key, "x");
                assert_eq!(received_key, None);
                assert_eq!(expected, "1");
                assert_eq!(received, "2");
            }
            other => panic!("Expected AttributeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_key_mismatch() {
        let received = attrs(json!([{"key": "y", "value": {"intValue": 1}}]));
        let expected = attrs(json!([{"key": "x", "value": {"intValue": 1}}]));
        let err = compare_attributes(&path(), &received, &expected, &CompareOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Mismatch::AttributeMismatch { received_key: Some(ref k), .. } if k == "y"
        ));
    }

    #[test]
    fn test_ignored_keys_skipped() {
        let received = attrs(json!([
            {"key": "session.id", "value": {"stringValue": "aaa"}},
            {"key": "user_agent.original", "value": {"stringValue": "Firefox"}},
            {"key": "log.record.uid", "value": {"stringValue": "1"}}
        ]));
        let expected = attrs(json!([
            {"key": "session.id", "value": {"stringValue": "bbb"}},
            {"key": "user_agent.original", "value": {"stringValue": "Chrome"}},
            {"key": "log.record.uid", "value": {"stringValue": "2"}}
        ]));
        assert!(
            compare_attributes(&path(), &received, &expected, &CompareOptions::default()).is_ok()
        );
    }

    #[test]
    fn test_length_mismatch_carries_value_diff() {
        let received = attrs(json!([{"key": "x", "value": {"intValue": 1}}]));
        let expected = attrs(json!([
            {"key": "x", "value": {"intValue": 1}},
            {"key": "z", "value": {"boolValue": true}}
        ]));
        let err = compare_attributes(&path(), &received, &expected, &CompareOptions::default())
            .unwrap_err();
        match err {
            Mismatch::LengthMismatch {
                level,
                expected,
                received,
                diff,
                ..
            } => {
                assert_eq!(level, Level::Attributes);
                assert_eq!((expected, received), (2, 1));
                assert!(diff.unwrap().contains("-z = true"));
            }
            other => panic!("Expected LengthMismatch, got {:?}", other),
        }
    }
}
