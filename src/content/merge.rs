// Merge policy: shallow override of default keys by a fetched document

use serde_json::{Map, Value};

/// Open-ended content document: string keys to arbitrary JSON values
pub type ContentDocument = Map<String, Value>;

/// Overlay `overrides` on top of `defaults`.
///
/// Top-level keys from `overrides` win; every other default key survives.
/// Nested objects are replaced wholesale, not merged. A payload that is not
/// a JSON object contributes no keys.
pub fn merge_over(defaults: &ContentDocument, overrides: &Value) -> ContentDocument {
    let mut merged = defaults.clone();
    if let Value::Object(fields) = overrides {
        for (key, value) in fields {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> ContentDocument {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_override_wins_and_defaults_fill() {
        let defaults = doc(json!({"heroTitle": "Old", "heroSubtitle": "Welcome"}));
        let merged = merge_over(&defaults, &json!({"heroTitle": "New Homes"}));

        assert_eq!(merged["heroTitle"], "New Homes");
        assert_eq!(merged["heroSubtitle"], "Welcome");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_never_drops_default_keys() {
        let defaults = doc(json!({"a": 1, "b": 2, "c": {"x": true}}));
        for overrides in [
            json!({}),
            json!({"a": null}),
            json!({"d": 4}),
            json!({"c": {"y": false}}),
            Value::Null,
            json!(["not", "an", "object"]),
            json!("text"),
        ] {
            let merged = merge_over(&defaults, &overrides);
            for key in defaults.keys() {
                assert!(merged.contains_key(key), "{key} dropped for {overrides}");
            }
        }
    }

    #[test]
    fn test_merge_is_idempotent() {
        let defaults = doc(json!({"heroTitle": "Old", "sections": {"gallery": true}}));
        let overrides = json!({"heroTitle": "New", "sections": {"gallery": false}, "extra": [1, 2]});

        let once = merge_over(&defaults, &overrides);
        let twice = merge_over(&once, &overrides);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nested_objects_are_replaced() {
        let defaults = doc(json!({"sections": {"gallery": true, "map": true}}));
        let merged = merge_over(&defaults, &json!({"sections": {"gallery": false}}));
        assert_eq!(merged["sections"], json!({"gallery": false}));
    }

    #[test]
    fn test_non_object_payload_leaves_defaults() {
        let defaults = doc(json!({"heroTitle": "Old"}));
        assert_eq!(merge_over(&defaults, &Value::Null), defaults);
        assert_eq!(merge_over(&defaults, &json!(42)), defaults);
    }
}
