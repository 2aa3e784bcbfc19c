// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Chart values: a string-keyed tree of scalars, sequences and mappings.

use crate::error::{ControllerError, Result};
use serde::de::Error as _;
use serde_json::{Map, Value};

/// Top-level mapping of chart values
pub type Values = Map<String, Value>;

/// Parse a YAML document into chart values.
///
/// An empty document yields empty values; a document that is not a mapping
/// is rejected like any other malformed input.
pub fn parse_values(chart: &str, yaml: &str) -> Result<Values> {
    let invalid = |source| ControllerError::InvalidValues {
        chart: chart.to_string(),
        source,
    };

    match serde_yaml::from_str::<Value>(yaml).map_err(invalid)? {
        Value::Null => Ok(Values::new()),
        Value::Object(values) => Ok(values),
        other => Err(invalid(serde_yaml::Error::custom(format!(
            "expected a mapping of values, found {}",
            other
        )))),
    }
}

/// Merge `overlay` into `base`. Mappings present on both sides are merged key
/// by key, every other overlay value replaces what `base` holds.
pub fn deep_merge(base: &mut Values, overlay: Values) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Build values from a `json!` literal that is known to be an object
#[cfg(test)]
pub(crate) fn values(value: Value) -> Values {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_mapping() {
        let parsed = parse_values("rancher-webhook", "yamlKey: yamlValue").unwrap();
        assert_eq!(parsed, values(json!({"yamlKey": "yamlValue"})));
    }

    #[test]
    fn test_parse_nested_mapping() {
        let parsed = parse_values(
            "rancher-webhook",
            "---\nnewKey: newValue\nmcm:\n  enabled: false\nglobal: \"\"\n",
        )
        .unwrap();
        assert_eq!(
            parsed,
            values(json!({
                "newKey": "newValue",
                "mcm": {"enabled": false},
                "global": ""
            }))
        );
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_values("rancher-webhook", "").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = parse_values("rancher-webhook", "%{'foo':'bar ").unwrap_err();
        assert!(matches!(err, ControllerError::InvalidValues { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_parse_rejects_scalar_document() {
        let err = parse_values("rancher-webhook", "just a string").unwrap_err();
        assert!(matches!(err, ControllerError::InvalidValues { .. }));
    }

    #[test]
    fn test_deep_merge_nested_mappings() {
        let mut base = values(json!({
            "mcm": {"enabled": true},
            "capi": {"enabled": false},
            "priorityClassName": "rancher-critical"
        }));
        deep_merge(
            &mut base,
            values(json!({
                "mcm": {"enabled": false, "extra": 1},
                "newKey": "newValue"
            })),
        );

        assert_eq!(
            base,
            values(json!({
                "mcm": {"enabled": false, "extra": 1},
                "capi": {"enabled": false},
                "priorityClassName": "rancher-critical",
                "newKey": "newValue"
            }))
        );
    }

    #[test]
    fn test_deep_merge_scalar_replaces_mapping() {
        let mut base = values(json!({"global": {"cattle": {"systemDefaultRegistry": ""}}}));
        deep_merge(&mut base, values(json!({"global": ""})));
        assert_eq!(base, values(json!({"global": ""})));
    }

    #[test]
    fn test_deep_merge_mapping_replaces_scalar() {
        let mut base = values(json!({"image": "plain"}));
        deep_merge(&mut base, values(json!({"image": {"tag": "v1"}})));
        assert_eq!(base, values(json!({"image": {"tag": "v1"}})));
    }
}
