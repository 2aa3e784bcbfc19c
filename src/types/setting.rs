// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ClusterResourceScope;
use kube::Resource;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// `management.cattle.io/v3` Setting, a named string value with a default
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Setting {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub default: String,
}

impl Resource for Setting {
    type DynamicType = ();
    type Scope = ClusterResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        "Setting".into()
    }

    fn group(_: &()) -> Cow<'_, str> {
        "management.cattle.io".into()
    }

    fn version(_: &()) -> Cow<'_, str> {
        "v3".into()
    }

    fn plural(_: &()) -> Cow<'_, str> {
        "settings".into()
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Setting {
    /// The configured value, or the setting's own default when unset
    pub fn effective_value(&self) -> &str {
        if self.value.is_empty() {
            &self.default
        } else {
            &self.value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(value: &str, default: &str) -> Setting {
        Setting {
            value: value.to_string(),
            default: default.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_effective_value_prefers_value() {
        assert_eq!(setting("2.0.4", "2.0.0").effective_value(), "2.0.4");
    }

    #[test]
    fn test_effective_value_falls_back_to_default() {
        assert_eq!(setting("", "2.0.0").effective_value(), "2.0.0");
        assert_eq!(setting("", "").effective_value(), "");
    }
}
