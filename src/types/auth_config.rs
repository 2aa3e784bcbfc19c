// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! `management.cattle.io/v3` AuthConfig. Its fields live at the top level of
//! the object instead of under `spec`, so the `Resource` impl is written out.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ClusterResourceScope;
use kube::Resource;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Provider type, e.g. `githubConfig`
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default)]
    pub enabled: bool,
}

impl Resource for AuthConfig {
    type DynamicType = ();
    type Scope = ClusterResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        "AuthConfig".into()
    }

    fn group(_: &()) -> Cow<'_, str> {
        "management.cattle.io".into()
    }

    fn version(_: &()) -> Cow<'_, str> {
        "v3".into()
    }

    fn plural(_: &()) -> Cow<'_, str> {
        "authconfigs".into()
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl AuthConfig {
    /// Value of the given annotation, if present
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(key))
            .map(|v| v.as_str())
    }
}
