// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "management.cattle.io", version = "v3", kind = "Cluster")]
#[kube(status = "ClusterStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Raw per-chart values, keyed by chart name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_values: Option<BTreeMap<String, String>>,
}

impl Cluster {
    /// Check if this cluster is ready based on its status conditions
    pub fn is_ready(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .is_some_and(|conditions| {
                conditions
                    .iter()
                    .any(|c| c.condition_type == "Ready" && c.status == "True")
            })
    }

    /// Check if this is the local/management cluster
    pub fn is_local(&self) -> bool {
        self.name_any() == "local"
    }

    /// Kubernetes version reported by the cluster, if any
    pub fn git_version(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.version.as_ref())
            .map(|v| v.git_version.as_str())
    }

    /// Name of the provisioning cluster this management cluster belongs to
    pub fn display_name(&self) -> String {
        self.spec
            .display_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.name_any())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fleet_workspace_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    #[serde(default)]
    pub git_version: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
