// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;

/// Feature flags that end up in system chart values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub embedded_cluster_api: bool,
    pub mcm: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            embedded_cluster_api: false,
            mcm: true,
        }
    }
}

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Private registry used for system chart images instead of the system default registry
    pub registry_override: Option<String>,
    /// Helm repository alias system charts are installed from
    pub helm_repository: String,
    /// Namespace holding the kubeconfig secrets of downstream clusters
    pub kubeconfig_namespace: String,
    pub features: Features,
    pub testing_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_override: None,
            helm_repository: "rancher-charts".to_string(),
            kubeconfig_namespace: "fleet-default".to_string(),
            features: Features::default(),
            testing_mode: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let registry_override = env::var("REGISTRY_OVERRIDE")
            .ok()
            .filter(|r| !r.is_empty());
        let helm_repository = env::var("HELM_REPOSITORY").unwrap_or(defaults.helm_repository);
        let kubeconfig_namespace =
            env::var("KUBECONFIG_NAMESPACE").unwrap_or(defaults.kubeconfig_namespace);

        let features = Features {
            embedded_cluster_api: bool_var(
                "FEATURE_EMBEDDED_CLUSTER_API",
                defaults.features.embedded_cluster_api,
            )?,
            mcm: bool_var("FEATURE_MCM", defaults.features.mcm)?,
        };
        // For testing, uses the KUBECONFIG env var to create downstream clients instead of fetching kubeconfig from secrets
        let testing_mode = bool_var("TESTING_MODE", false)?;

        Ok(Config {
            registry_override,
            helm_repository,
            kubeconfig_namespace,
            features,
            testing_mode,
        })
    }
}

fn bool_var(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} must be 'true' or 'false', got '{}'", name, value)),
        Err(_) => Ok(default),
    }
}
