// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reads Rancher's chart configuration out of ConfigMaps in the system namespace.

use crate::charts::values::{parse_values, Values};
use crate::config::Features;
use crate::constants::charts::{CUSTOM_VALUE_MAP_NAME, PRIORITY_CLASS_KEY, WEBHOOK_CHART_NAME};
use crate::error::{ControllerError, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::Api;
use tracing::{instrument, warn};

/// Getter for the priority class and custom chart values.
///
/// Every "absent" case (empty setting, missing ConfigMap, missing key) is
/// reported as a NotFound error so callers can fall back to defaults with a
/// single [`ControllerError::is_not_found`] check.
pub struct RancherConfig {
    config_maps: Api<ConfigMap>,
    config_map_name: String,
}

impl RancherConfig {
    /// `config_maps` must be scoped to the system namespace; `config_map_name`
    /// is the value of the `config-map-name` setting.
    pub fn new(config_maps: Api<ConfigMap>, config_map_name: impl Into<String>) -> Self {
        Self {
            config_maps,
            config_map_name: config_map_name.into(),
        }
    }

    /// Priority class name configured for Rancher's system workloads
    #[instrument(skip(self), fields(config_map = %self.config_map_name))]
    pub async fn priority_class_name(&self) -> Result<String> {
        if self.config_map_name.is_empty() {
            return Err(ControllerError::NotFound(
                "config map name setting is empty".to_string(),
            ));
        }

        let config_map = self.get_config_map(&self.config_map_name).await?;
        data_value(&config_map, &self.config_map_name, PRIORITY_CLASS_KEY)
    }

    /// Custom values for the webhook chart
    #[instrument(skip(self))]
    pub async fn webhook_values(&self) -> Result<Values> {
        let config_map = self.get_config_map(CUSTOM_VALUE_MAP_NAME).await?;
        let raw = data_value(&config_map, CUSTOM_VALUE_MAP_NAME, WEBHOOK_CHART_NAME)?;
        parse_values(WEBHOOK_CHART_NAME, &raw)
    }

    async fn get_config_map(&self, name: &str) -> Result<ConfigMap> {
        self.config_maps
            .get_opt(name)
            .await?
            .ok_or_else(|| ControllerError::NotFound(format!("ConfigMap {}", name)))
    }
}

fn data_value(config_map: &ConfigMap, name: &str, key: &str) -> Result<String> {
    config_map
        .data
        .as_ref()
        .and_then(|d| d.get(key))
        .cloned()
        .ok_or_else(|| ControllerError::NotFound(format!("key {} in ConfigMap {}", key, name)))
}

/// Inputs the chart value producers are computed from
#[derive(Debug, Clone, Default)]
pub struct ValueContext {
    pub features: Features,
    pub priority_class_name: Option<String>,
    pub webhook_values: Option<Values>,
}

impl ValueContext {
    /// Resolve the context for one reconciliation pass. Missing configuration
    /// means defaults; any other failure is logged and also falls back to
    /// defaults.
    pub async fn resolve(config: &RancherConfig, features: Features) -> Self {
        let priority_class_name = match config.priority_class_name().await {
            Ok(name) => Some(name),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!(
                    "Failed to get rancher priorityClassName for '{}': {}",
                    WEBHOOK_CHART_NAME, e
                );
                None
            }
        };

        let webhook_values = match config.webhook_values().await {
            Ok(values) => Some(values),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!("Failed to get rancher webhook values: {}", e);
                None
            }
        };

        Self {
            features,
            priority_class_name,
            webhook_values,
        }
    }
}
