// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resolution of the Rancher settings the system charts depend on.

use crate::constants::charts::CUSTOM_VALUE_MAP_NAME;
use crate::constants::settings::*;
use crate::error::Result;
use crate::types::Setting;
use kube::Api;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Settings read by the system chart reconciler, with their built-in defaults
const CHART_SETTINGS: [(&str, &str); 5] = [
    (SYSTEM_DEFAULT_REGISTRY, ""),
    (SHELL_IMAGE, DEFAULT_SHELL_IMAGE),
    (WEBHOOK_VERSION, ""),
    (WEBHOOK_MIN_VERSION, ""),
    (CONFIG_MAP_NAME, CUSTOM_VALUE_MAP_NAME),
];

/// Snapshot of setting values taken at the start of a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSettings {
    values: BTreeMap<String, String>,
}

impl ChartSettings {
    /// Read every chart setting. A Setting object that does not exist resolves
    /// to its built-in default; other API errors are returned.
    #[instrument(skip(settings))]
    pub async fn load(settings: &Api<Setting>) -> Result<Self> {
        let mut values = BTreeMap::new();
        for (name, default) in CHART_SETTINGS {
            let value = match settings.get_opt(name).await? {
                Some(setting) => setting.effective_value().to_string(),
                None => {
                    debug!("Setting {} not found, using built-in default", name);
                    default.to_string()
                }
            };
            values.insert(name.to_string(), value);
        }
        Ok(Self { values })
    }

    /// Value of a setting, empty when unknown
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(|v| v.as_str()).unwrap_or_default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }

    /// Settings populated with built-in defaults only
    pub fn defaults() -> Self {
        CHART_SETTINGS
            .iter()
            .fold(Self::default(), |settings, (name, default)| {
                settings.with(name, default)
            })
    }
}

/// Whether a change to the named setting affects system chart installation
pub fn is_chart_setting(name: &str) -> bool {
    CHART_SETTINGS.iter().any(|(setting, _)| *setting == name)
}
