// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The system charts Rancher keeps installed and the planning of their desired state.

use crate::charts::config::ValueContext;
use crate::charts::manager::ChartRelease;
use crate::charts::settings::ChartSettings;
use crate::charts::values::{deep_merge, Values};
use crate::constants::charts::*;
use crate::constants::namespaces::SYSTEM;
use crate::constants::settings::{
    SHELL_IMAGE, SYSTEM_DEFAULT_REGISTRY, WEBHOOK_MIN_VERSION, WEBHOOK_VERSION,
};
use serde_json::{json, Value};

/// A chart Rancher installs or removes on its own
#[derive(Debug, Clone)]
pub struct ChartDefinition {
    pub release_namespace: &'static str,
    pub chart_name: &'static str,
    /// Setting holding the minimum chart version
    pub min_version_setting: Option<&'static str>,
    /// Setting holding the exact chart version
    pub exact_version_setting: Option<&'static str>,
    pub values: Option<fn(&ValueContext) -> Values>,
    pub enabled: Option<fn(&ValueContext) -> bool>,
    pub uninstall: bool,
    pub remove_namespace: bool,
}

impl ChartDefinition {
    fn new(release_namespace: &'static str, chart_name: &'static str) -> Self {
        Self {
            release_namespace,
            chart_name,
            min_version_setting: None,
            exact_version_setting: None,
            values: None,
            enabled: None,
            uninstall: false,
            remove_namespace: false,
        }
    }
}

/// The system charts, in installation order
pub fn system_charts() -> Vec<ChartDefinition> {
    vec![
        ChartDefinition {
            min_version_setting: Some(WEBHOOK_MIN_VERSION),
            exact_version_setting: Some(WEBHOOK_VERSION),
            values: Some(webhook_values),
            enabled: Some(|_| true),
            ..ChartDefinition::new(SYSTEM, WEBHOOK_CHART_NAME)
        },
        ChartDefinition {
            uninstall: true,
            remove_namespace: true,
            ..ChartDefinition::new(OPERATOR_NAMESPACE, OPERATOR_CHART_NAME)
        },
    ]
}

fn webhook_values(ctx: &ValueContext) -> Values {
    let mut values = Values::new();
    values.insert(
        "capi".to_string(),
        json!({ "enabled": ctx.features.embedded_cluster_api }),
    );
    values.insert("mcm".to_string(), json!({ "enabled": ctx.features.mcm }));
    if let Some(priority_class_name) = &ctx.priority_class_name {
        values.insert(
            PRIORITY_CLASS_KEY.to_string(),
            Value::String(priority_class_name.clone()),
        );
    }
    values
}

/// One step towards the desired system chart state
#[derive(Debug, Clone, PartialEq)]
pub enum ChartAction {
    Uninstall {
        namespace: String,
        chart_name: String,
        remove_namespace: bool,
    },
    Ensure(ChartRelease),
}

/// Compute the ordered actions that converge the system charts.
///
/// Values are layered as: global registry settings, the image override when a
/// registry override is active, the chart's own values replacing top-level
/// keys, and for the webhook the custom values from the `rancher-config`
/// ConfigMap deep-merged on top of everything.
pub fn plan_charts(
    definitions: &[ChartDefinition],
    ctx: &ValueContext,
    settings: &ChartSettings,
    registry_override: Option<&str>,
) -> Vec<ChartAction> {
    // With a specific image override the system default registry must not apply
    let system_default_registry = match registry_override {
        Some(_) => "",
        None => settings.get(SYSTEM_DEFAULT_REGISTRY),
    };
    let global = json!({ "cattle": { "systemDefaultRegistry": system_default_registry } });

    let mut actions = Vec::new();
    for definition in definitions {
        if definition.enabled.is_some_and(|enabled| !enabled(ctx)) {
            continue;
        }

        if definition.uninstall {
            actions.push(ChartAction::Uninstall {
                namespace: definition.release_namespace.to_string(),
                chart_name: definition.chart_name.to_string(),
                remove_namespace: definition.remove_namespace,
            });
            continue;
        }

        let mut values = Values::new();
        values.insert("global".to_string(), global.clone());

        let mut install_image_override = String::new();
        if let Some(registry) = registry_override {
            values.insert(
                "image".to_string(),
                json!({ "repository": format!("{}/{}", registry, WEBHOOK_IMAGE) }),
            );
            install_image_override = format!("{}/{}", registry, settings.get(SHELL_IMAGE));
        }

        if let Some(producer) = definition.values {
            values.extend(producer(ctx));
        }

        let is_webhook = definition.chart_name == WEBHOOK_CHART_NAME;
        if let Some(custom) = ctx.webhook_values.as_ref().filter(|_| is_webhook) {
            deep_merge(&mut values, custom.clone());
        }

        let min_version = definition
            .min_version_setting
            .map(|s| settings.get(s))
            .unwrap_or_default()
            .to_string();
        let mut exact_version = definition
            .exact_version_setting
            .map(|s| settings.get(s))
            .unwrap_or_default()
            .to_string();
        // The webhook has to adopt resources that predate the chart, which only
        // works when installing from a minimum version
        if is_webhook && !min_version.is_empty() {
            exact_version.clear();
        }

        actions.push(ChartAction::Ensure(ChartRelease {
            namespace: definition.release_namespace.to_string(),
            chart_name: definition.chart_name.to_string(),
            min_version,
            exact_version,
            values,
            take_ownership: is_webhook,
            install_image_override,
        }));
    }
    actions
}
