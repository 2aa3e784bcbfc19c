// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys
pub mod annotations {
    /// Cleanup lock of an auth provider, see [`crate::auth::CleanupLock`]
    pub const AUTH_PROVIDER_CLEANUP: &str = "management.cattle.io/auth-provider-cleanup";
}

/// Namespaces the controllers read from or write to
pub mod namespaces {
    pub const SYSTEM: &str = "cattle-system";
    /// Home of the secrets referenced by auth configs
    pub const GLOBAL_DATA: &str = "cattle-global-data";
}

/// Chart related names
pub mod charts {
    /// ClusterRepo whose changes drive system chart installation
    pub const REPO_NAME: &str = "rancher-charts";
    pub const WEBHOOK_CHART_NAME: &str = "rancher-webhook";
    pub const WEBHOOK_IMAGE: &str = "rancher/rancher-webhook";
    /// ConfigMap in the system namespace holding per-chart custom values
    pub const CUSTOM_VALUE_MAP_NAME: &str = "rancher-config";
    pub const PRIORITY_CLASS_KEY: &str = "priorityClassName";
    pub const OPERATOR_CHART_NAME: &str = "rancher-operator";
    pub const OPERATOR_NAMESPACE: &str = "rancher-operator-system";
}

/// Names of `management.cattle.io/v3` Setting objects
pub mod settings {
    pub const SYSTEM_DEFAULT_REGISTRY: &str = "system-default-registry";
    pub const SHELL_IMAGE: &str = "shell-image";
    pub const WEBHOOK_VERSION: &str = "rancher-webhook-version";
    pub const WEBHOOK_MIN_VERSION: &str = "rancher-webhook-min-version";
    pub const CONFIG_MAP_NAME: &str = "config-map-name";

    pub const DEFAULT_SHELL_IMAGE: &str = "rancher/shell:v0.2.1";
}

/// Label applied to objects created on behalf of Rancher
pub const PART_OF_LABEL: (&str, &str) = ("app.kubernetes.io/part-of", "rancher");

/// Seconds to wait before retrying a failed reconciliation
pub const REQUEUE_SECS: u64 = 60;

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
