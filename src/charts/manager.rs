// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Installation backend for system charts.

use crate::charts::values::Values;
use crate::error::{ControllerError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Desired state of one installed chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRelease {
    pub namespace: String,
    pub chart_name: String,
    /// Lowest acceptable chart version, empty for none
    pub min_version: String,
    /// Exact chart version, empty for none
    pub exact_version: String,
    pub values: Values,
    /// Adopt resources that exist in the cluster but are not owned by the release
    pub take_ownership: bool,
    /// Image to run the install operation with, empty for the default
    pub install_image_override: String,
}

impl ChartRelease {
    /// Version constraint handed to the installer. An exact version wins over
    /// a minimum version.
    pub fn version_constraint(&self) -> Option<String> {
        if !self.exact_version.is_empty() {
            Some(self.exact_version.clone())
        } else if !self.min_version.is_empty() {
            Some(format!(">={}", self.min_version))
        } else {
            None
        }
    }
}

/// Installs and removes charts
#[async_trait]
pub trait ChartManager: Send + Sync {
    /// Make sure the release is installed with the given version and values
    async fn ensure(&self, release: &ChartRelease) -> Result<()>;

    /// Remove the release if it is installed
    async fn uninstall(&self, namespace: &str, chart_name: &str) -> Result<()>;
}

/// [`ChartManager`] driving the `helm` CLI
pub struct HelmManager {
    repository: String,
}

impl HelmManager {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
        }
    }

    fn upgrade_args(&self, release: &ChartRelease) -> Vec<String> {
        let mut args = vec![
            "upgrade".to_string(),
            "--install".to_string(),
            release.chart_name.clone(),
            format!("{}/{}", self.repository, release.chart_name),
            "--namespace".to_string(),
            release.namespace.clone(),
            "--create-namespace".to_string(),
            "--values".to_string(),
            "-".to_string(),
        ];
        if let Some(version) = release.version_constraint() {
            args.push("--version".to_string());
            args.push(version);
        }
        if release.take_ownership {
            args.push("--take-ownership".to_string());
        }
        args
    }
}

#[async_trait]
impl ChartManager for HelmManager {
    #[instrument(skip(self, release), fields(chart = %release.chart_name, namespace = %release.namespace))]
    async fn ensure(&self, release: &ChartRelease) -> Result<()> {
        if !release.install_image_override.is_empty() {
            debug!(
                "helm runs in-process, not using operation image {}",
                release.install_image_override
            );
        }

        let values = serde_yaml::to_string(&release.values)
            .map_err(|e| ControllerError::Helm(format!("failed to render values: {}", e)))?;

        let mut child = Command::new("helm")
            .args(self.upgrade_args(release))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ControllerError::Helm(format!("failed to run helm: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(values.as_bytes())
                .await
                .map_err(|e| ControllerError::Helm(format!("failed to pass values: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ControllerError::Helm(format!("failed to run helm: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ControllerError::Helm(format!(
                "helm upgrade of {} failed: {}",
                release.chart_name, stderr
            )));
        }

        info!(
            version = ?release.version_constraint(),
            "Chart {} is installed",
            release.chart_name
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn uninstall(&self, namespace: &str, chart_name: &str) -> Result<()> {
        let output = Command::new("helm")
            .args([
                "uninstall",
                chart_name,
                "--namespace",
                namespace,
                "--ignore-not-found",
            ])
            .output()
            .await
            .map_err(|e| ControllerError::Helm(format!("failed to run helm: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ControllerError::Helm(format!(
                "helm uninstall of {} failed: {}",
                chart_name, stderr
            )));
        }

        debug!("Chart {} is not installed", chart_name);
        Ok(())
    }
}
