// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Gate on the Kubernetes version a cluster reports.
//!
//! None of the controllers in this crate call [`check_cluster_version`]; it is
//! library API for the PodSecurityPolicy controllers, which must refuse to act
//! on clusters newer than Kubernetes 1.24.

use crate::error::{ControllerError, Result};
use crate::types::Cluster;
use kube::Api;
use semver::Version;
use std::fmt;
use std::ops::RangeInclusive;
use tracing::{debug, instrument};

/// A parsed `vMAJOR.MINOR.PATCH[+distro]` version string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubernetesVersion(Version);

impl KubernetesVersion {
    /// Parse a version as reported in `status.version.gitVersion`. Build
    /// metadata such as `+k3s1` or `+rke2r1` is kept but never compared.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(ControllerError::InvalidVersion(
                "empty version string".to_string(),
            ));
        }
        let trimmed = raw.strip_prefix('v').unwrap_or(raw);
        Version::parse(trimmed)
            .map(KubernetesVersion)
            .map_err(|e| ControllerError::InvalidVersion(format!("{}: {}", raw, e)))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }
}

impl fmt::Display for KubernetesVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Inclusive set of accepted minor versions of one major version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedRange {
    pub major: u64,
    pub minors: RangeInclusive<u64>,
}

/// Kubernetes versions that still serve PodSecurityPolicies
pub const POD_SECURITY_POLICY_RANGE: SupportedRange = SupportedRange {
    major: 1,
    minors: 0..=24,
};

impl SupportedRange {
    pub fn contains(&self, version: &KubernetesVersion) -> bool {
        version.major() == self.major && self.minors.contains(&version.minor())
    }

    /// Fail with `UnsupportedVersion` when the version is outside the range
    pub fn check(&self, version: &KubernetesVersion) -> Result<()> {
        if self.contains(version) {
            Ok(())
        } else {
            Err(ControllerError::UnsupportedVersion(format!(
                "{} is outside {}.{}-{}.{}",
                version,
                self.major,
                self.minors.start(),
                self.major,
                self.minors.end()
            )))
        }
    }
}

/// Check that the named cluster runs a Kubernetes version within
/// [`POD_SECURITY_POLICY_RANGE`].
#[instrument(skip(clusters))]
pub async fn check_cluster_version(cluster_name: &str, clusters: &Api<Cluster>) -> Result<()> {
    let cluster = clusters.get(cluster_name).await?;
    let raw = cluster.git_version().unwrap_or_default();
    let version = KubernetesVersion::parse(raw)?;
    debug!("Cluster {} runs Kubernetes {}", cluster_name, version);
    POD_SECURITY_POLICY_RANGE.check(&version)
}
