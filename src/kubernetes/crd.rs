// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Startup gate: block until the CRDs the controllers watch are served

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use kube::{discovery::Discovery, Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait for the CRD of `K` to become available in the cluster.
/// Polls discovery, doubling the delay from POLL_INTERVAL_SECS up to POLL_MAX_INTERVAL_SECS.
pub async fn wait_for_crd<K>(client: &Client) -> Result<()>
where
    K: Resource<DynamicType = ()>,
{
    let (group, version, kind) = (K::group(&()), K::version(&()), K::kind(&()));
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match check_crd_exists(client, &group, &version, &kind).await {
            Ok(true) => {
                info!("{} CRD ({}/{}) is available", kind, group, version);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "{} CRD ({}/{}) not yet available, waiting {} seconds...",
                    kind, group, version, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for {} CRD: {}, retrying in {} seconds...",
                    kind, e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Double, capped
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Check if a CRD exists by attempting to discover it.
async fn check_crd_exists(client: &Client, group: &str, version: &str, kind: &str) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[group])
        .run()
        .await?;

    let found = discovery
        .groups()
        .filter(|g| g.name() == group)
        .flat_map(|g| g.recommended_resources())
        .any(|(ar, _)| ar.kind == kind && ar.version == version);
    Ok(found)
}
