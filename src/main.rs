// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;

use anyhow::Result;
use kube::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cattle_controllers::auth::SecretCleanup;
use cattle_controllers::charts::HelmManager;
use cattle_controllers::config::Config;
use cattle_controllers::kubernetes::wait_for_crd;
use cattle_controllers::reconcilers::{
    AuthConfigReconciler, ClusterReconciler, SystemChartsReconciler,
};
use cattle_controllers::types::{AuthConfig, Cluster, ClusterRepo};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting cattle controllers");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: helm_repository={}, kubeconfig_namespace={}, testing_mode={}",
        config.helm_repository, config.kubeconfig_namespace, config.testing_mode
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for Rancher CRDs to become available...");
    wait_for_crd::<ClusterRepo>(&client).await?;
    wait_for_crd::<Cluster>(&client).await?;
    wait_for_crd::<AuthConfig>(&client).await?;

    let helm = Arc::new(HelmManager::new(config.helm_repository.clone()));
    let cleanup = Arc::new(SecretCleanup::new(client.clone()));

    let system_charts = SystemChartsReconciler::new(client.clone(), config.clone(), helm);
    let clusters = ClusterReconciler::new(client.clone(), config);
    let auth_configs = AuthConfigReconciler::new(client, cleanup);

    info!("Starting reconcilers...");

    tokio::try_join!(system_charts.run(), clusters.run(), auth_configs.run())?;

    warn!("All reconcilers stopped unexpectedly");
    Ok(())
}
