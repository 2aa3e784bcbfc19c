// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Clients for managed clusters, built from the kubeconfig secrets Rancher keeps for them

use crate::config::Config;
use crate::error::{ControllerError, Result};
use crate::types::Cluster;
use k8s_openapi::api::core::v1::Secret;
use kube::{config::KubeConfigOptions, Api, Client, Config as KConfig, ResourceExt};
use tracing::{debug, info, instrument};

/// Client for the given cluster: the local client for the management
/// cluster itself, a kubeconfig based one for downstream clusters.
#[instrument(skip(local_client, cluster, config), fields(cluster = %cluster.name_any()))]
pub async fn cluster_client(local_client: &Client, cluster: &Cluster, config: &Config) -> Result<Client> {
    if cluster.is_local() {
        return Ok(local_client.clone());
    }
    if config.testing_mode {
        create_testing_client(cluster).await
    } else {
        let kubeconfig = get_cluster_kubeconfig(local_client, cluster, config).await?;
        create_client_from_kubeconfig(&kubeconfig).await
    }
}

/// In testing mode downstream clusters are reached through the local proxy URL
async fn create_testing_client(cluster: &Cluster) -> Result<Client> {
    let mut c = KConfig::infer()
        .await
        .map_err(|e| ControllerError::Kubeconfig(format!("Failed to infer config: {}", e)))?;

    if let Some(cluster_url) = c.cluster_url.to_string().rsplit('/').next() {
        if cluster_url == "local" {
            let new_cluster_url = c
                .cluster_url
                .to_string()
                .replace("local", &cluster.name_any());
            debug!(
                "Testing mode: modifying cluster URL from {} to {}",
                c.cluster_url, new_cluster_url
            );
            c.cluster_url = new_cluster_url
                .parse()
                .map_err(|e| ControllerError::Kubeconfig(format!("Invalid URL: {}", e)))?;
        }
    }

    Client::try_from(c)
        .map_err(|e| ControllerError::Kubeconfig(format!("Failed to create client: {}", e)))
}

/// Namespace and name of the kubeconfig secret of a downstream cluster
fn kubeconfig_secret_ref(cluster: &Cluster, config: &Config) -> (String, String) {
    let namespace = cluster
        .status
        .as_ref()
        .and_then(|s| s.fleet_workspace_name.clone())
        .filter(|ns| !ns.is_empty())
        .unwrap_or_else(|| config.kubeconfig_namespace.clone());
    (namespace, format!("{}-kubeconfig", cluster.display_name()))
}

/// Get the kubeconfig of a downstream cluster from its secret
#[instrument(skip(client, cluster, config), fields(cluster = %cluster.name_any()))]
async fn get_cluster_kubeconfig(client: &Client, cluster: &Cluster, config: &Config) -> Result<String> {
    let cluster_name = cluster.name_any();
    let (namespace, secret_name) = kubeconfig_secret_ref(cluster, config);
    let secrets: Api<Secret> = Api::namespaced(client.clone(), &namespace);

    info!(
        "Getting kubeconfig secret '{}/{}' for cluster '{}'...",
        namespace, secret_name, cluster_name
    );

    let secret = secrets.get(&secret_name).await.map_err(|e| {
        ControllerError::Kubeconfig(format!(
            "Failed to get kubeconfig secret for cluster {}: {}",
            cluster_name, e
        ))
    })?;

    let Some(kubeconfig_data) = secret.data.as_ref().and_then(|d| d.get("value")) else {
        return Err(ControllerError::Kubeconfig(format!(
            "Kubeconfig secret for cluster {} does not contain 'value' key",
            cluster_name
        )));
    };

    String::from_utf8(kubeconfig_data.0.clone()).map_err(|e| {
        ControllerError::Kubeconfig(format!(
            "Failed to decode kubeconfig for cluster {}: {}",
            cluster_name, e
        ))
    })
}

/// Create a Kubernetes client from a kubeconfig string
async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    use kube::config::Kubeconfig;

    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| ControllerError::Kubeconfig(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                ControllerError::Kubeconfig(format!("Failed to create config: {}", e))
            })?;

    Client::try_from(client_config)
        .map_err(|e| ControllerError::Kubeconfig(format!("Failed to create client: {}", e)))
}
