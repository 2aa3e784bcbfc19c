// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster reconciler - watches management clusters and propagates their chart values downstream.

use crate::config::Config;
use crate::constants::{namespaces::SYSTEM, REQUEUE_SECS};
use crate::error::{ControllerError, Result};
use crate::kubernetes::cluster_client;
use crate::sync::ChartValuesPropagator;
use crate::types::Cluster;
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct ClusterReconciler {
    client: Client,
    config: Config,
}

impl ClusterReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let clusters: Api<Cluster> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(clusters, watcher::Config::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled cluster: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(cluster: Arc<Cluster>, ctx: Arc<ClusterReconciler>) -> Result<Action> {
    let name = cluster.name_any();

    if cluster.spec.chart_values.is_none() {
        debug!("Cluster {} has no chart values, skipping", name);
        return Ok(Action::await_change());
    }

    if !cluster.is_ready() {
        debug!("Cluster {} is not ready yet", name);
        return Ok(Action::requeue(Duration::from_secs(REQUEUE_SECS)));
    }

    debug!("Reconciling cluster: {}", name);

    let downstream = cluster_client(&ctx.client, &cluster, &ctx.config).await?;
    ChartValuesPropagator::new(&name, Api::namespaced(downstream, SYSTEM))
        .on_cluster_change(&cluster)
        .await?;

    Ok(Action::await_change())
}

fn error_policy(
    _cluster: Arc<Cluster>,
    error: &ControllerError,
    _ctx: Arc<ClusterReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(REQUEUE_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{config_map_json, MockService};
    use crate::types::cluster::{ClusterSpec, ClusterStatus, Condition};
    use std::collections::BTreeMap;

    fn local_cluster(ready: bool, chart_values: Option<BTreeMap<String, String>>) -> Arc<Cluster> {
        let mut cluster = Cluster::new(
            "local",
            ClusterSpec {
                display_name: None,
                chart_values,
            },
        );
        cluster.status = Some(ClusterStatus {
            conditions: Some(vec![Condition {
                condition_type: "Ready".to_string(),
                status: if ready { "True" } else { "False" }.to_string(),
                message: None,
            }]),
            ..Default::default()
        });
        Arc::new(cluster)
    }

    fn context(mock: &MockService) -> Arc<ClusterReconciler> {
        Arc::new(ClusterReconciler::new(mock.client(), Config::default()))
    }

    fn values() -> Option<BTreeMap<String, String>> {
        Some(BTreeMap::from([(
            "rancher-webhook".to_string(),
            "newKey: newValue".to_string(),
        )]))
    }

    #[tokio::test]
    async fn test_skips_cluster_without_chart_values() {
        let mock = MockService::new();
        let action = reconcile(local_cluster(true, None), context(&mock))
            .await
            .unwrap();
        assert_eq!(action, Action::await_change());
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_requeues_cluster_that_is_not_ready() {
        let mock = MockService::new();
        let action = reconcile(local_cluster(false, values()), context(&mock))
            .await
            .unwrap();
        assert_eq!(action, Action::requeue(Duration::from_secs(REQUEUE_SECS)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_propagates_values_of_local_cluster() {
        let mock = MockService::new().on_post(
            "/api/v1/namespaces/cattle-system/configmaps",
            201,
            &config_map_json("cattle-system", "rancher-config", None),
        );

        reconcile(local_cluster(true, values()), context(&mock))
            .await
            .unwrap();

        let posts = mock.requests_with_method("POST");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].json()["data"]["rancher-webhook"], "newKey: newValue");
    }
}
