// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! System chart reconciler - keeps the charts Rancher depends on installed
//! whenever the `rancher-charts` repository, the chart settings or the chart
//! configuration change.

use crate::charts::{
    plan_charts, settings::is_chart_setting, system_charts, ChartAction, ChartManager,
    ChartSettings, RancherConfig, ValueContext,
};
use crate::config::Config;
use crate::constants::charts::{CUSTOM_VALUE_MAP_NAME, REPO_NAME};
use crate::constants::namespaces::SYSTEM;
use crate::constants::settings::CONFIG_MAP_NAME;
use crate::constants::REQUEUE_SECS;
use crate::error::{ControllerError, Result};
use crate::kubernetes::delete_namespace;
use crate::types::{ClusterRepo, Setting};
use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{
    runtime::{controller::Action, reflector::ObjectRef, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

pub struct SystemChartsReconciler {
    client: Client,
    config: Config,
    manager: Arc<dyn ChartManager>,
    /// Name of the ConfigMap holding the priority class, from the last pass
    config_map_name: Arc<RwLock<String>>,
}

impl SystemChartsReconciler {
    pub fn new(client: Client, config: Config, manager: Arc<dyn ChartManager>) -> Self {
        Self {
            client,
            config,
            manager,
            config_map_name: Arc::new(RwLock::new(CUSTOM_VALUE_MAP_NAME.to_string())),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let repos: Api<ClusterRepo> = Api::all(self.client.clone());
        let settings: Api<Setting> = Api::all(self.client.clone());
        let config_maps: Api<ConfigMap> = Api::namespaced(self.client.clone(), SYSTEM);
        let config_map_name = self.config_map_name.clone();
        let context = Arc::new(self);

        Controller::new(repos, watcher::Config::default())
            .watches(settings, watcher::Config::default(), |setting| {
                is_chart_setting(&setting.name_any()).then(|| ObjectRef::new(REPO_NAME))
            })
            .watches(config_maps, watcher::Config::default(), move |config_map| {
                let configured = config_map_name
                    .read()
                    .map(|name| name.clone())
                    .unwrap_or_default();
                affects_charts(&config_map, &configured).then(|| ObjectRef::new(REPO_NAME))
            })
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled cluster repo: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }

    /// Converge all system charts, stopping at the first failure
    #[instrument(skip(self))]
    async fn sync_charts(&self) -> Result<()> {
        let settings = ChartSettings::load(&Api::all(self.client.clone())).await?;
        if let Ok(mut name) = self.config_map_name.write() {
            *name = settings.get(CONFIG_MAP_NAME).to_string();
        }
        let rancher_config = RancherConfig::new(
            Api::namespaced(self.client.clone(), SYSTEM),
            settings.get(CONFIG_MAP_NAME),
        );
        let ctx = ValueContext::resolve(&rancher_config, self.config.features).await;

        let actions = plan_charts(
            &system_charts(),
            &ctx,
            &settings,
            self.config.registry_override.as_deref(),
        );
        for action in actions {
            self.apply(action).await?;
        }
        Ok(())
    }

    async fn apply(&self, action: ChartAction) -> Result<()> {
        match action {
            ChartAction::Uninstall {
                namespace,
                chart_name,
                remove_namespace,
            } => {
                self.manager.uninstall(&namespace, &chart_name).await?;
                if remove_namespace {
                    delete_namespace(&self.client, &namespace).await?;
                }
            }
            ChartAction::Ensure(release) => {
                self.manager.ensure(&release).await?;
                info!("Chart {} is up to date", release.chart_name);
            }
        }
        Ok(())
    }
}

/// Whether a ConfigMap change should re-trigger chart installation: the custom
/// values map, or the map the `config-map-name` setting points at.
fn affects_charts(config_map: &ConfigMap, config_map_name: &str) -> bool {
    let name = config_map.name_any();
    config_map.namespace().as_deref() == Some(SYSTEM)
        && (name == CUSTOM_VALUE_MAP_NAME || name == config_map_name)
}

async fn reconcile(repo: Arc<ClusterRepo>, ctx: Arc<SystemChartsReconciler>) -> Result<Action> {
    if repo.name_any() != REPO_NAME {
        return Ok(Action::await_change());
    }

    debug!("Reconciling system charts for repo {}", REPO_NAME);
    ctx.sync_charts().await?;

    Ok(Action::await_change())
}

fn error_policy(
    _repo: Arc<ClusterRepo>,
    error: &ControllerError,
    _ctx: Arc<SystemChartsReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(REQUEUE_SECS))
}
