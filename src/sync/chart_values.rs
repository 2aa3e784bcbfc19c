// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Copies the webhook chart values of a management cluster object into the
//! custom values ConfigMap of the downstream cluster.

use crate::constants::charts::{CUSTOM_VALUE_MAP_NAME, WEBHOOK_CHART_NAME};
use crate::constants::namespaces::SYSTEM;
use crate::constants::PART_OF_LABEL;
use crate::error::Result;
use crate::types::Cluster;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{
    api::{ObjectMeta, PostParams},
    Api, ResourceExt,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

pub struct ChartValuesPropagator {
    cluster_name: String,
    config_maps: Api<ConfigMap>,
}

impl ChartValuesPropagator {
    /// `config_maps` must point at the system namespace of the downstream cluster
    pub fn new(cluster_name: impl Into<String>, config_maps: Api<ConfigMap>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            config_maps,
        }
    }

    /// Sync the webhook values of `cluster` downstream. Other clusters and
    /// clusters without chart values are ignored; an unchanged value is not
    /// written again.
    #[instrument(skip(self, cluster), fields(cluster = %self.cluster_name))]
    pub async fn on_cluster_change(&self, cluster: &Cluster) -> Result<()> {
        if cluster.name_any() != self.cluster_name {
            return Ok(());
        }
        let Some(chart_values) = cluster.spec.chart_values.as_ref() else {
            return Ok(());
        };
        let webhook_values = chart_values
            .get(WEBHOOK_CHART_NAME)
            .cloned()
            .unwrap_or_default();

        let mut config_map = match self.config_maps.get(CUSTOM_VALUE_MAP_NAME).await {
            Ok(config_map) => config_map,
            Err(kube::Error::Api(err)) if err.code == 404 => {
                return self.create_config_map(webhook_values).await;
            }
            Err(e) => return Err(e.into()),
        };

        let data = config_map.data.get_or_insert_with(BTreeMap::new);
        if data.get(WEBHOOK_CHART_NAME) == Some(&webhook_values) {
            debug!("Values for {} are unchanged", WEBHOOK_CHART_NAME);
            return Ok(());
        }
        data.insert(WEBHOOK_CHART_NAME.to_string(), webhook_values);

        self.config_maps
            .replace(CUSTOM_VALUE_MAP_NAME, &PostParams::default(), &config_map)
            .await?;
        info!("Updated ConfigMap {}/{}", SYSTEM, CUSTOM_VALUE_MAP_NAME);
        Ok(())
    }

    async fn create_config_map(&self, webhook_values: String) -> Result<()> {
        let config_map = ConfigMap {
            metadata: ObjectMeta {
                name: Some(CUSTOM_VALUE_MAP_NAME.to_string()),
                namespace: Some(SYSTEM.to_string()),
                labels: Some(BTreeMap::from([(
                    PART_OF_LABEL.0.to_string(),
                    PART_OF_LABEL.1.to_string(),
                )])),
                ..Default::default()
            },
            data: Some(BTreeMap::from([(
                WEBHOOK_CHART_NAME.to_string(),
                webhook_values,
            )])),
            ..Default::default()
        };

        self.config_maps
            .create(&PostParams::default(), &config_map)
            .await?;
        info!("Created ConfigMap {}/{}", SYSTEM, CUSTOM_VALUE_MAP_NAME);
        Ok(())
    }
}
