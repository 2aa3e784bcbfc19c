// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Removal of the auxiliary resources an auth provider leaves behind.

use crate::constants::namespaces::GLOBAL_DATA;
use crate::error::{ControllerError, Result};
use crate::types::AuthConfig;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{DeleteParams, ListParams},
    Api, Client, ResourceExt,
};
use tracing::{info, instrument};

/// Cleans up resources belonging to a particular auth provider type
#[async_trait]
pub trait CleanupService: Send + Sync {
    async fn run(&self, config: &AuthConfig) -> Result<()>;
}

/// Deletes the secrets an auth config references. They live in the global
/// data namespace and are named after the lower-cased provider type, e.g.
/// `githubconfig-clientsecret`.
pub struct SecretCleanup {
    client: Client,
}

impl SecretCleanup {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Secret name prefix used by the given auth config
fn secret_prefix(config: &AuthConfig) -> Option<String> {
    if config.type_.is_empty() {
        None
    } else {
        Some(format!("{}-", config.type_.to_lowercase()))
    }
}

#[async_trait]
impl CleanupService for SecretCleanup {
    #[instrument(skip(self, config), fields(auth_config = %config.name_any()))]
    async fn run(&self, config: &AuthConfig) -> Result<()> {
        let Some(prefix) = secret_prefix(config) else {
            return Err(ControllerError::Cleanup(format!(
                "auth config {} has no type",
                config.name_any()
            )));
        };

        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), GLOBAL_DATA);
        let secret_list = secrets.list(&ListParams::default()).await?;

        for secret in secret_list
            .items
            .iter()
            .filter(|s| s.name_any().starts_with(&prefix))
        {
            let name = secret.name_any();
            match secrets.delete(&name, &DeleteParams::default()).await {
                Ok(_) => info!("Deleted secret {}/{}", GLOBAL_DATA, name),
                Err(kube::Error::Api(err)) if err.code == 404 => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
