// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! AuthConfig reconciler - maintains the cleanup lock of auth providers and
//! cleans up after providers that get disabled.
//!
//! Deleted auth configs are not cleaned up; admins are expected to disable a
//! provider rather than delete its auth config.

use crate::auth::{CleanupLock, CleanupService, CleanupStep};
use crate::constants::{annotations, REQUEUE_SECS};
use crate::error::{ControllerError, Result};
use crate::types::AuthConfig;
use futures::StreamExt;
use kube::{
    api::{Patch, PatchParams},
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

pub struct AuthConfigReconciler {
    client: Client,
    cleanup: Arc<dyn CleanupService>,
}

impl AuthConfigReconciler {
    pub fn new(client: Client, cleanup: Arc<dyn CleanupService>) -> Self {
        Self { client, cleanup }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let auth_configs: Api<AuthConfig> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(auth_configs, watcher::Config::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled auth config: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }

    /// Write the cleanup lock annotation, leaving everything else untouched
    #[instrument(skip(self))]
    async fn set_cleanup_lock(&self, name: &str, lock: &CleanupLock) -> Result<()> {
        let Some(value) = lock.as_annotation() else {
            return Ok(());
        };
        let auth_configs: Api<AuthConfig> = Api::all(self.client.clone());
        let patch = serde_json::json!({
            "metadata": {
                "annotations": { annotations::AUTH_PROVIDER_CLEANUP: value }
            }
        });
        auth_configs
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        debug!("Set cleanup lock of auth config {} to {}", name, value);
        Ok(())
    }
}

async fn reconcile(config: Arc<AuthConfig>, ctx: Arc<AuthConfigReconciler>) -> Result<Action> {
    let name = config.name_any();
    let lock = CleanupLock::from_annotation(config.annotation(annotations::AUTH_PROVIDER_CLEANUP));

    match lock.next(config.enabled) {
        CleanupStep::Annotate(next) => {
            ctx.set_cleanup_lock(&name, &next).await?;
        }
        CleanupStep::CleanupThenLock => {
            ctx.cleanup.run(&config).await?;
            info!(
                "Auth provider {} has been cleaned up successfully. Locking down its cleanup operation...",
                name
            );
            ctx.set_cleanup_lock(&name, &CleanupLock::RancherLocked)
                .await?;
        }
        CleanupStep::Refuse(CleanupLock::Invalid(value)) => {
            warn!(
                "Refusing to clean up auth provider {} because its auth config annotation {} is invalid: {}",
                name,
                annotations::AUTH_PROVIDER_CLEANUP,
                value
            );
        }
        CleanupStep::Refuse(lock) => {
            info!(
                "Refusing to clean up auth provider {} because its auth config annotation {} is set to {}.",
                name,
                annotations::AUTH_PROVIDER_CLEANUP,
                lock
            );
        }
        CleanupStep::Keep => {
            if let CleanupLock::Invalid(value) = &lock {
                warn!(
                    "Auth config {} has an invalid {} annotation: {}",
                    name,
                    annotations::AUTH_PROVIDER_CLEANUP,
                    value
                );
            }
        }
    }

    Ok(Action::await_change())
}

fn error_policy(
    _config: Arc<AuthConfig>,
    error: &ControllerError,
    _ctx: Arc<AuthConfigReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(REQUEUE_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockService;
    use async_trait::async_trait;
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const AUTH_CONFIG_PATH: &str = "/apis/management.cattle.io/v3/authconfigs/github";

    #[derive(Default)]
    struct FakeCleanup {
        runs: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl CleanupService for FakeCleanup {
        async fn run(&self, _config: &AuthConfig) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ControllerError::Cleanup("test error".to_string()));
            }
            Ok(())
        }
    }

    fn auth_config(lock: Option<&str>, enabled: bool) -> AuthConfig {
        AuthConfig {
            metadata: ObjectMeta {
                name: Some("github".to_string()),
                annotations: lock.map(|value| {
                    BTreeMap::from([(
                        annotations::AUTH_PROVIDER_CLEANUP.to_string(),
                        value.to_string(),
                    )])
                }),
                ..Default::default()
            },
            type_: "githubConfig".to_string(),
            enabled,
        }
    }

    fn mock() -> MockService {
        let body = serde_json::to_string(&auth_config(None, false)).unwrap();
        MockService::new().on_patch(AUTH_CONFIG_PATH, 200, &body)
    }

    async fn sync(
        mock: &MockService,
        cleanup: Arc<FakeCleanup>,
        config: AuthConfig,
    ) -> Result<Action> {
        let ctx = Arc::new(AuthConfigReconciler::new(mock.client(), cleanup));
        reconcile(Arc::new(config), ctx).await
    }

    fn patched_locks(mock: &MockService) -> Vec<String> {
        mock.requests_with_method("PATCH")
            .iter()
            .map(|r| {
                r.json()["metadata"]["annotations"][annotations::AUTH_PROVIDER_CLEANUP]
                    .as_str()
                    .unwrap()
                    .to_string()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_unset_and_disabled_locks_without_cleanup() {
        let mock = mock();
        let cleanup = Arc::new(FakeCleanup::default());

        sync(&mock, cleanup.clone(), auth_config(None, false))
            .await
            .unwrap();

        assert_eq!(patched_locks(&mock), vec!["rancher-locked"]);
        assert_eq!(cleanup.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unset_and_enabled_unlocks() {
        let mock = mock();
        let cleanup = Arc::new(FakeCleanup::default());

        sync(&mock, cleanup.clone(), auth_config(Some(""), true))
            .await
            .unwrap();

        assert_eq!(patched_locks(&mock), vec!["unlocked"]);
        assert_eq!(cleanup.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_enabling_rancher_locked_provider_unlocks() {
        let mock = mock();
        let cleanup = Arc::new(FakeCleanup::default());

        sync(&mock, cleanup.clone(), auth_config(Some("rancher-locked"), true))
            .await
            .unwrap();

        assert_eq!(patched_locks(&mock), vec!["unlocked"]);
    }

    #[tokio::test]
    async fn test_disabling_unlocked_provider_cleans_up_once() {
        let mock = mock();
        let cleanup = Arc::new(FakeCleanup::default());

        sync(&mock, cleanup.clone(), auth_config(Some("unlocked"), false))
            .await
            .unwrap();

        assert_eq!(cleanup.runs.load(Ordering::SeqCst), 1);
        assert_eq!(patched_locks(&mock), vec!["rancher-locked"]);
        assert_eq!(mock.requests()[0].path, AUTH_CONFIG_PATH);
    }

    #[tokio::test]
    async fn test_failed_cleanup_keeps_lock() {
        let mock = mock();
        let cleanup = Arc::new(FakeCleanup {
            fail: true,
            ..Default::default()
        });

        let result = sync(&mock, cleanup.clone(), auth_config(Some("unlocked"), false)).await;

        assert!(result.is_err());
        assert_eq!(cleanup.runs.load(Ordering::SeqCst), 1);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_locked_providers_are_left_alone() {
        for lock in ["rancher-locked", "user-locked", "garbage"] {
            let mock = mock();
            let cleanup = Arc::new(FakeCleanup::default());

            sync(&mock, cleanup.clone(), auth_config(Some(lock), false))
                .await
                .unwrap();

            assert!(mock.requests().is_empty(), "lock {}", lock);
            assert_eq!(cleanup.runs.load(Ordering::SeqCst), 0, "lock {}", lock);
        }
    }

    #[tokio::test]
    async fn test_enabled_user_locked_provider_is_left_alone() {
        let mock = mock();
        let cleanup = Arc::new(FakeCleanup::default());

        sync(&mock, cleanup.clone(), auth_config(Some("user-locked"), true))
            .await
            .unwrap();

        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_patch_is_returned() {
        let mock = MockService::new();
        let cleanup = Arc::new(FakeCleanup::default());

        assert!(sync(&mock, cleanup, auth_config(None, true)).await.is_err());
    }
}
