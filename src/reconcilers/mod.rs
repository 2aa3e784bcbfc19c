// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events.

pub mod auth_config;
pub mod cluster;
pub mod system_charts;

pub use auth_config::AuthConfigReconciler;
pub use cluster::ClusterReconciler;
pub use system_charts::SystemChartsReconciler;
