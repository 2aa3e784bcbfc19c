// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Rancher resource types watched or written by the controllers.

pub mod auth_config;
pub mod cluster;
pub mod cluster_repo;
pub mod setting;

pub use auth_config::AuthConfig;
pub use cluster::Cluster;
pub use cluster_repo::ClusterRepo;
pub use setting::Setting;
