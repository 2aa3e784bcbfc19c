// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! System charts: definitions, values, configuration and installation.

pub mod config;
pub mod definition;
pub mod manager;
pub mod settings;
pub mod values;

pub use config::{RancherConfig, ValueContext};
pub use definition::{plan_charts, system_charts, ChartAction, ChartDefinition};
pub use manager::{ChartManager, ChartRelease, HelmManager};
pub use settings::ChartSettings;
pub use values::{deep_merge, parse_values, Values};
