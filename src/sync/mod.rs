// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Synchronization of management cluster state into downstream clusters.

pub mod chart_values;

pub use chart_values::ChartValuesPropagator;
