// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to parse values for chart {chart}: {source}")]
    InvalidValues {
        chart: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid Kubernetes version: {0}")]
    InvalidVersion(String),

    #[error("Unsupported Kubernetes version: {0}")]
    UnsupportedVersion(String),

    #[error("Helm operation failed: {0}")]
    Helm(String),

    #[error("Failed to parse kubeconfig: {0}")]
    Kubeconfig(String),

    #[error("Auth provider cleanup failed: {0}")]
    Cleanup(String),
}

impl ControllerError {
    /// True for errors that mean "the object or key is absent", which callers
    /// treat as "use the defaults".
    pub fn is_not_found(&self) -> bool {
        match self {
            ControllerError::NotFound(_) => true,
            ControllerError::Kube(kube::Error::Api(err)) => err.code == 404,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;
