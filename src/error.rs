// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RollwatchError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Unrecognized component {0} is not supported")]
    UnsupportedComponent(String),

    #[error("Required secret {namespace}/{name} not found")]
    MissingSecret { name: String, namespace: String },

    #[error("Invalid workload: {0}")]
    InvalidWorkload(String),
}

pub type Result<T> = std::result::Result<T, RollwatchError>;

/// True when the error is a 404 returned by the API server
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(e) if e.code == 404)
}
