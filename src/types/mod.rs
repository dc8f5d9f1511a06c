// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types read by the operator.

pub mod apimanager;
pub mod deployment_config;

pub use apimanager::{ApiManager, ApicastEnvironment};
pub use deployment_config::DeploymentConfig;
