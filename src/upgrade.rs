// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Replace legacy DeploymentConfigs whose image trigger still points at the
//! old image family. The workload cannot be renamed in place, so it is
//! deleted and the regular apply path recreates it under its new identity.

use crate::error::{is_not_found, Result, RollwatchError};
use crate::types::DeploymentConfig;
use kube::{api::DeleteParams, Api};
use tracing::{debug, info, instrument};

/// Outcome of one upgrade check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeState {
    /// Nothing to upgrade, the workload does not exist
    Absent,
    /// The workload already uses the new image family
    AlreadyMigrated,
    /// Delete was issued in this pass
    PendingDeletion,
    /// The workload is still being removed by the cluster
    Deleting,
}

impl UpgradeState {
    pub fn requeue(self) -> bool {
        matches!(self, UpgradeState::PendingDeletion | UpgradeState::Deleting)
    }
}

/// Check the DeploymentConfig `name` and delete it when its image change
/// trigger does not reference `new_image_prefix` yet.
#[instrument(skip(api))]
pub async fn detect_and_migrate(
    api: &Api<DeploymentConfig>,
    name: &str,
    new_image_prefix: &str,
) -> Result<UpgradeState> {
    let Some(existing) = api.get_opt(name).await? else {
        debug!("DeploymentConfig {} not found, nothing to upgrade", name);
        return Ok(UpgradeState::Absent);
    };

    let source = existing.image_change_source().ok_or_else(|| {
        RollwatchError::InvalidWorkload(format!(
            "DeploymentConfig {} has no image change trigger",
            name
        ))
    })?;

    if source.starts_with(new_image_prefix) {
        debug!("DeploymentConfig {} already uses {}", name, source);
        return Ok(UpgradeState::AlreadyMigrated);
    }

    if existing.is_deleting() {
        debug!("DeploymentConfig {} still deleting, requeue", name);
        return Ok(UpgradeState::Deleting);
    }

    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            info!(
                "Deleted DeploymentConfig {} built from {}, it will be recreated from {}",
                name, source, new_image_prefix
            );
            Ok(UpgradeState::PendingDeletion)
        }
        Err(e) if is_not_found(&e) => {
            debug!("DeploymentConfig {} disappeared before delete", name);
            Ok(UpgradeState::Absent)
        }
        Err(e) => Err(e.into()),
    }
}
