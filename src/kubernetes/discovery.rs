// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! API availability checks

use crate::constants::discovery::{
    DEPLOYMENT_CONFIG_GROUP, DEPLOYMENT_CONFIG_KIND, DEPLOYMENT_CONFIG_VERSION,
};
use crate::error::Result;
use kube::{discovery::Discovery, Client};
use tracing::{debug, info};

/// Check whether the cluster serves DeploymentConfigs (OpenShift only).
/// Legacy workload upgrades are skipped everywhere else.
pub async fn deployment_config_api_available(client: &Client) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[DEPLOYMENT_CONFIG_GROUP])
        .run()
        .await?;

    for group in discovery.groups() {
        if group.name() == DEPLOYMENT_CONFIG_GROUP {
            for (ar, _) in group.recommended_resources() {
                if ar.kind == DEPLOYMENT_CONFIG_KIND && ar.version == DEPLOYMENT_CONFIG_VERSION {
                    info!(
                        "{} ({}/{}) is available",
                        DEPLOYMENT_CONFIG_KIND, DEPLOYMENT_CONFIG_GROUP, DEPLOYMENT_CONFIG_VERSION
                    );
                    return Ok(true);
                }
            }
        }
    }

    debug!("{} API not served by this cluster", DEPLOYMENT_CONFIG_KIND);
    Ok(false)
}
