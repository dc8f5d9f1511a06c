// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tracing::{info, warn};

use rollwatch::config::Config;
use rollwatch::kubernetes::deployment_config_api_available;
use rollwatch::reconcilers::ApiManagerReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Rollwatch operator");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, resync_interval={:?}",
        config.watch_namespace.as_deref().unwrap_or("<all>"),
        config.resync_interval
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let legacy_workloads = match deployment_config_api_available(&client).await {
        Ok(available) => available,
        Err(e) => {
            warn!("API discovery failed, skipping legacy workload upgrades: {}", e);
            false
        }
    };

    ApiManagerReconciler::new(client, config, legacy_workloads)
        .run()
        .await?;

    // This should never be reached as the reconciler runs forever
    warn!("Reconciler stopped unexpectedly");
    Ok(())
}
