// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;
const DEFAULT_ERROR_REQUEUE_SECS: u64 = 60;
const DEFAULT_UPGRADE_REQUEUE_SECS: u64 = 5;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Restrict the operator to a single namespace; all namespaces when unset
    pub watch_namespace: Option<String>,
    /// Requeue delay after a successful pass
    pub resync_interval: Duration,
    /// Requeue delay after a failed pass
    pub error_requeue: Duration,
    /// Requeue delay while a legacy workload is being removed
    pub upgrade_requeue: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let watch_namespace = env::var("WATCH_NAMESPACE").ok().filter(|ns| !ns.is_empty());

        Ok(Config {
            watch_namespace,
            resync_interval: secs_from_env("RESYNC_INTERVAL_SECS", DEFAULT_RESYNC_INTERVAL_SECS)?,
            error_requeue: secs_from_env("ERROR_REQUEUE_SECS", DEFAULT_ERROR_REQUEUE_SECS)?,
            upgrade_requeue: secs_from_env("UPGRADE_REQUEUE_SECS", DEFAULT_UPGRADE_REQUEUE_SECS)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            watch_namespace: None,
            resync_interval: Duration::from_secs(DEFAULT_RESYNC_INTERVAL_SECS),
            error_requeue: Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
            upgrade_requeue: Duration::from_secs(DEFAULT_UPGRADE_REQUEUE_SECS),
        }
    }
}

fn secs_from_env(var: &str, default: u64) -> Result<Duration> {
    match env::var(var) {
        Ok(raw) => parse_secs(var, &raw),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn parse_secs(var: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds, got '{}'", var, raw))?;
    Ok(Duration::from_secs(secs))
}
