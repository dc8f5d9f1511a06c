// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! APIManager reconciler - keeps watch annotations on every workload in sync
//! with the secrets it depends on, then refreshes the digest snapshot.

use crate::annotations::{annotation_patch, compute_annotations, pod_template_annotations};
use crate::config::Config;
use crate::constants::{labels, legacy};
use crate::error::{Result, RollwatchError};
use crate::snapshot::{apply_snapshot, build_snapshot, collect_digests, fetch_snapshot};
use crate::types::{ApiManager, DeploymentConfig};
use crate::upgrade::detect_and_migrate;
use crate::watch::{components_for, resolve_watch_set};
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{Patch, PatchParams},
    runtime::{
        controller::Action,
        reflector::{ObjectRef, Store},
        Controller,
    },
    Api, Client, Resource, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct ApiManagerReconciler {
    client: Client,
    config: Config,
    /// Whether the cluster serves DeploymentConfigs
    legacy_workloads: bool,
}

impl ApiManagerReconciler {
    pub fn new(client: Client, config: Config, legacy_workloads: bool) -> Self {
        Self {
            client,
            config,
            legacy_workloads,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let (apimanagers, secrets): (Api<ApiManager>, Api<Secret>) =
            match &self.config.watch_namespace {
                Some(ns) => (
                    Api::namespaced(self.client.clone(), ns),
                    Api::namespaced(self.client.clone(), ns),
                ),
                None => (Api::all(self.client.clone()), Api::all(self.client.clone())),
            };
        let context = Arc::new(self);

        let controller = Controller::new(apimanagers, WatcherConfig::default());
        let store = controller.store();

        controller
            .watches(
                secrets,
                WatcherConfig::default().labels(labels::WATCHED_BY),
                move |secret| apimanagers_in_namespace(&store, &secret),
            )
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled apimanager: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

/// A watched secret changing affects every APIManager in its namespace
fn apimanagers_in_namespace(store: &Store<ApiManager>, secret: &Secret) -> Vec<ObjectRef<ApiManager>> {
    let namespace = secret.namespace();
    store
        .state()
        .iter()
        .filter(|apimanager| apimanager.namespace() == namespace)
        .map(|apimanager| ObjectRef::from_obj(apimanager.as_ref()))
        .collect()
}

#[instrument(skip(apimanager, ctx), fields(apimanager = %apimanager.name_any()))]
async fn reconcile(apimanager: Arc<ApiManager>, ctx: Arc<ApiManagerReconciler>) -> Result<Action> {
    let namespace = apimanager.namespace().unwrap_or_default();

    debug!("Reconciling apimanager: {}/{}", namespace, apimanager.name_any());

    if ctx.legacy_workloads {
        let dcs: Api<DeploymentConfig> = Api::namespaced(ctx.client.clone(), &namespace);
        let state = detect_and_migrate(
            &dcs,
            legacy::SPHINX_DEPLOYMENT_CONFIG,
            legacy::SEARCHD_IMAGE_PREFIX,
        )
        .await?;
        if state.requeue() {
            info!("Upgrading {}: {:?}, requeue", legacy::SPHINX_DEPLOYMENT_CONFIG, state);
            return Ok(Action::requeue(ctx.config.upgrade_requeue));
        }
    }

    let secrets: Api<Secret> = Api::namespaced(ctx.client.clone(), &namespace);
    let deployments: Api<Deployment> = Api::namespaced(ctx.client.clone(), &namespace);

    // Read once, shared by every workload of this pass
    let snapshot = fetch_snapshot(&secrets).await?;

    let mut observed = Vec::new();
    for (name, component) in components_for(&apimanager)? {
        let watch_set = resolve_watch_set(&component);
        let existing = deployments.get_opt(name).await?;
        let computed =
            compute_annotations(&ctx.client, existing.as_ref(), snapshot.as_ref(), &watch_set)
                .await?;

        match &existing {
            Some(deployment) => {
                apply_watch_annotations(&deployments, deployment, &computed.annotations).await?
            }
            None => debug!("Deployment {} ({}) not created yet", name, component),
        }
        observed.extend(computed.observed);
    }

    // Record exactly what the annotations above were computed from
    let digests = collect_digests(&observed);
    let owner = apimanager.controller_owner_ref(&());
    apply_snapshot(&secrets, &build_snapshot(&namespace, digests, owner)).await?;

    Ok(Action::requeue(ctx.config.resync_interval))
}

async fn apply_watch_annotations(
    deployments: &Api<Deployment>,
    deployment: &Deployment,
    desired: &BTreeMap<String, String>,
) -> Result<()> {
    let name = deployment.name_any();
    let existing = pod_template_annotations(deployment);

    let Some(patch) = annotation_patch(&existing, desired) else {
        debug!("Deployment {} watch annotations up to date", name);
        return Ok(());
    };

    deployments
        .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    info!("Updated watch annotations of deployment {}", name);
    Ok(())
}

fn error_policy(
    _apimanager: Arc<ApiManager>,
    error: &RollwatchError,
    ctx: Arc<ApiManagerReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(ctx.config.error_requeue)
}
