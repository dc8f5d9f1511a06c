// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod template annotations that roll a workload when a watched secret changes.
//!
//! Each watched secret is tracked under `<category prefix><secret name>` with
//! the secret's resourceVersion as value. A moved resourceVersion alone is
//! not enough to restart pods: the secret's content digest must also differ
//! from the one recorded in the snapshot, otherwise the existing value is kept.

use crate::error::{is_not_found, Result, RollwatchError};
use crate::hashing::secret_digest;
use crate::snapshot::Snapshot;
use crate::watch::{is_watched, parse_annotation_key, WatchedSecretRef};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client, ResourceExt};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// A watched secret as read during the current pass
#[derive(Debug, Clone)]
pub struct ObservedSecret {
    pub reference: WatchedSecretRef,
    pub secret: Secret,
}

impl ObservedSecret {
    pub fn annotation_key(&self) -> String {
        self.reference.annotation_key()
    }

    pub fn resource_version(&self) -> String {
        self.secret.resource_version().unwrap_or_default()
    }

    pub fn digest(&self) -> String {
        secret_digest(&self.secret)
    }
}

/// Read every secret of the watch set and keep the ones carrying the
/// watched-by label.
#[instrument(skip(client, watch_set), fields(refs = watch_set.len()))]
pub async fn observe_watch_set(
    client: &Client,
    watch_set: &[WatchedSecretRef],
) -> Result<Vec<ObservedSecret>> {
    let mut observed = Vec::with_capacity(watch_set.len());

    for reference in watch_set {
        let secrets: Api<Secret> = Api::namespaced(client.clone(), &reference.namespace);
        let secret = match secrets.get(&reference.secret_name).await {
            Ok(secret) => secret,
            Err(e) if is_not_found(&e) && !reference.required => {
                debug!(
                    "Optional secret {}/{} not found, yet to be created",
                    reference.namespace, reference.secret_name
                );
                continue;
            }
            Err(e) if is_not_found(&e) => {
                return Err(RollwatchError::MissingSecret {
                    name: reference.secret_name.clone(),
                    namespace: reference.namespace.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !is_watched(&secret) {
            debug!(
                "Secret {}/{} is not watched, ignoring",
                reference.namespace, reference.secret_name
            );
            continue;
        }

        observed.push(ObservedSecret {
            reference: reference.clone(),
            secret,
        });
    }

    Ok(observed)
}

/// Annotations built from the freshly observed resourceVersions only
pub fn unchecked_annotations(observed: &[ObservedSecret]) -> BTreeMap<String, String> {
    observed
        .iter()
        .map(|o| (o.annotation_key(), o.resource_version()))
        .collect()
}

/// Merge observed secrets with the annotations already on the workload.
///
/// `existing` is None when the workload does not exist yet. Without a
/// workload or without a snapshot there is nothing to compare against and
/// the observed resourceVersions are returned as is.
pub fn reconcile_annotations(
    observed: &[ObservedSecret],
    existing: Option<&BTreeMap<String, String>>,
    snapshot: Option<&Snapshot>,
) -> BTreeMap<String, String> {
    let (Some(existing), Some(snapshot)) = (existing, snapshot) else {
        return unchecked_annotations(observed);
    };

    let mut reconciled = BTreeMap::new();
    for secret in observed {
        let key = secret.annotation_key();
        let resource_version = secret.resource_version();

        let value = match existing.get(&key).filter(|v| !v.is_empty()) {
            None => resource_version,
            Some(current) if *current == resource_version => resource_version,
            Some(current) => {
                let name = &secret.reference.secret_name;
                if snapshot.recorded_digest(name) != Some(secret.digest().as_str()) {
                    debug!(
                        "{} secret data has changed, updating resourceVersion {} -> {}",
                        name, current, resource_version
                    );
                    resource_version
                } else {
                    debug!("{} secret data has not changed since last checked", name);
                    current.clone()
                }
            }
        };
        reconciled.insert(key, value);
    }
    reconciled
}

/// Annotations currently on a deployment's pod template
pub fn pod_template_annotations(deployment: &Deployment) -> BTreeMap<String, String> {
    deployment
        .spec
        .as_ref()
        .and_then(|s| s.template.metadata.as_ref())
        .and_then(|m| m.annotations.clone())
        .unwrap_or_default()
}

/// Annotations computed for one workload, together with the secrets they
/// were computed from
#[derive(Debug, Clone)]
pub struct WorkloadAnnotations {
    pub annotations: BTreeMap<String, String>,
    pub observed: Vec<ObservedSecret>,
}

/// Compute the watch annotations a workload should carry
#[instrument(skip_all, fields(workload = ?existing.map(|d| d.name_any())))]
pub async fn compute_annotations(
    client: &Client,
    existing: Option<&Deployment>,
    snapshot: Option<&Snapshot>,
    watch_set: &[WatchedSecretRef],
) -> Result<WorkloadAnnotations> {
    let observed = observe_watch_set(client, watch_set).await?;
    let existing_annotations = existing.map(pod_template_annotations);
    let annotations = reconcile_annotations(&observed, existing_annotations.as_ref(), snapshot);
    Ok(WorkloadAnnotations {
        annotations,
        observed,
    })
}

/// Merge patch bringing the pod template in line with `desired`.
///
/// Watch annotations that are no longer desired are removed; annotations
/// owned by others are left alone. None when nothing needs to change.
pub fn annotation_patch(
    existing: &BTreeMap<String, String>,
    desired: &BTreeMap<String, String>,
) -> Option<Value> {
    let mut changes = Map::new();

    for (key, value) in desired {
        if existing.get(key) != Some(value) {
            changes.insert(key.clone(), Value::String(value.clone()));
        }
    }
    for key in existing.keys() {
        if parse_annotation_key(key).is_some() && !desired.contains_key(key) {
            changes.insert(key.clone(), Value::Null);
        }
    }

    if changes.is_empty() {
        return None;
    }
    Some(json!({
        "spec": {
            "template": {
                "metadata": {
                    "annotations": changes
                }
            }
        }
    }))
}
