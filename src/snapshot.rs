// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The `hashed-secret-data` secret: last known digest per watched secret

use crate::annotations::ObservedSecret;
use crate::constants::{labels, secrets::HASHED_SECRET_DATA, OPERATOR_NAME};
use crate::error::Result;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use k8s_openapi::ByteString;
use kube::{
    api::{ObjectMeta, Patch, PatchParams},
    Api,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

/// Digests recorded by the previous pass, keyed by secret name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    digests: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn new(digests: BTreeMap<String, String>) -> Self {
        Self { digests }
    }

    pub fn from_secret(secret: &Secret) -> Self {
        let digests = secret
            .data
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), String::from_utf8_lossy(&v.0).into_owned()))
            .collect();
        Self { digests }
    }

    pub fn recorded_digest(&self, secret_name: &str) -> Option<&str> {
        self.digests.get(secret_name).map(String::as_str)
    }

    pub fn digests(&self) -> &BTreeMap<String, String> {
        &self.digests
    }
}

/// Fetch the snapshot, None when it has never been written
#[instrument(skip(secrets))]
pub async fn fetch_snapshot(secrets: &Api<Secret>) -> Result<Option<Snapshot>> {
    let snapshot = secrets
        .get_opt(HASHED_SECRET_DATA)
        .await?
        .map(|secret| Snapshot::from_secret(&secret));
    if snapshot.is_none() {
        debug!("Snapshot secret {} does not exist yet", HASHED_SECRET_DATA);
    }
    Ok(snapshot)
}

/// Digests of the secrets observed during this pass, keyed by secret name.
///
/// A secret read with different content by two workloads of the same pass
/// is left out, so the next pass treats it as changed for every workload.
pub fn collect_digests(observed: &[ObservedSecret]) -> BTreeMap<String, String> {
    let mut digests = BTreeMap::new();
    let mut conflicting = BTreeSet::new();

    for secret in observed {
        let name = secret.reference.secret_name.clone();
        let digest = secret.digest();
        match digests.get(&name) {
            Some(recorded) if *recorded != digest => {
                debug!("Secret {} changed during this pass, not recording a digest", name);
                conflicting.insert(name);
            }
            Some(_) => {}
            None => {
                digests.insert(name, digest);
            }
        }
    }

    digests.retain(|name, _| !conflicting.contains(name));
    digests
}

/// Build the snapshot secret for a namespace
pub fn build_snapshot(
    namespace: &str,
    digests: BTreeMap<String, String>,
    owner: Option<OwnerReference>,
) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(HASHED_SECRET_DATA.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([(
                labels::MANAGED_BY.to_string(),
                OPERATOR_NAME.to_string(),
            )])),
            owner_references: owner.map(|o| vec![o]),
            ..Default::default()
        },
        data: Some(
            digests
                .into_iter()
                .map(|(name, digest)| (name, ByteString(digest.into_bytes())))
                .collect(),
        ),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

/// Write the snapshot with server-side apply. Entries missing from
/// `snapshot` are dropped from the stored secret.
#[instrument(skip(secrets, snapshot))]
pub async fn apply_snapshot(secrets: &Api<Secret>, snapshot: &Secret) -> Result<()> {
    let pp = PatchParams::apply(OPERATOR_NAME).force();
    secrets
        .patch(HASHED_SECRET_DATA, &pp, &Patch::Apply(snapshot))
        .await?;

    info!(
        "Applied {} with {} digests",
        HASHED_SECRET_DATA,
        snapshot.data.as_ref().map_or(0, |d| d.len())
    );
    Ok(())
}
