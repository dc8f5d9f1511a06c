// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::legacy::IMAGE_CHANGE_TRIGGER;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// OpenShift DeploymentConfig, reduced to the fields the upgrade check reads.
/// Only ever read and deleted, never written back.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "apps.openshift.io", version = "v1", kind = "DeploymentConfig")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<DeploymentTriggerPolicy>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTriggerPolicy {
    #[serde(rename = "type")]
    pub trigger_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_change_params: Option<ImageChangeParams>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageChangeParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub container_names: Vec<String>,
    pub from: TriggerSource,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl DeploymentConfig {
    /// Source image (usually an ImageStreamTag such as `amp-system:2.X`) of the
    /// first image change trigger
    pub fn image_change_source(&self) -> Option<&str> {
        self.spec
            .triggers
            .iter()
            .find(|t| t.trigger_type == IMAGE_CHANGE_TRIGGER)
            .and_then(|t| t.image_change_params.as_ref())
            .map(|p| p.from.name.as_str())
    }

    pub fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }
}
