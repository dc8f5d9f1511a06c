// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Which secrets each workload depends on, and the annotation key each one
//! is tracked under.

use crate::constants::{annotations, deployments, labels, secrets};
use crate::error::{Result, RollwatchError};
use crate::types::apimanager::ApicastEnvironmentSpec;
use crate::types::{ApiManager, ApicastEnvironment};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::fmt;

/// Secret categories. Each maps to one stable annotation prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchCategory {
    HttpsCertificate,
    OpenTelemetry,
    CustomPolicy,
    CustomEnvironment,
    SystemDatabase,
    Zync,
}

impl WatchCategory {
    pub const ALL: [WatchCategory; 6] = [
        WatchCategory::HttpsCertificate,
        WatchCategory::OpenTelemetry,
        WatchCategory::CustomPolicy,
        WatchCategory::CustomEnvironment,
        WatchCategory::SystemDatabase,
        WatchCategory::Zync,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            WatchCategory::HttpsCertificate => annotations::HTTPS_CERT_SECRET_PREFIX,
            WatchCategory::OpenTelemetry => annotations::OPENTELEMETRY_SECRET_PREFIX,
            WatchCategory::CustomPolicy => annotations::CUSTOM_POLICY_SECRET_PREFIX,
            WatchCategory::CustomEnvironment => annotations::CUSTOM_ENV_SECRET_PREFIX,
            WatchCategory::SystemDatabase => annotations::SYSTEM_DATABASE_SECRET_PREFIX,
            WatchCategory::Zync => annotations::ZYNC_SECRET_PREFIX,
        }
    }
}

/// Split a pod template annotation key into its category and secret name.
/// Returns None for keys that are not watch annotations.
pub fn parse_annotation_key(key: &str) -> Option<(WatchCategory, &str)> {
    WatchCategory::ALL.iter().find_map(|category| {
        key.strip_prefix(category.prefix())
            .filter(|name| !name.is_empty())
            .map(|name| (*category, name))
    })
}

/// Secrets opt in with the watched-by label. Anything else is invisible to
/// change detection.
pub fn is_watched(secret: &Secret) -> bool {
    secret
        .metadata
        .labels
        .as_ref()
        .is_some_and(|l| l.contains_key(labels::WATCHED_BY))
}

/// One secret a workload depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedSecretRef {
    pub secret_name: String,
    pub namespace: String,
    pub category: WatchCategory,
    /// A required secret that cannot be read fails the pass; an optional one
    /// that does not exist yet is skipped
    pub required: bool,
}

impl WatchedSecretRef {
    pub fn new(category: WatchCategory, secret_name: &str, namespace: &str) -> Self {
        Self {
            secret_name: secret_name.to_string(),
            namespace: namespace.to_string(),
            category,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn annotation_key(&self) -> String {
        format!("{}{}", self.category.prefix(), self.secret_name)
    }
}

/// Gateway options that decide its watched secrets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApicastOptions {
    pub namespace: String,
    pub https_certificate_secret: Option<String>,
    pub open_telemetry_secret: Option<String>,
    pub custom_policy_secrets: Vec<String>,
    pub custom_environment_secrets: Vec<String>,
}

impl ApicastOptions {
    pub fn from_spec(namespace: &str, spec: Option<&ApicastEnvironmentSpec>) -> Self {
        let Some(spec) = spec else {
            return Self {
                namespace: namespace.to_string(),
                ..Default::default()
            };
        };

        Self {
            namespace: namespace.to_string(),
            https_certificate_secret: spec.https_certificate_secret_name().map(str::to_string),
            open_telemetry_secret: spec.open_telemetry_secret_name().map(str::to_string),
            custom_policy_secrets: spec
                .custom_policies
                .iter()
                .map(|p| p.secret_ref.name.clone())
                .collect(),
            custom_environment_secrets: spec
                .custom_environments
                .iter()
                .map(|e| e.secret_ref.name.clone())
                .collect(),
        }
    }
}

/// Workload kinds that carry watch annotations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Apicast {
        environment: ApicastEnvironment,
        options: ApicastOptions,
    },
    System { namespace: String },
    SystemSearchd { namespace: String },
    Zync { namespace: String },
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Apicast { environment, .. } => write!(f, "apicast-{}", environment),
            Component::System { .. } => write!(f, "system"),
            Component::SystemSearchd { .. } => write!(f, "system-searchd"),
            Component::Zync { .. } => write!(f, "zync"),
        }
    }
}

impl Component {
    /// Map a deployment name to the component that owns it
    pub fn for_deployment(deployment: &str, apimanager: &ApiManager) -> Result<Self> {
        let namespace = apimanager.namespace().unwrap_or_default();
        let apicast = |environment: ApicastEnvironment| Component::Apicast {
            environment,
            options: ApicastOptions::from_spec(
                &namespace,
                apimanager.apicast_environment(environment),
            ),
        };

        match deployment {
            deployments::APICAST_STAGING => Ok(apicast(ApicastEnvironment::Staging)),
            deployments::APICAST_PRODUCTION => Ok(apicast(ApicastEnvironment::Production)),
            deployments::SYSTEM_APP | deployments::SYSTEM_SIDEKIQ => Ok(Component::System {
                namespace: namespace.clone(),
            }),
            deployments::SYSTEM_SEARCHD => Ok(Component::SystemSearchd {
                namespace: namespace.clone(),
            }),
            deployments::ZYNC | deployments::ZYNC_QUE => Ok(Component::Zync {
                namespace: namespace.clone(),
            }),
            other => Err(RollwatchError::UnsupportedComponent(other.to_string())),
        }
    }
}

/// Every deployment the APIManager governs, with its component
pub fn components_for(apimanager: &ApiManager) -> Result<Vec<(&'static str, Component)>> {
    [
        deployments::APICAST_STAGING,
        deployments::APICAST_PRODUCTION,
        deployments::SYSTEM_APP,
        deployments::SYSTEM_SIDEKIQ,
        deployments::SYSTEM_SEARCHD,
        deployments::ZYNC,
        deployments::ZYNC_QUE,
    ]
    .into_iter()
    .map(|name| Ok((name, Component::for_deployment(name, apimanager)?)))
    .collect()
}

/// Enumerate the secrets a component depends on
pub fn resolve_watch_set(component: &Component) -> Vec<WatchedSecretRef> {
    match component {
        Component::Apicast { options, .. } => {
            let ns = options.namespace.as_str();
            let mut refs = Vec::new();

            if let Some(name) = &options.https_certificate_secret {
                refs.push(WatchedSecretRef::new(WatchCategory::HttpsCertificate, name, ns));
            }
            if let Some(name) = &options.open_telemetry_secret {
                refs.push(WatchedSecretRef::new(WatchCategory::OpenTelemetry, name, ns));
            }
            refs.extend(
                options
                    .custom_policy_secrets
                    .iter()
                    .map(|name| WatchedSecretRef::new(WatchCategory::CustomPolicy, name, ns)),
            );
            refs.extend(
                options
                    .custom_environment_secrets
                    .iter()
                    .map(|name| WatchedSecretRef::new(WatchCategory::CustomEnvironment, name, ns)),
            );
            refs
        }
        Component::System { namespace } | Component::SystemSearchd { namespace } => {
            vec![WatchedSecretRef::new(
                WatchCategory::SystemDatabase,
                secrets::SYSTEM_DATABASE,
                namespace,
            )]
        }
        // The zync secret is generated later in the install, so it may not exist yet
        Component::Zync { namespace } => {
            vec![WatchedSecretRef::new(WatchCategory::Zync, secrets::ZYNC, namespace).optional()]
        }
    }
}
