// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The subset of the APIManager resource that decides which secrets
/// each workload depends on.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "apps.3scale.net", version = "v1alpha1", kind = "APIManager")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ApiManagerSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apicast: Option<ApicastSpec>,
}

pub type ApiManager = APIManager;

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApicastSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_spec: Option<ApicastEnvironmentSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_spec: Option<ApicastEnvironmentSpec>,
}

/// Per environment gateway settings
#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApicastEnvironmentSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_policies: Vec<CustomPolicySpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_environments: Vec<CustomEnvironmentSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_telemetry: Option<OpenTelemetrySpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_certificate_secret_ref: Option<SecretReference>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomPolicySpec {
    pub name: String,
    pub version: String,
    /// Secret holding the policy metadata and lua code
    pub secret_ref: SecretReference,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomEnvironmentSpec {
    pub secret_ref: SecretReference,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenTelemetrySpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracing_config_secret_ref: Option<SecretReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracing_config_secret_key: Option<String>,
}

/// Reference to a secret in the same namespace
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub struct SecretReference {
    pub name: String,
}

/// The two gateway deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApicastEnvironment {
    Staging,
    Production,
}

impl fmt::Display for ApicastEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApicastEnvironment::Staging => write!(f, "staging"),
            ApicastEnvironment::Production => write!(f, "production"),
        }
    }
}

impl ApiManager {
    /// Gateway settings for one environment, if any were given
    pub fn apicast_environment(&self, env: ApicastEnvironment) -> Option<&ApicastEnvironmentSpec> {
        let apicast = self.spec.apicast.as_ref()?;
        match env {
            ApicastEnvironment::Staging => apicast.staging_spec.as_ref(),
            ApicastEnvironment::Production => apicast.production_spec.as_ref(),
        }
    }
}

impl ApicastEnvironmentSpec {
    /// OpenTelemetry is off unless explicitly enabled
    pub fn open_telemetry_enabled(&self) -> bool {
        self.open_telemetry
            .as_ref()
            .and_then(|o| o.enabled)
            .unwrap_or(false)
    }

    /// Name of the OpenTelemetry config secret when the integration is enabled
    pub fn open_telemetry_secret_name(&self) -> Option<&str> {
        if !self.open_telemetry_enabled() {
            return None;
        }
        self.open_telemetry
            .as_ref()
            .and_then(|o| o.tracing_config_secret_ref.as_ref())
            .map(|r| r.name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn https_certificate_secret_name(&self) -> Option<&str> {
        self.https_certificate_secret_ref
            .as_ref()
            .map(|r| r.name.as_str())
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;
    use kube::Resource;

    fn secret_ref(name: &str) -> SecretReference {
        SecretReference {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_resource_identity() {
        assert_eq!(ApiManager::kind(&()), "APIManager");
        assert_eq!(ApiManager::api_version(&()), "apps.3scale.net/v1alpha1");
        assert_eq!(ApiManager::plural(&()), "apimanagers");
    }

    fn make_apimanager(spec: ApiManagerSpec) -> ApiManager {
        ApiManager {
            metadata: ObjectMeta {
                name: Some("3scale".to_string()),
                namespace: Some("3scale-test".to_string()),
                ..Default::default()
            },
            spec,
        }
    }

    #[test]
    fn test_apicast_environment_selects_spec() {
        let apimanager = make_apimanager(ApiManagerSpec {
            apicast: Some(ApicastSpec {
                staging_spec: None,
                production_spec: Some(ApicastEnvironmentSpec {
                    https_certificate_secret_ref: Some(secret_ref("prod-cert")),
                    ..Default::default()
                }),
            }),
        });

        assert!(apimanager
            .apicast_environment(ApicastEnvironment::Staging)
            .is_none());
        let production = apimanager
            .apicast_environment(ApicastEnvironment::Production)
            .unwrap();
        assert_eq!(production.https_certificate_secret_name(), Some("prod-cert"));
    }

    #[test]
    fn test_apicast_environment_without_apicast() {
        let apimanager = make_apimanager(ApiManagerSpec::default());
        assert!(apimanager
            .apicast_environment(ApicastEnvironment::Production)
            .is_none());
    }

    #[test]
    fn test_open_telemetry_secret_requires_enabled() {
        let mut env = ApicastEnvironmentSpec {
            open_telemetry: Some(OpenTelemetrySpec {
                enabled: None,
                tracing_config_secret_ref: Some(secret_ref("otel")),
                tracing_config_secret_key: None,
            }),
            ..Default::default()
        };
        assert_eq!(env.open_telemetry_secret_name(), None);

        env.open_telemetry.as_mut().unwrap().enabled = Some(true);
        assert_eq!(env.open_telemetry_secret_name(), Some("otel"));
    }

    #[test]
    fn test_empty_secret_names_are_ignored() {
        let env = ApicastEnvironmentSpec {
            https_certificate_secret_ref: Some(secret_ref("")),
            open_telemetry: Some(OpenTelemetrySpec {
                enabled: Some(true),
                tracing_config_secret_ref: Some(secret_ref("")),
                tracing_config_secret_key: None,
            }),
            ..Default::default()
        };
        assert_eq!(env.https_certificate_secret_name(), None);
        assert_eq!(env.open_telemetry_secret_name(), None);
    }

    #[test]
    fn test_deserialize_camel_case_spec() {
        let json = serde_json::json!({
            "apicast": {
                "stagingSpec": {
                    "customPolicies": [
                        {"name": "p", "version": "0.1", "secretRef": {"name": "policy-secret"}}
                    ],
                    "customEnvironments": [{"secretRef": {"name": "env-secret"}}],
                    "httpsCertificateSecretRef": {"name": "cert"}
                }
            }
        });
        let spec: ApiManagerSpec = serde_json::from_value(json).unwrap();
        let staging = spec.apicast.unwrap().staging_spec.unwrap();
        assert_eq!(staging.custom_policies[0].secret_ref.name, "policy-secret");
        assert_eq!(staging.custom_environments[0].secret_ref.name, "env-secret");
        assert_eq!(staging.https_certificate_secret_name(), Some("cert"));
    }
}
