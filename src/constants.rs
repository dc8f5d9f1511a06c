// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes label keys used by Rollwatch
pub mod labels {
    /// Presence of this label (any value) opts a Secret into change detection
    pub const WATCHED_BY: &str = "apimanager.apps.3scale.net/watched-by";
    /// Marks objects written by the operator
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
}

/// Pod template annotation prefixes, one per watched secret category.
/// The full key is the prefix followed by the secret name.
pub mod annotations {
    pub const HTTPS_CERT_SECRET_PREFIX: &str =
        "apimanager.apps.3scale.net/https-cert-secret-resource-version-";
    pub const OPENTELEMETRY_SECRET_PREFIX: &str =
        "apimanager.apps.3scale.net/opentelemetry-secret-resource-version-";
    pub const CUSTOM_POLICY_SECRET_PREFIX: &str =
        "apimanager.apps.3scale.net/custompolicy-secret-resource-version-";
    pub const CUSTOM_ENV_SECRET_PREFIX: &str =
        "apimanager.apps.3scale.net/customenv-secret-resource-version-";
    pub const SYSTEM_DATABASE_SECRET_PREFIX: &str =
        "apimanager.apps.3scale.net/systemdatabase-secret-resource-version-";
    pub const ZYNC_SECRET_PREFIX: &str = "apimanager.apps.3scale.net/zync-secret-resource-version-";
}

/// Names of the workloads whose pod templates carry watch annotations
pub mod deployments {
    pub const APICAST_STAGING: &str = "apicast-staging";
    pub const APICAST_PRODUCTION: &str = "apicast-production";
    pub const SYSTEM_APP: &str = "system-app";
    pub const SYSTEM_SIDEKIQ: &str = "system-sidekiq";
    pub const SYSTEM_SEARCHD: &str = "system-searchd";
    pub const ZYNC: &str = "zync";
    pub const ZYNC_QUE: &str = "zync-que";
}

/// Well-known secret names
pub mod secrets {
    /// Snapshot of the last seen digest per watched secret
    pub const HASHED_SECRET_DATA: &str = "hashed-secret-data";
    pub const SYSTEM_DATABASE: &str = "system-database";
    pub const ZYNC: &str = "zync";
}

/// Legacy search index DeploymentConfig replaced by system-searchd
pub mod legacy {
    pub const SPHINX_DEPLOYMENT_CONFIG: &str = "system-sphinx";
    /// Image stream family the replacement workload is built from
    pub const SEARCHD_IMAGE_PREFIX: &str = "system-searchd";
    pub const IMAGE_CHANGE_TRIGGER: &str = "ImageChange";
}

/// The operator name used for server-side apply
pub const OPERATOR_NAME: &str = "rollwatch";

/// API discovery configuration
pub mod discovery {
    pub const DEPLOYMENT_CONFIG_GROUP: &str = "apps.openshift.io";
    pub const DEPLOYMENT_CONFIG_VERSION: &str = "v1";
    pub const DEPLOYMENT_CONFIG_KIND: &str = "DeploymentConfig";
}
