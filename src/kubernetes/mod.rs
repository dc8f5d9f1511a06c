// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes API discovery utilities.

pub mod discovery;

pub use discovery::deployment_config_api_available;
