// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod annotations;
pub mod config;
pub mod constants;
pub mod error;
pub mod hashing;
pub mod kubernetes;
pub mod reconcilers;
pub mod snapshot;
pub mod types;
pub mod upgrade;
pub mod watch;

#[cfg(test)]
pub mod test_utils;
