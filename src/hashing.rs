// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Order independent content digest of secret payloads

use k8s_openapi::api::core::v1::Secret;
use sha2::{Digest, Sha256};

/// Compute the canonical digest of a key/value payload.
///
/// Keys are sorted before hashing and each entry is fed as `key || value`
/// without separator. The result is the lowercase hex SHA-256 digest, so two
/// payloads holding the same pairs always hash the same, whatever order they
/// were built or traversed in.
pub fn canonical_digest<I, K, V>(payload: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<[u8]>,
{
    let mut entries: Vec<(K, V)> = payload.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));

    let mut hasher = Sha256::new();
    for (key, value) in &entries {
        hasher.update(key.as_ref().as_bytes());
        hasher.update(value.as_ref());
    }
    format!("{:x}", hasher.finalize())
}

/// Digest of a Secret's `.data`. A secret without data hashes as empty.
pub fn secret_digest(secret: &Secret) -> String {
    match secret.data.as_ref() {
        Some(data) => canonical_digest(data.iter().map(|(k, v)| (k, &v.0))),
        None => canonical_digest(std::iter::empty::<(&str, &[u8])>()),
    }
}
