//! Cloudinary request signing.
//!
//! The signature is the SHA-256 of the request parameters sorted by name,
//! joined as `k=v&k=v`, with the API secret appended. `file`, `api_key`,
//! `resource_type` and `signature_algorithm` are never part of the signed set.

use sha2::{Digest, Sha256};

/// Sign a set of request parameters.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}
