//! Deterministic cache keys for remote completion calls

use crate::core::endpoint::{Endpoint, ModelParams};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const KEY_PREFIX: &str = "consilium:cache:";

/// SHA-256 digest of one logical remote call.
///
/// Every field is length-prefixed before hashing so that shifting bytes
/// between adjacent fields cannot produce the same digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(
        endpoint: &Endpoint,
        instructions: Option<&str>,
        payload: &str,
        params: &ModelParams,
    ) -> Self {
        let mut hasher = Sha256::new();

        let mut field = |bytes: &[u8]| {
            hasher.update((bytes.len() as u64).to_be_bytes());
            hasher.update(bytes);
        };

        field(endpoint.id().as_bytes());
        match instructions {
            Some(text) => {
                field(b"\x01");
                field(text.as_bytes());
            }
            None => field(b"\x00"),
        }
        field(payload.as_bytes());
        field(params.model.as_bytes());
        field(&params.temperature.to_bits().to_be_bytes());
        field(&params.max_tokens.to_be_bytes());

        Self(format!("{}{}", KEY_PREFIX, hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(id: &str) -> Endpoint {
        Endpoint::new(id, "https://api.example.com/v1")
    }

    #[test]
    fn test_identical_calls_share_key() {
        let params = ModelParams::default();
        let a = CacheKey::derive(&endpoint("retina"), Some("sys"), "payload", &params);
        let b = CacheKey::derive(&endpoint("retina"), Some("sys"), "payload", &params);
        assert_eq!(a, b);
        assert!(a.as_str().starts_with(KEY_PREFIX));
        assert_eq!(a.as_str().len(), KEY_PREFIX.len() + 64);
    }

    #[test]
    fn test_base_url_does_not_affect_identity() {
        let params = ModelParams::default();
        let a = CacheKey::derive(&endpoint("retina"), None, "payload", &params);
        let b = CacheKey::derive(
            &Endpoint::new("retina", "http://localhost:9000"),
            None,
            "payload",
            &params,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_each_component_changes_key() {
        let params = ModelParams::default();
        let base = CacheKey::derive(&endpoint("retina"), Some("sys"), "payload", &params);

        let variants = [
            CacheKey::derive(&endpoint("cornea"), Some("sys"), "payload", &params),
            CacheKey::derive(&endpoint("retina"), None, "payload", &params),
            CacheKey::derive(&endpoint("retina"), Some("sys"), "payload!", &params),
            CacheKey::derive(
                &endpoint("retina"),
                Some("sys"),
                "payload",
                &params.clone().with_model("other"),
            ),
            CacheKey::derive(
                &endpoint("retina"),
                Some("sys"),
                "payload",
                &params.clone().with_temperature(0.1),
            ),
            CacheKey::derive(
                &endpoint("retina"),
                Some("sys"),
                "payload",
                &params.clone().with_max_tokens(1),
            ),
        ];

        for variant in variants {
            assert_ne!(base, variant);
        }
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let params = ModelParams::default();
        let a = CacheKey::derive(&endpoint("ab"), Some("c"), "payload", &params);
        let b = CacheKey::derive(&endpoint("a"), Some("bc"), "payload", &params);
        assert_ne!(a, b);

        let empty = CacheKey::derive(&endpoint("retina"), Some(""), "payload", &params);
        let none = CacheKey::derive(&endpoint("retina"), None, "payload", &params);
        assert_ne!(empty, none);
    }
}
