use async_trait::async_trait;

use crate::contract::model::Principal;

/// Output port: one-way password hashing. Implementations may block, so
/// callers always await.
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash(&self, password: &str) -> anyhow::Result<String>;
    /// `Ok(false)` on mismatch; `Err` only when `hash` is unusable.
    async fn verify(&self, password: &str, hash: &str) -> anyhow::Result<bool>;
}

/// Output port: stateless bearer tokens carrying a [`Principal`].
pub trait TokenService: Send + Sync {
    fn issue(&self, principal: &Principal) -> anyhow::Result<String>;
    /// Fails on bad signature, malformed token or expiry.
    fn verify(&self, token: &str) -> anyhow::Result<Principal>;
}
