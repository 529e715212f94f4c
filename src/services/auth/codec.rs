use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors from the token sign/verify primitive.
///
/// Callers decide how each maps onto an authentication outcome; only
/// `Expired` and `Invalid` are client-side problems.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("token expired")]
    Expired,

    #[error("token rejected: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token codec failure: {0}")]
    Backend(String),
}

/// Identity claims carried by a verified token.
///
/// Both fields are optional on the wire; registered claims (`iss`, `aud`,
/// `exp`) are checked by the codec and not surfaced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerifiedClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Signs and verifies credentials.
///
/// Implementations must be cheap to share (`Arc<dyn TokenCodec>`).
#[async_trait]
pub trait TokenCodec: Send + Sync {
    async fn sign(&self, subject: &str, name: &str) -> Result<String, CodecError>;

    async fn verify(&self, token: &str) -> Result<VerifiedClaims, CodecError>;

    fn ttl_seconds(&self) -> u64;
}
