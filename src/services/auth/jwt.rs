use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::services::auth::codec::{CodecError, TokenCodec, VerifiedClaims};

#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    iss: &'a str,
    aud: &'a [String],
    sub: &'a str,
    name: &'a str,
    iat: i64,
    exp: i64,
    jti: String,
}

/// HS256 token codec keyed by a pre-shared secret.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtCodec {
    issuer: String,
    audiences: Vec<String>,
    ttl_seconds: u64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JwtCodec")
            .field("issuer", &self.issuer)
            .field("audiences", &self.audiences)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl JwtCodec {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(config.audiences.as_slice());
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = config.leeway_seconds;

        Self {
            issuer: config.issuer.clone(),
            audiences: config.audiences.clone(),
            ttl_seconds: config.ttl_seconds,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token as if it had been issued at `issued_at` (unix seconds).
    pub fn sign_at(
        &self,
        subject: &str,
        name: &str,
        issued_at: i64,
    ) -> Result<String, CodecError> {
        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| issued_at.checked_add(ttl))
            .ok_or_else(|| {
                error!(ttl_seconds = self.ttl_seconds, "token expiry out of range");
                CodecError::Backend("token expiry out of range".into())
            })?;

        let claims = IssuedClaims {
            iss: &self.issuer,
            aud: &self.audiences,
            sub: subject,
            name,
            iat: issued_at,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            CodecError::Signing(e)
        })
    }

    pub fn verify_now(&self, token: &str) -> Result<VerifiedClaims, CodecError> {
        let data =
            jsonwebtoken::decode::<VerifiedClaims>(token, &self.decoding_key, &self.validation)
                .map_err(classify)?;

        Ok(data.claims)
    }
}

#[async_trait]
impl TokenCodec for JwtCodec {
    async fn sign(&self, subject: &str, name: &str) -> Result<String, CodecError> {
        self.sign_at(subject, name, chrono::Utc::now().timestamp())
    }

    async fn verify(&self, token: &str) -> Result<VerifiedClaims, CodecError> {
        self.verify_now(token)
    }

    fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> CodecError {
    if matches!(err.kind(), ErrorKind::ExpiredSignature) {
        return CodecError::Expired;
    }

    let rejected = matches!(
        err.kind(),
        ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
    );

    if rejected {
        debug!(error = %err, "token rejected");
        CodecError::Invalid(err)
    } else {
        CodecError::Backend(err.to_string())
    }
}

/// Decode the payload segment without checking the signature.
///
/// Only for diagnostics (e.g. logging who logged out); never trust the result.
pub fn peek_payload(token: &str) -> Option<serde_json::Value> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}
