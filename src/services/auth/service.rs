use std::sync::Arc;

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::channel::AuthMode;
use crate::services::auth::codec::{CodecError, TokenCodec};
use crate::services::auth::jwt::peek_payload;

/// Outcome of resolving a request's credential when it is not an `AuthCtx`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No credential, or one that failed signature/issuer/audience/shape checks.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Well-formed and correctly signed, but past its expiry.
    #[error("token expired")]
    Expired,

    #[error("internal authentication failure")]
    Internal,
}

impl From<CodecError> for AuthError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Expired => AuthError::Expired,
            CodecError::Invalid(_) => AuthError::Unauthenticated,
            CodecError::Signing(_) | CodecError::Backend(_) => AuthError::Internal,
        }
    }
}

/// Resolves, issues and clears credentials.
#[derive(Clone)]
pub struct AuthService {
    codec: Arc<dyn TokenCodec>,
    cookie_name: String,
    secure_cookie: bool,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("cookie_name", &self.cookie_name)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        codec: Arc<dyn TokenCodec>,
        cookie_name: impl Into<String>,
        secure_cookie: bool,
    ) -> Self {
        Self {
            codec,
            cookie_name: cookie_name.into(),
            secure_cookie,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.codec.ttl_seconds()
    }

    /// Find the credential through the channels `mode` allows and verify it.
    pub async fn resolve(
        &self,
        headers: &HeaderMap,
        mode: AuthMode,
    ) -> Result<AuthCtx, AuthError> {
        let token = mode
            .channels()
            .iter()
            .find_map(|channel| channel.probe(headers, &self.cookie_name))
            .ok_or(AuthError::Unauthenticated)?;

        let claims = self.codec.verify(&token).await.map_err(|e| {
            match &e {
                CodecError::Expired => debug!("credential expired"),
                CodecError::Invalid(err) => debug!(error = %err, "credential rejected"),
                other => error!(error = %other, "credential verification failed"),
            }
            AuthError::from(e)
        })?;

        Ok(AuthCtx::new(
            claims.sub.unwrap_or_default(),
            claims.name.unwrap_or_default(),
        ))
    }

    /// Sign a new credential for `subject`.
    pub async fn issue(&self, subject: &str, name: &str) -> Result<String, AuthError> {
        self.codec.sign(subject, name).await.map_err(|e| {
            error!(error = %e, subject, "failed to issue credential");
            AuthError::Internal
        })
    }

    /// Store `token` in the auth cookie.
    pub fn store(&self, jar: CookieJar, token: String) -> CookieJar {
        let cookie = Cookie::build((self.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie);

        jar.add(cookie)
    }

    /// Remove the auth cookie.
    ///
    /// Returns the unverified payload of the removed credential, if it decoded,
    /// for logging only.
    pub fn clear(&self, jar: CookieJar) -> (CookieJar, Option<serde_json::Value>) {
        let previous = jar.get(&self.cookie_name).map(|c| c.value().to_string());
        let jar = jar.remove(Cookie::build((self.cookie_name.clone(), "")).path("/"));

        let payload = previous.as_deref().and_then(|token| {
            let decoded = peek_payload(token);
            if decoded.is_none() {
                warn!("cleared credential cookie did not decode");
            }
            decoded
        });

        (jar, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::services::auth::codec::test_support::BrokenCodec;
    use crate::services::auth::jwt::JwtCodec;
    use axum::http::{HeaderValue, header};

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            issuer: "hello-starter".into(),
            audiences: vec!["web".into()],
            ttl_seconds: 3600,
            leeway_seconds: 0,
        }
    }

    fn codec() -> JwtCodec {
        JwtCodec::new(&jwt_config())
    }

    fn service() -> AuthService {
        AuthService::new(Arc::new(codec()), "token", false)
    }

    fn with_cookie(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("token={token}")).unwrap(),
        );
        headers
    }

    fn with_bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn issue_then_resolve_via_cookie() {
        let auth = service();
        let token = auth.issue("u1", "Alice").await.unwrap();

        let ctx = auth
            .resolve(&with_cookie(&token), AuthMode::Any)
            .await
            .unwrap();
        assert_eq!(ctx, AuthCtx::new("u1", "Alice"));
    }

    #[tokio::test]
    async fn falls_back_to_bearer_header() {
        let auth = service();
        let token = auth.issue("u1", "Alice").await.unwrap();

        let ctx = auth
            .resolve(&with_bearer(&token), AuthMode::Any)
            .await
            .unwrap();
        assert_eq!(ctx, AuthCtx::new("u1", "Alice"));
    }

    #[tokio::test]
    async fn cookie_wins_over_header() {
        let auth = service();
        let cookie_token = auth.issue("from-cookie", "C").await.unwrap();
        let header_token = auth.issue("from-header", "H").await.unwrap();

        let mut headers = with_cookie(&cookie_token);
        headers.extend(with_bearer(&header_token));

        let ctx = auth.resolve(&headers, AuthMode::Any).await.unwrap();
        assert_eq!(ctx.id, "from-cookie");

        let ctx = auth.resolve(&headers, AuthMode::Header).await.unwrap();
        assert_eq!(ctx.id, "from-header");
    }

    #[tokio::test]
    async fn mode_restricts_channels() {
        let auth = service();
        let token = auth.issue("u1", "Alice").await.unwrap();

        assert_eq!(
            auth.resolve(&with_bearer(&token), AuthMode::Cookie).await,
            Err(AuthError::Unauthenticated)
        );
        assert_eq!(
            auth.resolve(&with_cookie(&token), AuthMode::Header).await,
            Err(AuthError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn no_credential_is_unauthenticated() {
        assert_eq!(
            service().resolve(&HeaderMap::new(), AuthMode::Any).await,
            Err(AuthError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn expired_is_not_masked() {
        let stale = codec()
            .sign_at("u1", "Alice", chrono::Utc::now().timestamp() - 7200)
            .unwrap();

        assert_eq!(
            service().resolve(&with_cookie(&stale), AuthMode::Any).await,
            Err(AuthError::Expired)
        );
    }

    #[tokio::test]
    async fn foreign_tokens_are_unauthenticated() {
        let mut wrong_key = jwt_config();
        wrong_key.secret = "nope".into();
        let mut wrong_issuer = jwt_config();
        wrong_issuer.issuer = "elsewhere".into();
        let mut wrong_audience = jwt_config();
        wrong_audience.audiences = vec!["mobile".into()];

        for config in [wrong_key, wrong_issuer, wrong_audience] {
            let token = JwtCodec::new(&config)
                .sign_at("u1", "Alice", chrono::Utc::now().timestamp())
                .unwrap();
            assert_eq!(
                service().resolve(&with_bearer(&token), AuthMode::Any).await,
                Err(AuthError::Unauthenticated)
            );
        }
    }

    #[tokio::test]
    async fn missing_identity_claims_default_to_empty() {
        #[derive(serde::Serialize)]
        struct Bare<'a> {
            iss: &'a str,
            aud: &'a str,
            exp: i64,
        }

        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Bare {
                iss: "hello-starter",
                aud: "web",
                exp: chrono::Utc::now().timestamp() + 60,
            },
            &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let ctx = service()
            .resolve(&with_bearer(&token), AuthMode::Any)
            .await
            .unwrap();
        assert_eq!(ctx, AuthCtx::default());
    }

    #[tokio::test]
    async fn codec_failures_are_internal() {
        let auth = AuthService::new(Arc::new(BrokenCodec), "token", false);

        assert_eq!(
            auth.resolve(&with_cookie("whatever"), AuthMode::Any).await,
            Err(AuthError::Internal)
        );
        assert_eq!(auth.issue("u1", "Alice").await, Err(AuthError::Internal));
    }

    #[tokio::test]
    async fn clear_removes_cookie_and_peeks_payload() {
        let auth = service();
        let token = auth.issue("u1", "Alice").await.unwrap();
        let jar = CookieJar::from_headers(&with_cookie(&token));

        let (jar, payload) = auth.clear(jar);
        assert!(jar.get("token").is_none());
        assert_eq!(payload.unwrap()["sub"], "u1");

        let jar = CookieJar::from_headers(&with_cookie("garbage"));
        let (jar, payload) = auth.clear(jar);
        assert!(jar.get("token").is_none());
        assert!(payload.is_none());

        let (_, payload) = auth.clear(CookieJar::new());
        assert!(payload.is_none());
    }

    #[test]
    fn store_sets_http_only_cookie() {
        let jar = service().store(CookieJar::new(), "abc".into());
        let cookie = jar.get("token").unwrap();
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
