//! credential 検証 → AuthCtx を extensions に入れる
//!
//! - credential は AuthMode で許可された channel (cookie → Authorization: Bearer) から探す
//! - 失敗時のステータス:
//!   - 見つからない / 署名・iss・aud 不一致 → 401 UNAUTHENTICATED
//!   - 期限切れ → 403 TOKEN_EXPIRED (クライアントは再ログインではなく更新を試みられる)
//!   - それ以外 → 500 INTERNAL

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::{AuthError, AuthMode, AuthService};
use crate::state::AppState;

#[derive(Clone)]
struct Guard {
    auth: Arc<AuthService>,
    mode: AuthMode,
}

/// `router` 配下の全ルートに認証を掛ける。
///
/// 例：
/// ```ignore
/// let me = Router::new().route("/me", get(me));
/// let me = middleware::auth::protect(me, &state, AuthMode::Any);
/// ```
pub fn protect(router: Router<AppState>, state: &AppState, mode: AuthMode) -> Router<AppState> {
    let guard = Guard {
        auth: state.auth.clone(),
        mode,
    };

    // route_layer: マッチしなかったリクエストは 404 のまま (401 にしない)
    router.route_layer(middleware::from_fn_with_state(guard, access_middleware))
}

async fn access_middleware(
    State(guard): State<Guard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let resolved = guard.auth.resolve(req.headers(), guard.mode).await;
    let auth_ctx = match resolved {
        Ok(ctx) => ctx,
        Err(err) => {
            match err {
                AuthError::Internal => tracing::error!(
                    path = %req.uri().path(),
                    "credential resolution failed"
                ),
                _ => tracing::warn!(
                    error = %err,
                    path = %req.uri().path(),
                    "request not authenticated"
                ),
            }
            return Err(err.into());
        }
    };

    tracing::debug!(user_id = %auth_ctx.id, "authenticated");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}
