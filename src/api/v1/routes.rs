/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /session, /flash は公開、/me は protect (cookie → Bearer の順で探す)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    flash::take_flash,
    health::health,
    me::me,
    session::{login, logout},
};
use crate::middleware::auth::protect;
use crate::services::auth::AuthMode;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/session", post(login).delete(logout))
        .route("/flash", get(take_flash));

    let protected = protect(Router::new().route("/me", get(me)), state, AuthMode::Any);

    public.merge(protected)
}
