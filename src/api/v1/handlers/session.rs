/*
 * Responsibility
 * - POST /session: credential を発行して cookie に保存、次のページ用に flash を書く
 * - DELETE /session: credential cookie を消す (誰が抜けたかはログにだけ残す)
 */
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use crate::api::v1::dto::session::{LoginRequest, LoginResponse};
use crate::error::AppError;
use crate::services::flash::Variant;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_LOGIN", msg))?;

    let token = state.auth.issue(&req.id, &req.name).await?;

    let jar = state.auth.store(jar, token.clone());
    let jar = state.flash.write(
        jar,
        &format!("Welcome, {}!", req.name),
        Variant::Success,
    );

    info!(user_id = %req.id, "signed in");

    Ok((
        jar,
        Json(LoginResponse {
            access_token: token,
            token_type: "Bearer",
            expires_in: state.auth.ttl_seconds(),
        }),
    ))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let (jar, payload) = state.auth.clear(jar);

    // unverified: only good enough for the log line
    let user_id = payload
        .as_ref()
        .and_then(|p| p.get("sub"))
        .and_then(|v| v.as_str())
        .unwrap_or("-");
    info!(user_id, "signed out");

    let jar = state.flash.write(jar, "Signed out.", Variant::Info);

    (StatusCode::NO_CONTENT, jar)
}
