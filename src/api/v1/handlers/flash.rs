/*
 * Responsibility
 * - GET /flash: 保留中の flash を JSON で返し、cookie を消す (なければ null)
 * - SPA など HTML ページを経由しないクライアント向け
 */
use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;

use crate::services::flash::FlashEntry;
use crate::state::AppState;

pub async fn take_flash(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<Option<FlashEntry>>) {
    let (jar, entry) = state.flash.read_and_clear(jar);
    (jar, Json(entry))
}
