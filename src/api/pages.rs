//! Server-rendered pages.
//!
//! Every page consumes the pending flash entry, so a message is shown on
//! exactly one page load.

use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::Html,
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AuthMode;
use crate::services::flash::FlashEntry;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
}

pub async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    let (jar, flash) = state.flash.read_and_clear(jar);

    // pages only look at the cookie; a failed resolve just means "anonymous"
    let visitor = state.auth.resolve(&headers, AuthMode::Cookie).await.ok();

    (jar, Html(render("Home", flash.as_ref(), &greeting(visitor.as_ref()))))
}

pub async fn about(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flash) = state.flash.read_and_clear(jar);

    let body = "<p>A minimal starter: pages, a health check, flash messages and JWT sessions.</p>";
    (jar, Html(render("About", flash.as_ref(), body)))
}

pub async fn not_found() -> AppError {
    AppError::not_found("page")
}

fn greeting(visitor: Option<&AuthCtx>) -> String {
    match visitor {
        Some(ctx) => format!("<p>Signed in as <strong>{}</strong>.</p>", escape(&ctx.name)),
        None => "<p>You are not signed in.</p>".to_string(),
    }
}

fn render(title: &str, flash: Option<&FlashEntry>, body: &str) -> String {
    let flash = flash
        .map(|entry| {
            format!(
                r#"<div class="alert alert-{}" role="alert">{}</div>"#,
                entry.variant,
                escape(&entry.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
<nav><a href="/">Home</a> | <a href="/about">About</a></nav>
{flash}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#
    )
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
