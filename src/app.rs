/*
 * Responsibility
 * - CLI/Config 読み込み → ロガー初期化 → 依存生成 → Router 組み立て
 * - Middleware の適用 (request-id/trace/limit/timeout, security headers, protect)
 * - axum::serve() で起動 (Ctrl-C / SIGTERM で graceful shutdown)
 */
use anyhow::Result;
use axum::{Router, routing::get};
use clap::Parser;
use tokio::signal;

use crate::config::{Cli, Config};
use crate::services::{auth::build_auth_service, flash::FlashChannel};
use crate::state::AppState;
use crate::{api, logging, middleware};

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // 設定が欠けていればロガーより先に落とす (リクエストは一切受けない)
    let config = Config::load(&cli)?;

    let _log_guard = logging::init(&config.log)?;
    logging::init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn build_state(config: &Config) -> AppState {
    let auth = build_auth_service(config);
    let flash = FlashChannel::new(config.cookies.flash_name.clone(), config.cookies.secure);

    AppState::new(auth, flash)
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(api::v1::handlers::health::health))
        .merge(api::pages::routes())
        .nest("/api/v1", api::v1::routes(&state))
        .fallback(api::pages::not_found)
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router, config.request_timeout)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
