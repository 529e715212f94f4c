/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AuthService, jwt::JwtCodec};

pub fn build_auth_service(config: &Config) -> Arc<AuthService> {
    let codec = JwtCodec::new(&config.jwt);

    Arc::new(AuthService::new(
        Arc::new(codec),
        config.cookies.auth_name.clone(),
        config.cookies.secure,
    ))
}
