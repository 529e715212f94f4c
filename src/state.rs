/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: AuthService (credential の resolve/issue/clear)
 *   - flash: FlashChannel (flash cookie の読み書き)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{auth::AuthService, flash::FlashChannel};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub flash: FlashChannel,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, flash: FlashChannel) -> Self {
        Self { auth, flash }
    }
}
