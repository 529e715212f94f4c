/*
 * Responsibility
 * - /session の request/response DTO
 * - validate() で形式チェック (認証方式そのものは扱わない)
 */
use serde::{Deserialize, Serialize};

use crate::services::flash::DELIMITER;

const MAX_FIELD_LEN: usize = 128;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub id: String,
    pub name: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.id.trim().is_empty() {
            return Err("id is required");
        }
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.id.len() > MAX_FIELD_LEN || self.name.len() > MAX_FIELD_LEN {
            return Err("id and name must be <= 128 chars");
        }
        // name is echoed into the flash cookie
        if self.name.contains(DELIMITER) {
            return Err("name must not contain \"||\"");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}
