/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::access::protect (認証), http::apply (request-id/trace/limit/timeout),
 *   security_headers::apply (レスポンスヘッダ)
 */
pub mod auth;
pub mod http;
pub mod security_headers;
