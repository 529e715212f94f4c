/*!
 * 認証済みユーザーのコンテキスト
 *
 * - AuthCtx: 検証済み token の `sub` を `id`、`name` claim を `name` として持つ
 *   (claim が欠けていれば空文字)
 * - AuthCtxExtractor: protect が request extensions に入れた AuthCtx を handler に渡す。
 *   protect の外で使われた場合は 401
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
