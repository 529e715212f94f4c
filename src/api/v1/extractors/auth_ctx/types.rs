/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - protect middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックや cookie/header の探索は services 側の責務
 * - リクエストごとに生成され、永続化はしない
 */
use serde::Serialize;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `id` は token の `sub` (欠けていれば空文字)
/// - `name` は表示名 (欠けていれば空文字)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthCtx {
    pub id: String,
    pub name: String,
}

impl AuthCtx {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
