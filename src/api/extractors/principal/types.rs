/*
 * Responsibility
 * - Handler から見える「認証済み主体」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - トークン検証や認証情報の照合は middleware/services 側の責務
 * - 認可 (role → path) は policy 層で別途チェック
 */
use serde::Serialize;

use crate::repos::user_repo::UserRecord;
use crate::services::auth::Role;

/// How the principal proved its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    Bearer,
    Basic,
}

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `authorities` は role から導出 (`ROLE_ADMIN` など)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: Role,
    pub authorities: Vec<String>,
    pub scheme: AuthScheme,
}

impl Principal {
    pub fn from_record(record: &UserRecord, scheme: AuthScheme) -> Self {
        Self {
            username: record.username.clone(),
            role: record.role,
            authorities: vec![record.role.authority()],
            scheme,
        }
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}
