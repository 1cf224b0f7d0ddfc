/*
 * Responsibility
 * - 認証情報 (credential record) の保存先インターフェース
 * - in-memory (デモ用) と Postgres (sqlx) の 2 実装
 * - username は一意。重複は RepoError::Conflict で返す
 */
use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;

use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::role::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    // bcrypt hash (salt included)
    pub password_hash: String,
    pub role: Role,
}

/// A pluggable credential store.
///
/// Records are created once and never mutated.
#[async_trait]
pub trait UserRepo: Send + Sync {
    // Store backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>>;

    // Returns `RepoError::Conflict` if `username` is taken.
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> RepoResult<UserRecord>;
}

#[derive(Debug, Default)]
struct MemoryUsers {
    next_id: i64,
    by_username: HashMap<String, UserRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    inner: RwLock<MemoryUsers>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>> {
        Ok(self.inner.read().await.by_username.get(username).cloned())
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> RepoResult<UserRecord> {
        let mut users = self.inner.write().await;
        if users.by_username.contains_key(username) {
            return Err(RepoError::Conflict);
        }

        users.next_id += 1;
        let record = UserRecord {
            id: users.next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
        };
        users
            .by_username
            .insert(record.username.clone(), record.clone());

        Ok(record)
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepoError::InvalidRow(e.to_string()))?;

        Ok(UserRecord {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> RepoResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, role
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.db)
        .await?;

        UserRecord::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_repo_creates_and_finds() {
        let repo = MemoryUserRepo::new();
        let created = repo.create("alice", "$2b$hash", Role::User).await.unwrap();
        assert_eq!(created.id, 1);

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_repo_rejects_duplicate_username() {
        let repo = MemoryUserRepo::new();
        repo.create("admin", "h1", Role::Admin).await.unwrap();

        let err = repo.create("admin", "h2", Role::User).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict));

        // the original record is untouched
        let found = repo.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(found.role, Role::Admin);
        assert_eq!(found.password_hash, "h1");
    }

    #[test]
    fn row_with_unknown_role_is_rejected() {
        let row = UserRow {
            id: 1,
            username: "x".into(),
            password_hash: "h".into(),
            role: "[ROLE_ADMIN]".into(),
        };
        assert!(matches!(
            UserRecord::try_from(row),
            Err(RepoError::InvalidRow(_))
        ));
    }
}
