/*
 * Responsibility
 * - 保存先 (in-memory / Postgres) の選択と組み立て
 * - Postgres の場合はテーブルを用意する
 */
use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod person_repo;
pub mod user_repo;

use error::RepoResult;
use person_repo::{MemoryPersonRepo, PersonRepo, PgPersonRepo};
use user_repo::{MemoryUserRepo, PgUserRepo, UserRepo};

#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepo>,
    pub persons: Arc<dyn PersonRepo>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepo::new()),
            persons: Arc::new(MemoryPersonRepo::new()),
        }
    }

    pub async fn postgres(database_url: &str) -> RepoResult<Self> {
        let db = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        ensure_schema(&db).await?;

        Ok(Self {
            users: Arc::new(PgUserRepo::new(db.clone())),
            persons: Arc::new(PgPersonRepo::new(db)),
        })
    }
}

async fn ensure_schema(db: &PgPool) -> RepoResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            age INTEGER NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    Ok(())
}
