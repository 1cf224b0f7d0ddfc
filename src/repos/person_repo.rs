/*
 * Responsibility
 * - persons CRUD
 * - in-memory (デモ用) と Postgres (sqlx) の 2 実装
 * - 見つからない場合は None / false を返す (404 への変換は handler 側)
 */
use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PersonRow {
    pub id: i64,
    pub name: String,
    pub age: i32,
}

#[async_trait]
pub trait PersonRepo: Send + Sync {
    fn backend_name(&self) -> &'static str;

    // Ordered by id ascending.
    async fn list(&self) -> RepoResult<Vec<PersonRow>>;

    async fn get(&self, id: i64) -> RepoResult<Option<PersonRow>>;

    async fn create(&self, name: &str, age: i32) -> RepoResult<PersonRow>;

    // Replaces name and age. `None` if the row does not exist.
    async fn update(&self, id: i64, name: &str, age: i32) -> RepoResult<Option<PersonRow>>;

    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

#[derive(Debug, Default)]
struct MemoryPersons {
    next_id: i64,
    rows: BTreeMap<i64, PersonRow>,
}

#[derive(Debug, Default)]
pub struct MemoryPersonRepo {
    inner: RwLock<MemoryPersons>,
}

impl MemoryPersonRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonRepo for MemoryPersonRepo {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> RepoResult<Vec<PersonRow>> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> RepoResult<Option<PersonRow>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, name: &str, age: i32) -> RepoResult<PersonRow> {
        let mut persons = self.inner.write().await;
        // ids are never reused, even after delete
        persons.next_id += 1;
        let row = PersonRow {
            id: persons.next_id,
            name: name.to_string(),
            age,
        };
        persons.rows.insert(row.id, row.clone());

        Ok(row)
    }

    async fn update(&self, id: i64, name: &str, age: i32) -> RepoResult<Option<PersonRow>> {
        let mut persons = self.inner.write().await;
        let Some(row) = persons.rows.get_mut(&id) else {
            return Ok(None);
        };
        row.name = name.to_string();
        row.age = age;

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }
}

#[derive(Debug, Clone)]
pub struct PgPersonRepo {
    db: PgPool,
}

impl PgPersonRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersonRepo for PgPersonRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn list(&self) -> RepoResult<Vec<PersonRow>> {
        let rows = sqlx::query_as::<_, PersonRow>(
            r#"
            SELECT id, name, age
            FROM persons
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn get(&self, id: i64) -> RepoResult<Option<PersonRow>> {
        let row = sqlx::query_as::<_, PersonRow>(
            r#"
            SELECT id, name, age
            FROM persons
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn create(&self, name: &str, age: i32) -> RepoResult<PersonRow> {
        let row = sqlx::query_as::<_, PersonRow>(
            r#"
            INSERT INTO persons (name, age)
            VALUES ($1, $2)
            RETURNING id, name, age
            "#,
        )
        .bind(name)
        .bind(age)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: i64, name: &str, age: i32) -> RepoResult<Option<PersonRow>> {
        let row = sqlx::query_as::<_, PersonRow>(
            r#"
            UPDATE persons
            SET name = $2, age = $3
            WHERE id = $1
            RETURNING id, name, age
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(age)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM persons
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_repo_crud_cycle() {
        let repo = MemoryPersonRepo::new();

        let alice = repo.create("Alice", 30).await.unwrap();
        let bob = repo.create("Bob", 15).await.unwrap();
        assert_eq!((alice.id, bob.id), (1, 2));

        assert_eq!(repo.get(alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(repo.list().await.unwrap(), vec![alice.clone(), bob.clone()]);

        let updated = repo.update(alice.id, "Alice B", 31).await.unwrap().unwrap();
        assert_eq!(updated.name, "Alice B");
        assert_eq!(updated.age, 31);

        assert!(repo.delete(alice.id).await.unwrap());
        assert!(!repo.delete(alice.id).await.unwrap());
        assert_eq!(repo.get(alice.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_repo_update_missing_is_none() {
        let repo = MemoryPersonRepo::new();
        assert_eq!(repo.update(42, "Nobody", 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_repo_does_not_reuse_ids() {
        let repo = MemoryPersonRepo::new();
        let first = repo.create("A", 1).await.unwrap();
        repo.delete(first.id).await.unwrap();
        let second = repo.create("B", 2).await.unwrap();
        assert_ne!(first.id, second.id);
    }
}
