use std::sync::Arc;

use sqlx::{Error, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::User;

pub struct UserRepository {
    storage: Arc<Storage>,
}

impl UserRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl UserRepository {
    pub async fn create(
        &self,
        item: &User,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i64, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO users (username, password, role, device_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&item.username)
        .bind(&item.password)
        .bind(&item.role)
        .bind(&item.device_id)
        .bind(item.created_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn exists(
        &self,
        username: &str,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<bool, Error> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut **transaction)
            .await?;

        Ok(found.is_some())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(user)
    }
}
