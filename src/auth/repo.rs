use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 hash, never exposed in JSON
    pub first_name: String,
    pub last_name: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Persistence outcomes the auth core reacts to. Engine-specific error
/// codes stay inside the store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate unique field")]
    DuplicateKey,
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] sqlx::Error),
}

/// Abstract user store. The production impl is Postgres; tests swap in an
/// in-memory one.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<User, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<User, StoreError>;
    async fn update_profile(&self, id: i64, update: UpdateProfile) -> Result<User, StoreError>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_sqlx(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey,
        _ => StoreError::Other(e),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        // No existence pre-check: the unique constraint on email is the
        // arbiter, which avoids a check-then-act race.
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, first_name, last_name, created_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)
    }

    async fn find_by_id(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)
    }

    async fn update_profile(&self, id: i64, update: UpdateProfile) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name  = COALESCE($3, last_name)
            WHERE id = $1
            RETURNING id, email, password_hash, first_name, last_name, created_at
            "#,
        )
        .bind(id)
        .bind(update.first_name)
        .bind(update.last_name)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)
    }
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store for unit tests. Mirrors the unique-email behavior of
    /// the Postgres store.
    #[derive(Default)]
    pub struct MemoryUserStore {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn create(&self, new: NewUser) -> Result<User, StoreError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == new.email) {
                return Err(StoreError::DuplicateKey);
            }
            let user = User {
                id: users.len() as i64 + 1,
                email: new.email,
                password_hash: new.password_hash,
                first_name: new.first_name,
                last_name: new.last_name,
                created_at: OffsetDateTime::now_utc(),
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned()
                .ok_or(StoreError::NotFound)
        }

        async fn find_by_id(&self, id: i64) -> Result<User, StoreError> {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or(StoreError::NotFound)
        }

        async fn update_profile(
            &self,
            id: i64,
            update: UpdateProfile,
        ) -> Result<User, StoreError> {
            let mut users = self.users.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(StoreError::NotFound)?;
            if let Some(first_name) = update.first_name {
                user.first_name = first_name;
            }
            if let Some(last_name) = update.last_name {
                user.last_name = last_name;
            }
            Ok(user.clone())
        }
    }
}
