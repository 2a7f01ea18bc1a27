//! `SQLite` implementation of [`UserRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use roomhub_app::ports::UserRepository;
use roomhub_domain::error::{HubError, ValidationError};
use roomhub_domain::id::UserId;
use roomhub_domain::user::{NewUser, User};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`User`].
struct Wrapper(User);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<User> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(User {
            id: UserId::new(row.try_get("id")?),
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            is_staff: row.try_get("is_staff")?,
            is_superuser: row.try_get("is_superuser")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO users (username, email, password_hash, is_staff, is_superuser) \
    VALUES (?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM users WHERE id = ?";
const SELECT_BY_USERNAME: &str = "SELECT * FROM users WHERE username = ?";

/// `SQLite`-backed user repository.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    fn create(&self, user: NewUser) -> impl Future<Output = Result<User, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT)
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.is_staff)
                .bind(user.is_superuser)
                .execute(&pool)
                .await;

            let result = match result {
                Ok(result) => result,
                Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                    return Err(ValidationError::UsernameTaken.into());
                }
                Err(err) => return Err(StorageError::from(err).into()),
            };

            Ok(User {
                id: UserId::new(result.last_insert_rowid()),
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                is_staff: user.is_staff,
                is_superuser: user.is_superuser,
            })
        }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, HubError>> + Send {
        let pool = self.pool.clone();
        let username = username.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_USERNAME)
                .bind(username)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteUserRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteUserRepository::new(db.pool().clone())
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            password_hash: "$argon2id$hash".to_string(),
            is_staff: false,
            is_superuser: false,
        }
    }

    #[tokio::test]
    async fn should_assign_increasing_ids() {
        let repo = setup().await;
        let alice = repo.create(new_user("alice")).await.unwrap();
        let bob = repo.create(new_user("bob")).await.unwrap();
        assert!(bob.id > alice.id);
    }

    #[tokio::test]
    async fn should_find_user_by_id_and_username() {
        let repo = setup().await;
        let created = repo.create(new_user("alice")).await.unwrap();

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert_eq!(by_id.email.as_deref(), Some("alice@example.com"));
        assert_eq!(by_id.password_hash, "$argon2id$hash");

        let by_name = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_reject_duplicate_username() {
        let repo = setup().await;
        repo.create(new_user("alice")).await.unwrap();

        let result = repo.create(new_user("alice")).await;
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::UsernameTaken))
        ));
    }
}
