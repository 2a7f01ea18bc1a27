//! `SQLite` implementation of [`TokenRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use roomhub_app::ports::TokenRepository;
use roomhub_domain::error::HubError;
use roomhub_domain::id::UserId;
use roomhub_domain::time::{Timestamp, parse_rfc3339};
use roomhub_domain::token::{Token, TokenKind};

use crate::error::{StorageError, decode};

/// Wrapper for converting database rows into domain [`Token`].
struct Wrapper(Token);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Token> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        let created_at: String = row.try_get("created_at")?;
        let expires_at: String = row.try_get("expires_at")?;

        Ok(Self(Token {
            secret: row.try_get("secret")?,
            kind: TokenKind::from_str(&kind).map_err(decode)?,
            user_id: UserId::new(row.try_get("user_id")?),
            created_at: parse_rfc3339(&created_at).map_err(decode)?,
            expires_at: parse_rfc3339(&expires_at).map_err(decode)?,
            revoked: row.try_get("revoked")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO tokens (secret, kind, user_id, created_at, expires_at, revoked) \
    VALUES (?, ?, ?, ?, ?, ?)";
const SELECT_BY_SECRET: &str = "SELECT * FROM tokens WHERE secret = ?";
const REVOKE: &str = "UPDATE tokens SET revoked = 1 WHERE secret = ?";
const PURGE: &str =
    "DELETE FROM tokens WHERE revoked = 1 OR julianday(expires_at) < julianday(?)";

/// `SQLite`-backed token repository.
pub struct SqliteTokenRepository {
    pool: SqlitePool,
}

impl SqliteTokenRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TokenRepository for SqliteTokenRepository {
    fn store(&self, token: Token) -> impl Future<Output = Result<Token, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(&token.secret)
                .bind(token.kind.as_str())
                .bind(token.user_id.as_i64())
                .bind(token.created_at.to_rfc3339())
                .bind(token.expires_at.to_rfc3339())
                .bind(token.revoked)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(token)
        }
    }

    fn find(&self, secret: &str) -> impl Future<Output = Result<Option<Token>, HubError>> + Send {
        let pool = self.pool.clone();
        let secret = secret.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_SECRET)
                .bind(secret)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn revoke(&self, secret: &str) -> impl Future<Output = Result<(), HubError>> + Send {
        let pool = self.pool.clone();
        let secret = secret.to_string();
        async move {
            sqlx::query(REVOKE)
                .bind(secret)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn purge_expired(&self, at: Timestamp) -> impl Future<Output = Result<u64, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(PURGE)
                .bind(at.to_rfc3339())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected())
        }
    }
}
