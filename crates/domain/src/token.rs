//! Opaque bearer tokens issued to authenticated users.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::id::UserId;
use crate::time::{Timestamp, now};

/// Whether a token grants API access or only the right to mint access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Tag used for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl std::str::FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            other => Err(format!("unknown token kind: {other}")),
        }
    }
}

/// A persisted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub secret: String,
    pub kind: TokenKind,
    pub user_id: UserId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub revoked: bool,
}

impl Token {
    /// Mint a fresh random token valid for `ttl`.
    #[must_use]
    pub fn issue(user_id: UserId, kind: TokenKind, ttl: TimeDelta) -> Self {
        let created_at = now();
        // Two v4 UUIDs give 244 random bits.
        let secret = format!(
            "{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        );
        Self {
            secret,
            kind,
            user_id,
            created_at,
            expires_at: created_at + ttl,
            revoked: false,
        }
    }

    /// Whether the token can still be used as `kind` at `at`.
    #[must_use]
    pub fn is_usable_as(&self, kind: TokenKind, at: Timestamp) -> bool {
        self.kind == kind && !self.revoked && at < self.expires_at
    }
}

/// Lifetimes applied when issuing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: TimeDelta,
    pub refresh: TimeDelta,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: TimeDelta::minutes(5),
            refresh: TimeDelta::days(1),
        }
    }
}

/// The pair handed to clients on registration and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}
