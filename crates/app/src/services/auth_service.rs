//! Auth service: accounts, credentials and bearer tokens.

use roomhub_domain::error::{AuthenticationError, HubError, ValidationError};
use roomhub_domain::id::UserId;
use roomhub_domain::time::now;
use roomhub_domain::token::{Token, TokenKind, TokenLifetimes, TokenPair};
use roomhub_domain::user::{Identity, NewUser, User};

use crate::ports::{PasswordHasher, TokenRepository, UserRepository};

/// Application service issuing and verifying credentials.
pub struct AuthService<U, T, H> {
    users: U,
    tokens: T,
    hasher: H,
    lifetimes: TokenLifetimes,
}

impl<U, T, H> AuthService<U, T, H>
where
    U: UserRepository,
    T: TokenRepository,
    H: PasswordHasher,
{
    /// Create a new service with the default token lifetimes.
    pub fn new(users: U, tokens: T, hasher: H) -> Self {
        Self {
            users,
            tokens,
            hasher,
            lifetimes: TokenLifetimes::default(),
        }
    }

    /// Override the token lifetimes.
    #[must_use]
    pub fn with_lifetimes(mut self, lifetimes: TokenLifetimes) -> Self {
        self.lifetimes = lifetimes;
        self
    }

    /// Register a regular (non-staff) account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] when the username is invalid or
    /// taken, or the password is empty; a hashing or storage error otherwise.
    #[tracing::instrument(skip(self, password, email))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<String>,
    ) -> Result<(Identity, TokenPair), HubError> {
        if password.is_empty() {
            return Err(ValidationError::EmptyField { field: "password" }.into());
        }
        let new_user = NewUser {
            username: username.to_string(),
            email: email.filter(|email| !email.trim().is_empty()),
            password_hash: String::new(),
            is_staff: false,
            is_superuser: false,
        };
        new_user.validate()?;
        if self.users.find_by_username(username).await?.is_some() {
            return Err(ValidationError::UsernameTaken.into());
        }
        let user = self
            .users
            .create(NewUser {
                password_hash: self.hasher.hash(password)?,
                ..new_user
            })
            .await?;
        tracing::info!(user_id = %user.id, "account registered");

        let pair = self.issue_pair(user.id).await?;
        Ok((Identity::from(&user), pair))
    }

    /// Verify a username/password pair and issue tokens.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::InvalidCredentials`] when the
    /// credentials do not match, or a hashing or storage error.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(UserId, TokenPair), HubError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::debug!("unknown username");
            return Err(AuthenticationError::InvalidCredentials.into());
        };
        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(AuthenticationError::InvalidCredentials.into());
        }
        let pair = self.issue_pair(user.id).await?;
        Ok((user.id, pair))
    }

    /// Resolve an access token into the identity it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::InvalidToken`] when the token is
    /// unknown, expired, revoked, not an access token, or its user is gone.
    pub async fn authenticate(&self, access: &str) -> Result<Identity, HubError> {
        let user = self.resolve(access, TokenKind::Access).await?;
        Ok(Identity::from(&user))
    }

    /// Mint a new access token from a refresh token. The refresh token is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::InvalidToken`] when the refresh token
    /// is not usable, or a storage error.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self, refresh: &str) -> Result<TokenPair, HubError> {
        let user = self.resolve(refresh, TokenKind::Refresh).await?;
        let access = self
            .tokens
            .store(Token::issue(user.id, TokenKind::Access, self.lifetimes.access))
            .await?;
        Ok(TokenPair {
            refresh: refresh.to_string(),
            access: access.secret,
        })
    }

    /// Revoke the caller's access token and, when given, a refresh token.
    ///
    /// A refresh token issued to another user is left alone.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(
        skip(self, identity, access, refresh),
        fields(user_id = %identity.user_id)
    )]
    pub async fn logout(
        &self,
        identity: &Identity,
        access: &str,
        refresh: Option<&str>,
    ) -> Result<(), HubError> {
        self.tokens.revoke(access).await?;
        if let Some(refresh) = refresh {
            match self.tokens.find(refresh).await? {
                Some(token) if token.user_id == identity.user_id => {
                    self.tokens.revoke(refresh).await?;
                }
                _ => tracing::debug!("refresh token not owned by caller, kept"),
            }
        }
        tracing::info!("logged out");
        Ok(())
    }

    /// Make sure a superuser named `username` exists, creating it when absent.
    ///
    /// An existing account is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for an invalid username or empty
    /// password, or a hashing or storage error.
    #[tracing::instrument(skip(self, password))]
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<User, HubError> {
        if let Some(user) = self.users.find_by_username(username).await? {
            tracing::debug!(user_id = %user.id, "admin account already present");
            return Ok(user);
        }
        if password.is_empty() {
            return Err(ValidationError::EmptyField { field: "password" }.into());
        }
        let new_user = NewUser {
            username: username.to_string(),
            email: None,
            password_hash: self.hasher.hash(password)?,
            is_staff: true,
            is_superuser: true,
        };
        new_user.validate()?;
        let user = self.users.create(new_user).await?;
        tracing::info!(user_id = %user.id, "admin account created");
        Ok(user)
    }

    async fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, HubError> {
        let purged = self.tokens.purge_expired(now()).await?;
        if purged > 0 {
            tracing::debug!(purged, "stale tokens removed");
        }
        let refresh = self
            .tokens
            .store(Token::issue(user_id, TokenKind::Refresh, self.lifetimes.refresh))
            .await?;
        let access = self
            .tokens
            .store(Token::issue(user_id, TokenKind::Access, self.lifetimes.access))
            .await?;
        Ok(TokenPair {
            refresh: refresh.secret,
            access: access.secret,
        })
    }

    async fn resolve(&self, secret: &str, kind: TokenKind) -> Result<User, HubError> {
        let token = self
            .tokens
            .find(secret)
            .await?
            .filter(|token| token.is_usable_as(kind, now()))
            .ok_or(AuthenticationError::InvalidToken)?;
        self.users
            .get_by_id(token.user_id)
            .await?
            .ok_or_else(|| AuthenticationError::InvalidToken.into())
    }
}
