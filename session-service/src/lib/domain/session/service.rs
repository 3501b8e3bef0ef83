use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::SessionClaims;
use auth::TokenPair;
use auth::TokenPairIssuer;

use crate::session::errors::SessionError;
use crate::session::models::NewUser;
use crate::session::models::NewUserRecord;
use crate::session::models::UserId;
use crate::session::ports::SessionManager;
use crate::session::ports::UserDirectory;

/// Session management service.
///
/// Orchestrates credential verification, hash rotation, and token issuance
/// over the external user directory. Holds no mutable state of its own: all
/// shared state lives behind the directory port.
pub struct SessionService<D>
where
    D: UserDirectory,
{
    directory: Arc<D>,
    password_hasher: PasswordHasher,
    token_issuer: TokenPairIssuer,
}

impl<D> SessionService<D>
where
    D: UserDirectory,
{
    /// Create a session service over a directory and the two signing secrets.
    pub fn new(directory: Arc<D>, token_issuer: TokenPairIssuer) -> Self {
        Self {
            directory,
            password_hasher: PasswordHasher::new(),
            token_issuer,
        }
    }
}

#[async_trait]
impl<D> SessionManager for SessionService<D>
where
    D: UserDirectory,
{
    async fn register(&self, new_user: NewUser) -> Result<(), SessionError> {
        let existing = self
            .directory
            .find_by_email_or_username(new_user.email.as_str(), new_user.username.as_str())
            .await?;

        if existing.is_some() {
            tracing::debug!(username = %new_user.username, "Registration rejected, user exists");
            return Err(SessionError::UserExists);
        }

        // The directory only ever sees the digest
        let password_hash = self.password_hasher.hash(&new_user.password)?;

        let created = self
            .directory
            .create_user(NewUserRecord {
                username: new_user.username.as_str().to_string(),
                email: new_user.email.as_str().to_string(),
                password_hash,
                profile: new_user.profile,
            })
            .await?;

        match created {
            Some(id) => {
                tracing::info!(user_id = %id, "User registered");
                Ok(())
            }
            None => Err(SessionError::UserCreateFailed),
        }
    }

    async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<TokenPair>, SessionError> {
        let record = match self
            .directory
            .find_by_email_or_username(identifier, identifier)
            .await?
        {
            Some(record) => record,
            None => {
                tracing::debug!("Login failed, no matching record");
                return Ok(None);
            }
        };

        if !self
            .password_hasher
            .verify(password, &record.password_hash)?
        {
            tracing::debug!(user_id = %record.id, "Login failed, password mismatch");
            return Ok(None);
        }

        // Rotate-on-read: persist a freshly salted digest of the same
        // plaintext before any token exists. A failed write vetoes the login.
        let rotated = self.password_hasher.hash(password)?;
        if !self
            .directory
            .update_password(&record.id, &rotated)
            .await?
        {
            tracing::warn!(user_id = %record.id, "Login failed, hash rotation not persisted");
            return Ok(None);
        }

        let pair = self.token_issuer.issue_pair(record.id.as_str())?;
        tracing::info!(user_id = %record.id, "Login succeeded");
        Ok(Some(pair))
    }

    async fn refresh(&self, raw: &str) -> Result<Option<TokenPair>, SessionError> {
        let token = match raw.strip_prefix("Bearer ") {
            Some(token) => token,
            None => {
                tracing::debug!("Refresh rejected, missing Bearer prefix");
                return Ok(None);
            }
        };

        // Only the verified claim is trusted; the caller never names a subject
        let claims = match self.token_issuer.verify_refresh(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(reason = %e, "Refresh rejected");
                return Ok(None);
            }
        };

        let pair = self.token_issuer.issue_pair(&claims.sub)?;
        Ok(Some(pair))
    }

    async fn validate_access_token(
        &self,
        token: &str,
    ) -> Result<Option<SessionClaims>, SessionError> {
        let claims = match self.token_issuer.verify_access(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(reason = %e, "Access token rejected");
                return Ok(None);
            }
        };

        // Signature and expiry alone do not cover deleted accounts
        let subject = UserId::new(claims.sub.clone());
        if !self.directory.user_exists(&subject).await? {
            tracing::debug!(user_id = %subject, "Access token subject no longer exists");
            return Ok(None);
        }

        Ok(Some(claims))
    }

    async fn hash_password(&self, plaintext: &str) -> Result<String, SessionError> {
        Ok(self.password_hasher.hash(plaintext)?)
    }
}
