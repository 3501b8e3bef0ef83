use async_trait::async_trait;
use auth::SessionClaims;
use auth::TokenPair;

use crate::session::errors::DirectoryError;
use crate::session::errors::SessionError;
use crate::session::models::NewUser;
use crate::session::models::NewUserRecord;
use crate::session::models::UserId;
use crate::session::models::UserRecord;

/// Port for session management operations.
#[async_trait]
pub trait SessionManager: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Errors
    /// * `UserExists` - a record with the same email or username exists
    /// * `UserCreateFailed` - the directory declined to create the record
    /// * other variants - infrastructure failure
    async fn register(&self, new_user: NewUser) -> Result<(), SessionError>;

    /// Verify credentials and issue a token pair.
    ///
    /// The single identifier is matched against both email and username.
    /// Returns `Ok(None)` when no record matches, the password mismatches,
    /// or the post-verification hash rotation is not persisted.
    async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<TokenPair>, SessionError>;

    /// Exchange a `Bearer `-prefixed refresh token for a brand-new pair.
    ///
    /// Returns `Ok(None)` when the prefix is missing or the token does not
    /// verify under the refresh secret.
    async fn refresh(&self, raw: &str) -> Result<Option<TokenPair>, SessionError>;

    /// Verify an access token and confirm its subject still exists.
    ///
    /// Returns `Ok(None)` when the token does not verify or the directory no
    /// longer knows the subject.
    async fn validate_access_token(
        &self,
        token: &str,
    ) -> Result<Option<SessionClaims>, SessionError>;

    /// Hash a plaintext password for storage.
    async fn hash_password(&self, plaintext: &str) -> Result<String, SessionError>;
}

/// Port for the external user-storage service.
///
/// One method per directory request pattern; the directory is the sole
/// arbiter of consistency for credential records.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// OR-match lookup over the email and username columns.
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, DirectoryError>;

    /// Create a credential record; `None` means the store declined creation.
    async fn create_user(&self, record: NewUserRecord) -> Result<Option<UserId>, DirectoryError>;

    /// Whether a record with this id still exists.
    async fn user_exists(&self, id: &UserId) -> Result<bool, DirectoryError>;

    /// Replace the stored password digest; `false` means the write was not applied.
    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, DirectoryError>;
}
