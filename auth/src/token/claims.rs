use serde::Deserialize;
use serde::Serialize;

/// Claims carried by a session token.
///
/// Deliberately minimal: an opaque subject id plus the issuance window.
/// No other personally identifying data rides in the token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (opaque user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Seconds between issuance and expiry.
    pub fn lifetime_secs(&self) -> i64 {
        self.exp - self.iat
    }
}
