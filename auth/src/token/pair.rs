use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use super::claims::SessionClaims;
use super::codec::TokenCodec;
use super::errors::TokenError;

/// Access token lifetime: 3 minutes.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(3 * 60);

/// Refresh token lifetime: 7 days.
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// An access/refresh token pair.
///
/// Both tokens are immutable once issued; a refresh never mutates an existing
/// token, it produces a brand-new pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies token pairs under two independent secrets.
///
/// Compromise of the long-lived refresh secret and the short-lived access
/// secret are independent failure domains: neither token kind can be forged
/// from knowledge of the other secret.
pub struct TokenPairIssuer {
    access: TokenCodec,
    refresh: TokenCodec,
}

impl TokenPairIssuer {
    /// Create an issuer from the two signing secrets.
    ///
    /// Lifetimes are fixed policy ([`ACCESS_TOKEN_TTL`], [`REFRESH_TOKEN_TTL`]),
    /// not configuration.
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access: TokenCodec::new(access_secret, ACCESS_TOKEN_TTL),
            refresh: TokenCodec::new(refresh_secret, REFRESH_TOKEN_TTL),
        }
    }

    /// Issue a fresh pair for the given subject.
    ///
    /// The two signs are independent; neither depends on the other's output.
    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair, TokenError> {
        let access_token = self.access.issue(subject)?;
        let refresh_token = self.refresh.issue(subject)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify a token under the access secret.
    pub fn verify_access(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.access.verify(token)
    }

    /// Verify a token under the refresh secret.
    pub fn verify_refresh(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.refresh.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &[u8] = b"access_secret_at_least_32_bytes!!";
    const REFRESH_SECRET: &[u8] = b"refresh_secret_at_least_32_bytes!";

    #[test]
    fn test_issue_pair_and_verify_both() {
        let issuer = TokenPairIssuer::new(ACCESS_SECRET, REFRESH_SECRET);

        let pair = issuer.issue_pair("user-123").expect("failed to issue pair");
        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());

        let access_claims = issuer.verify_access(&pair.access_token).unwrap();
        let refresh_claims = issuer.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(access_claims.sub, "user-123");
        assert_eq!(refresh_claims.sub, "user-123");
    }

    #[test]
    fn test_pair_lifetimes_follow_policy() {
        let issuer = TokenPairIssuer::new(ACCESS_SECRET, REFRESH_SECRET);

        let pair = issuer.issue_pair("user-123").unwrap();

        let access_claims = issuer.verify_access(&pair.access_token).unwrap();
        let refresh_claims = issuer.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(access_claims.lifetime_secs(), 180);
        assert_eq!(refresh_claims.lifetime_secs(), 604_800);
    }

    #[test]
    fn test_secrets_are_isolated() {
        let issuer = TokenPairIssuer::new(ACCESS_SECRET, REFRESH_SECRET);

        let pair = issuer.issue_pair("user-123").unwrap();

        // Access token under refresh secret and vice versa must both fail
        assert!(matches!(
            issuer.verify_refresh(&pair.access_token),
            Err(TokenError::BadSignature)
        ));
        assert!(matches!(
            issuer.verify_access(&pair.refresh_token),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn test_refresh_issues_new_pair() {
        let issuer = TokenPairIssuer::new(ACCESS_SECRET, REFRESH_SECRET);

        let first = issuer.issue_pair("user-123").unwrap();
        let claims = issuer.verify_refresh(&first.refresh_token).unwrap();
        let second = issuer.issue_pair(&claims.sub).unwrap();

        // Old pair stays verifiable; nothing was mutated in place
        assert!(issuer.verify_refresh(&first.refresh_token).is_ok());
        assert!(issuer.verify_access(&second.access_token).is_ok());
    }
}
