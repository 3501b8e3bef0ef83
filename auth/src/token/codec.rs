use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::SessionClaims;
use super::errors::TokenError;

/// Upper bound on serialized claims. Anything larger is refused at issuance.
const MAX_CLAIMS_BYTES: usize = 1024;

/// Signs and verifies compact, self-contained session tokens.
///
/// One codec holds exactly one secret and one lifetime; access and refresh
/// tokens each get their own codec so the two secrets are independent
/// failure domains. Uses HS256 (HMAC with SHA-256).
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from a signing secret and a token lifetime.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl,
        }
    }

    /// Issue a signed token for the given subject.
    ///
    /// The token encodes `{sub, iat, exp}` with `exp = iat + ttl` and is
    /// verifiable offline by any holder of the same secret.
    ///
    /// # Errors
    /// * `ClaimsTooLarge` - serialized claims exceed the size bound
    /// * `EncodingFailed` - signing failed
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };

        let serialized = serde_json::to_vec(&claims)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;
        if serialized.len() > MAX_CLAIMS_BYTES {
            return Err(TokenError::ClaimsTooLarge {
                limit: MAX_CLAIMS_BYTES,
                actual: serialized.len(),
            });
        }

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// # Errors
    /// * `Expired` - `exp` has passed
    /// * `BadSignature` - signed under a different secret or tampered with
    /// * `Malformed` - not a decodable token at all
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Short-lived access tokens leave no room for clock slack
        validation.leeway = 0;

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed(e.to_string()),
            },
        )?;

        Ok(data.claims)
    }

    /// Lifetime applied to issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let codec = TokenCodec::new(SECRET, Duration::from_secs(60));

        let token = codec.issue("user-123").expect("failed to issue token");
        assert!(!token.is_empty());

        let claims = codec.verify(&token).expect("failed to verify token");
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.lifetime_secs(), 60);
    }

    #[test]
    fn test_verify_with_wrong_secret_is_bad_signature() {
        let signer = TokenCodec::new(SECRET, Duration::from_secs(60));
        let other = TokenCodec::new(b"another_secret_at_least_32_bytes!!", Duration::from_secs(60));

        let token = signer.issue("user-123").unwrap();

        let result = other.verify(&token);
        assert!(matches!(result, Err(TokenError::BadSignature)));
    }

    #[test]
    fn test_expired_token_is_expired_not_bad_signature() {
        // Zero lifetime: the token is already past exp at verification time
        let codec = TokenCodec::new(SECRET, Duration::ZERO);

        let token = codec.issue("user-123").unwrap();
        std::thread::sleep(Duration::from_millis(1100));

        let result = codec.verify(&token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let codec = TokenCodec::new(SECRET, Duration::from_secs(60));

        let result = codec.verify("not.a.token");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }
}
