use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::session::errors::ErrorCode;
use crate::session::errors::UsernameError;
use crate::session::models::EmailAddress;
use crate::session::models::NewUser;
use crate::session::models::Username;

/// Registration request body.
///
/// Fields beyond the credential triple are collected verbatim and handed to
/// the directory as the profile (display name, birth date, and so on).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl RegisterRequest {
    /// Validate identity fields and build the domain command.
    pub fn into_domain(self) -> Result<NewUser, String> {
        let username = Username::new(self.username).map_err(|e: UsernameError| e.to_string())?;
        let email = EmailAddress::new(self.email).map_err(|e| e.to_string())?;
        Ok(NewUser {
            username,
            email,
            password: self.password,
            profile: self.profile,
        })
    }
}

/// Login request body; a single identifier matched as email or username.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Refresh request body: the raw `Bearer `-prefixed refresh token.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct RefreshRequest(pub String);

/// Validation request body: the raw access token.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct ValidateJwtRequest(pub String);

/// Hashing request body: the plaintext to digest.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct HashPasswordRequest(pub String);

/// Business-error reply body, e.g. `{"statusCode":2002,"error":"User already exists"}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessErrorBody {
    pub status_code: u16,
    pub error: String,
}

impl BusinessErrorBody {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            status_code: code.code(),
            error: code.message().to_string(),
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.code(),
            error: message.into(),
        }
    }

    pub fn into_value(self) -> Value {
        serde_json::json!({
            "statusCode": self.status_code,
            "error": self.error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_collects_profile() {
        let body = r#"{
            "username": "alice",
            "email": "a@x.com",
            "password": "p",
            "displayName": "Alice",
            "birthDate": "1990-04-01"
        }"#;

        let request: RegisterRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.profile.len(), 2);

        let new_user = request.into_domain().unwrap();
        assert_eq!(new_user.username.as_str(), "alice");
        assert_eq!(new_user.profile["displayName"], "Alice");
    }

    #[test]
    fn test_register_request_rejects_bad_email() {
        let body = r#"{"username":"alice","email":"nope","password":"p"}"#;
        let request: RegisterRequest = serde_json::from_str(body).unwrap();
        assert!(request.into_domain().is_err());
    }

    #[test]
    fn test_business_error_body_shape() {
        let body = BusinessErrorBody::new(ErrorCode::UserExists);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["statusCode"], 2002);
        assert_eq!(json["error"], "User already exists");
    }

    #[test]
    fn test_transparent_token_payloads() {
        let refresh: RefreshRequest = serde_json::from_str(r#""Bearer abc""#).unwrap();
        assert_eq!(refresh.0, "Bearer abc");
    }
}
