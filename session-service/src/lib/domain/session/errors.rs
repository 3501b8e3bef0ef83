use thiserror::Error;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Numeric error codes shared with the HTTP-facing gateway.
///
/// The whole namespace lives here so the gateway and this service never
/// disagree on what a code means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Unknown,
    ValidationFailed,
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    Unavailable,
    UserExists,
    UserCreateFailed,
    InvalidLogin,
    InvalidRefreshToken,
}

impl ErrorCode {
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::Unknown => 1000,
            ErrorCode::ValidationFailed => 1001,
            ErrorCode::NotFound => 1002,
            ErrorCode::Unauthorized => 1003,
            ErrorCode::Forbidden => 1004,
            ErrorCode::Conflict => 1005,
            ErrorCode::Unavailable => 1006,
            ErrorCode::UserExists => 2002,
            ErrorCode::UserCreateFailed => 2003,
            ErrorCode::InvalidLogin => 2004,
            ErrorCode::InvalidRefreshToken => 2005,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::Forbidden => "Forbidden",
            ErrorCode::Conflict => "Conflict",
            ErrorCode::Unavailable => "Service unavailable",
            ErrorCode::UserExists => "User already exists",
            ErrorCode::UserCreateFailed => "User creation failed",
            ErrorCode::InvalidLogin => "Invalid login",
            ErrorCode::InvalidRefreshToken => "Invalid refresh token",
        }
    }
}

/// Error for directory (user-storage service) calls.
///
/// Every variant is an infrastructure failure; a clean business "no" from the
/// directory comes back as a value (`None` / `false`), not as an error.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("Directory request failed: {0}")]
    Transport(String),

    #[error("Directory request timed out after {0} ms")]
    Timeout(u64),

    #[error("Directory reply was not decodable: {0}")]
    BadReply(String),
}

/// Top-level error for session operations.
///
/// `UserExists` and `UserCreateFailed` are expected business outcomes and
/// carry their wire codes; the remaining variants are unexpected failures
/// that the gateway turns into a negative acknowledgment.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("User already exists")]
    UserExists,

    #[error("User creation failed")]
    UserCreateFailed,

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] auth::TokenError),
}

impl SessionError {
    /// Wire code when the error is an expected business outcome.
    pub fn business_code(&self) -> Option<ErrorCode> {
        match self {
            SessionError::UserExists => Some(ErrorCode::UserExists),
            SessionError::UserCreateFailed => Some(ErrorCode::UserCreateFailed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::UserExists.code(), 2002);
        assert_eq!(ErrorCode::UserCreateFailed.code(), 2003);
        assert_eq!(ErrorCode::InvalidLogin.code(), 2004);
        assert_eq!(ErrorCode::InvalidRefreshToken.code(), 2005);
    }

    #[test]
    fn test_business_code_split() {
        assert_eq!(
            SessionError::UserExists.business_code(),
            Some(ErrorCode::UserExists)
        );
        assert!(
            SessionError::Directory(DirectoryError::Timeout(5000))
                .business_code()
                .is_none()
        );
    }
}
