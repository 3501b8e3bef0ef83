use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::session::models::NewUserRecord;
use crate::session::models::UserId;
use crate::session::models::UserRecord;

/// `find-user-by-email-or-username` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindUserRequest {
    pub email: String,
    pub username: String,
}

/// Credential record as the directory serializes it.
///
/// The `password` field carries the stored digest, never a plaintext.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecordMessage {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl From<UserRecordMessage> for UserRecord {
    fn from(message: UserRecordMessage) -> Self {
        Self {
            id: UserId::new(message.id),
            username: message.username,
            email: message.email,
            password_hash: message.password,
        }
    }
}

/// `create-user` request body: identity fields, digest, and the
/// uninterpreted profile fields flattened alongside.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl From<NewUserRecord> for CreateUserRequest {
    fn from(record: NewUserRecord) -> Self {
        Self {
            username: record.username,
            email: record.email,
            password: record.password_hash,
            profile: record.profile,
        }
    }
}

/// `create-user` reply body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUserMessage {
    pub id: String,
}

/// `is-userid-exist` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdExistsRequest {
    pub user_id: String,
}

/// `update-password` request body; `password` is the new digest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub user_id: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_message_maps_digest_field() {
        let message: UserRecordMessage = serde_json::from_str(
            r#"{"id":"u1","username":"alice","email":"a@x.com","password":"$argon2id$x"}"#,
        )
        .unwrap();

        let record = UserRecord::from(message);
        assert_eq!(record.id.as_str(), "u1");
        assert_eq!(record.password_hash, "$argon2id$x");
    }

    #[test]
    fn test_create_user_request_flattens_profile() {
        let mut profile = Map::new();
        profile.insert("displayName".to_string(), Value::String("Alice".to_string()));

        let request = CreateUserRequest::from(NewUserRecord {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$x".to_string(),
            profile,
        });

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["password"], "$argon2id$x");
        assert_eq!(json["displayName"], "Alice");
    }

    #[test]
    fn test_update_password_request_shape() {
        let request = UpdatePasswordRequest {
            user_id: "u1".to_string(),
            password: "$argon2id$y".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["userId"], "u1");
    }
}
