use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::Config;
use crate::outbound::bus::BusProducer;
use crate::session::errors::DirectoryError;
use crate::session::models::NewUserRecord;
use crate::session::models::UserId;
use crate::session::models::UserRecord;
use crate::session::ports::UserDirectory;

use super::messages::CreateUserRequest;
use super::messages::CreatedUserMessage;
use super::messages::FindUserRequest;
use super::messages::UpdatePasswordRequest;
use super::messages::UserIdExistsRequest;
use super::messages::UserRecordMessage;

/// Request patterns of the user-storage service. Wire contract; the names
/// must match what the store subscribes to.
mod patterns {
    pub const FIND_USER_BY_EMAIL_OR_USERNAME: &str = "find-user-by-email-or-username";
    pub const CREATE_USER: &str = "create-user";
    pub const IS_USERID_EXIST: &str = "is-userid-exist";
    pub const UPDATE_PASSWORD: &str = "update-password";
}

/// In-flight directory requests awaiting their correlated reply.
pub type PendingReplies = Arc<Mutex<HashMap<String, oneshot::Sender<Value>>>>;

/// User-directory client speaking the request/reply bus.
///
/// Each call publishes a pattern-named request with a fresh correlation id
/// and parks a oneshot in the pending table; the reply consumer resolves it
/// when the correlated reply arrives. The lock guards only the table's
/// insert/remove, never a request in flight.
pub struct BusUserDirectory {
    producer: Arc<BusProducer>,
    requests_topic: String,
    reply_topic: String,
    reply_timeout: Duration,
    pending: PendingReplies,
}

impl BusUserDirectory {
    pub fn new(config: &Config, producer: Arc<BusProducer>) -> Self {
        Self {
            producer,
            requests_topic: config.directory.requests_topic.clone(),
            reply_topic: config.kafka.replies_topic.clone(),
            reply_timeout: Duration::from_millis(config.directory.reply_timeout_ms),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Shared handle for wiring up the reply consumer.
    pub fn pending(&self) -> PendingReplies {
        Arc::clone(&self.pending)
    }

    async fn request<T: Serialize>(
        &self,
        operation: &str,
        body: &T,
    ) -> Result<Value, DirectoryError> {
        let payload =
            serde_json::to_value(body).map_err(|e| DirectoryError::Transport(e.to_string()))?;
        let correlation_id = Uuid::new_v4().to_string();

        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .await
            .insert(correlation_id.clone(), tx);

        let sent = self
            .producer
            .send_request(
                &self.requests_topic,
                operation,
                &correlation_id,
                &self.reply_topic,
                &payload,
            )
            .await;

        if let Err(e) = sent {
            self.pending.lock().await.remove(&correlation_id);
            return Err(DirectoryError::Transport(e.to_string()));
        }

        match tokio::time::timeout(self.reply_timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(DirectoryError::Transport(
                "reply channel closed".to_string(),
            )),
            Err(_) => {
                self.pending.lock().await.remove(&correlation_id);
                Err(DirectoryError::Timeout(self.reply_timeout.as_millis() as u64))
            }
        }
    }
}

#[async_trait]
impl UserDirectory for BusUserDirectory {
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        let reply = self
            .request(
                patterns::FIND_USER_BY_EMAIL_OR_USERNAME,
                &FindUserRequest {
                    email: email.to_string(),
                    username: username.to_string(),
                },
            )
            .await?;

        if reply.is_null() {
            return Ok(None);
        }

        let record: UserRecordMessage = serde_json::from_value(reply)
            .map_err(|e| DirectoryError::BadReply(e.to_string()))?;
        Ok(Some(record.into()))
    }

    async fn create_user(&self, record: NewUserRecord) -> Result<Option<UserId>, DirectoryError> {
        let reply = self
            .request(patterns::CREATE_USER, &CreateUserRequest::from(record))
            .await?;

        if reply.is_null() {
            return Ok(None);
        }

        let created: CreatedUserMessage = serde_json::from_value(reply)
            .map_err(|e| DirectoryError::BadReply(e.to_string()))?;
        Ok(Some(UserId::new(created.id)))
    }

    async fn user_exists(&self, id: &UserId) -> Result<bool, DirectoryError> {
        let reply = self
            .request(
                patterns::IS_USERID_EXIST,
                &UserIdExistsRequest {
                    user_id: id.as_str().to_string(),
                },
            )
            .await?;

        reply
            .as_bool()
            .ok_or_else(|| DirectoryError::BadReply(format!("expected boolean, got {reply}")))
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, DirectoryError> {
        let reply = self
            .request(
                patterns::UPDATE_PASSWORD,
                &UpdatePasswordRequest {
                    user_id: id.as_str().to_string(),
                    password: password_hash.to_string(),
                },
            )
            .await?;

        reply
            .as_bool()
            .ok_or_else(|| DirectoryError::BadReply(format!("expected boolean, got {reply}")))
    }
}
