use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::envelope::Completion;
use super::envelope::Delivery;
use super::messages::BusinessErrorBody;
use super::messages::HashPasswordRequest;
use super::messages::LoginRequest;
use super::messages::RefreshRequest;
use super::messages::RegisterRequest;
use super::messages::ValidateJwtRequest;
use crate::session::errors::ErrorCode;
use crate::session::ports::SessionManager;

/// Operation names accepted on the request topic.
pub mod operations {
    pub const REGISTER: &str = "register";
    pub const LOGIN: &str = "login";
    pub const REFRESH_TOKEN: &str = "refresh-token";
    pub const VALIDATE_JWT: &str = "validate-jwt";
    pub const HASH_PASSWORD: &str = "hash-password";
}

/// Dispatches inbound operation requests to the session service.
///
/// Every handler resolves its completion handle exactly once: a normal
/// return (business errors included) acks, an unexpected failure logs,
/// nacks, and answers with the operation's safe default instead of
/// propagating. The returned value is the reply payload for the requester.
pub struct SessionDispatcher<S>
where
    S: SessionManager,
{
    service: Arc<S>,
}

impl<S> SessionDispatcher<S>
where
    S: SessionManager,
{
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Route one request by operation name.
    pub async fn dispatch(&self, operation: &str, payload: &[u8], completion: Completion) -> Value {
        match operation {
            operations::REGISTER => self.register(payload, completion).await,
            operations::LOGIN => self.login(payload, completion).await,
            operations::REFRESH_TOKEN => self.refresh(payload, completion).await,
            operations::VALIDATE_JWT => self.validate_jwt(payload, completion).await,
            operations::HASH_PASSWORD => self.hash_password(payload, completion).await,
            other => {
                tracing::warn!(operation = other, "Unknown operation");
                completion.nack();
                Value::Null
            }
        }
    }

    async fn register(&self, payload: &[u8], completion: Completion) -> Value {
        let delivery = match Delivery::<RegisterRequest>::extract(payload, completion) {
            Ok(delivery) => delivery,
            Err(completion) => {
                completion.nack();
                return Value::Bool(false);
            }
        };
        let Delivery { data, completion } = delivery;

        // Invalid identity fields are a business "no", not a transport fault
        let new_user = match data.into_domain() {
            Ok(new_user) => new_user,
            Err(reason) => {
                completion.ack();
                return BusinessErrorBody::with_message(ErrorCode::ValidationFailed, reason)
                    .into_value();
            }
        };

        match self.service.register(new_user).await {
            Ok(()) => {
                completion.ack();
                Value::Bool(true)
            }
            Err(e) => match e.business_code() {
                Some(code) => {
                    completion.ack();
                    BusinessErrorBody::new(code).into_value()
                }
                None => {
                    tracing::error!(error = %e, "Registration failed unexpectedly");
                    completion.nack();
                    Value::Bool(false)
                }
            },
        }
    }

    async fn login(&self, payload: &[u8], completion: Completion) -> Value {
        let delivery = match Delivery::<LoginRequest>::extract(payload, completion) {
            Ok(delivery) => delivery,
            Err(completion) => {
                completion.nack();
                return Value::Null;
            }
        };
        let Delivery { data, completion } = delivery;

        match self
            .service
            .login(&data.username_or_email, &data.password)
            .await
        {
            Ok(Some(pair)) => {
                completion.ack();
                to_reply(&pair)
            }
            Ok(None) => {
                completion.ack();
                Value::Null
            }
            Err(e) => {
                tracing::error!(error = %e, "Login failed unexpectedly");
                completion.nack();
                Value::Null
            }
        }
    }

    async fn refresh(&self, payload: &[u8], completion: Completion) -> Value {
        let delivery = match Delivery::<RefreshRequest>::extract(payload, completion) {
            Ok(delivery) => delivery,
            Err(completion) => {
                completion.nack();
                return Value::Null;
            }
        };
        let Delivery { data, completion } = delivery;

        match self.service.refresh(&data.0).await {
            Ok(Some(pair)) => {
                completion.ack();
                to_reply(&pair)
            }
            Ok(None) => {
                completion.ack();
                Value::Null
            }
            Err(e) => {
                tracing::error!(error = %e, "Refresh failed unexpectedly");
                completion.nack();
                Value::Null
            }
        }
    }

    async fn validate_jwt(&self, payload: &[u8], completion: Completion) -> Value {
        let delivery = match Delivery::<ValidateJwtRequest>::extract(payload, completion) {
            Ok(delivery) => delivery,
            Err(completion) => {
                completion.nack();
                return Value::Null;
            }
        };
        let Delivery { data, completion } = delivery;

        match self.service.validate_access_token(&data.0).await {
            Ok(Some(claims)) => {
                completion.ack();
                to_reply(&claims)
            }
            Ok(None) => {
                completion.ack();
                Value::Null
            }
            Err(e) => {
                tracing::error!(error = %e, "Token validation failed unexpectedly");
                completion.nack();
                Value::Null
            }
        }
    }

    async fn hash_password(&self, payload: &[u8], completion: Completion) -> Value {
        let delivery = match Delivery::<HashPasswordRequest>::extract(payload, completion) {
            Ok(delivery) => delivery,
            Err(completion) => {
                completion.nack();
                return Value::Null;
            }
        };
        let Delivery { data, completion } = delivery;

        match self.service.hash_password(&data.0).await {
            Ok(digest) => {
                completion.ack();
                Value::String(digest)
            }
            Err(e) => {
                tracing::error!(error = %e, "Password hashing failed unexpectedly");
                completion.nack();
                Value::Null
            }
        }
    }
}

fn to_reply<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::SessionClaims;
    use auth::TokenPair;
    use mockall::mock;

    use super::*;
    use crate::inbound::bus::envelope::AckNack;
    use crate::session::errors::DirectoryError;
    use crate::session::errors::SessionError;
    use crate::session::models::NewUser;

    mock! {
        pub TestSessionManager {}

        #[async_trait]
        impl SessionManager for TestSessionManager {
            async fn register(&self, new_user: NewUser) -> Result<(), SessionError>;
            async fn login(
                &self,
                identifier: &str,
                password: &str,
            ) -> Result<Option<TokenPair>, SessionError>;
            async fn refresh(&self, raw: &str) -> Result<Option<TokenPair>, SessionError>;
            async fn validate_access_token(
                &self,
                token: &str,
            ) -> Result<Option<SessionClaims>, SessionError>;
            async fn hash_password(&self, plaintext: &str) -> Result<String, SessionError>;
        }
    }

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        }
    }

    async fn dispatch(
        service: MockTestSessionManager,
        operation: &str,
        payload: &[u8],
    ) -> (Value, AckNack) {
        let dispatcher = SessionDispatcher::new(Arc::new(service));
        let (completion, mut rx) = Completion::new();
        let reply = dispatcher.dispatch(operation, payload, completion).await;
        let outcome = rx.try_recv().expect("no completion outcome fired");
        (reply, outcome)
    }

    #[tokio::test]
    async fn test_register_success_acks_with_true() {
        let mut service = MockTestSessionManager::new();
        service.expect_register().times(1).returning(|_| Ok(()));

        let payload = br#"{"username":"alice","email":"a@x.com","password":"p"}"#;
        let (reply, outcome) = dispatch(service, operations::REGISTER, payload).await;

        assert_eq!(reply, Value::Bool(true));
        assert_eq!(outcome, AckNack::Ack);
    }

    #[tokio::test]
    async fn test_register_duplicate_is_acked_business_error() {
        let mut service = MockTestSessionManager::new();
        service
            .expect_register()
            .times(1)
            .returning(|_| Err(SessionError::UserExists));

        let payload = br#"{"username":"alice","email":"a@x.com","password":"p"}"#;
        let (reply, outcome) = dispatch(service, operations::REGISTER, payload).await;

        // A business "no" still acks the message
        assert_eq!(reply["statusCode"], 2002);
        assert_eq!(reply["error"], "User already exists");
        assert_eq!(outcome, AckNack::Ack);
    }

    #[tokio::test]
    async fn test_register_infrastructure_failure_nacks() {
        let mut service = MockTestSessionManager::new();
        service.expect_register().times(1).returning(|_| {
            Err(SessionError::Directory(DirectoryError::Transport(
                "broker down".to_string(),
            )))
        });

        let payload = br#"{"username":"alice","email":"a@x.com","password":"p"}"#;
        let (reply, outcome) = dispatch(service, operations::REGISTER, payload).await;

        assert_eq!(reply, Value::Bool(false));
        assert_eq!(outcome, AckNack::Nack);
    }

    #[tokio::test]
    async fn test_register_malformed_payload_nacks() {
        let service = MockTestSessionManager::new();

        let (reply, outcome) = dispatch(service, operations::REGISTER, b"not json").await;

        assert_eq!(reply, Value::Bool(false));
        assert_eq!(outcome, AckNack::Nack);
    }

    #[tokio::test]
    async fn test_register_invalid_email_is_acked_validation_error() {
        let service = MockTestSessionManager::new();

        let payload = br#"{"username":"alice","email":"nope","password":"p"}"#;
        let (reply, outcome) = dispatch(service, operations::REGISTER, payload).await;

        assert_eq!(reply["statusCode"], 1001);
        assert_eq!(outcome, AckNack::Ack);
    }

    #[tokio::test]
    async fn test_login_success_replies_with_pair() {
        let mut service = MockTestSessionManager::new();
        service
            .expect_login()
            .times(1)
            .returning(|_, _| Ok(Some(pair())));

        let payload = br#"{"usernameOrEmail":"alice","password":"p"}"#;
        let (reply, outcome) = dispatch(service, operations::LOGIN, payload).await;

        assert_eq!(reply["accessToken"], "access");
        assert_eq!(reply["refreshToken"], "refresh");
        assert_eq!(outcome, AckNack::Ack);
    }

    #[tokio::test]
    async fn test_login_bad_credentials_acks_null() {
        let mut service = MockTestSessionManager::new();
        service.expect_login().times(1).returning(|_, _| Ok(None));

        let payload = br#"{"usernameOrEmail":"alice","password":"wrong"}"#;
        let (reply, outcome) = dispatch(service, operations::LOGIN, payload).await;

        assert_eq!(reply, Value::Null);
        assert_eq!(outcome, AckNack::Ack);
    }

    #[tokio::test]
    async fn test_refresh_forwards_raw_token_string() {
        let mut service = MockTestSessionManager::new();
        service
            .expect_refresh()
            .withf(|raw| raw == "Bearer abc")
            .times(1)
            .returning(|_| Ok(Some(pair())));

        let (reply, outcome) =
            dispatch(service, operations::REFRESH_TOKEN, br#""Bearer abc""#).await;

        assert_eq!(reply["accessToken"], "access");
        assert_eq!(outcome, AckNack::Ack);
    }

    #[tokio::test]
    async fn test_validate_jwt_replies_with_claims() {
        let mut service = MockTestSessionManager::new();
        service
            .expect_validate_access_token()
            .times(1)
            .returning(|_| {
                Ok(Some(SessionClaims {
                    sub: "user-1".to_string(),
                    iat: 100,
                    exp: 280,
                }))
            });

        let (reply, outcome) = dispatch(service, operations::VALIDATE_JWT, br#""token""#).await;

        assert_eq!(reply["sub"], "user-1");
        assert_eq!(outcome, AckNack::Ack);
    }

    #[tokio::test]
    async fn test_hash_password_replies_with_digest() {
        let mut service = MockTestSessionManager::new();
        service
            .expect_hash_password()
            .times(1)
            .returning(|_| Ok("$argon2id$digest".to_string()));

        let (reply, outcome) = dispatch(service, operations::HASH_PASSWORD, br#""p""#).await;

        assert_eq!(reply, Value::String("$argon2id$digest".to_string()));
        assert_eq!(outcome, AckNack::Ack);
    }

    #[tokio::test]
    async fn test_unknown_operation_nacks() {
        let service = MockTestSessionManager::new();

        let (reply, outcome) = dispatch(service, "rm-rf", b"{}").await;

        assert_eq!(reply, Value::Null);
        assert_eq!(outcome, AckNack::Nack);
    }
}
