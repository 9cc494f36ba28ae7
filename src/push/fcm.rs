//! Firebase Cloud Messaging transport.
//!
//! Uses the legacy multicast endpoint: one POST carries up to 500
//! `registration_ids` and the response lists one result per token, in
//! order.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{MAX_RECIPIENTS_PER_SEND, PushError, PushNotification, PushTransport, SendOutcome};

const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

/// Failures specific to the FCM backend.
#[derive(Debug, Error)]
pub enum FcmError {
    /// Required environment variable is missing.
    #[error("missing FCM environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build FCM client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The send request could not be delivered to FCM.
    #[error("failed to send FCM request")]
    RequestSend {
        #[source]
        source: reqwest::Error,
    },
    /// FCM returned an unexpected status code.
    #[error("unexpected FCM response status {status}")]
    RequestStatus { status: StatusCode },
    /// Response payload could not be parsed.
    #[error("failed to decode FCM response")]
    DecodeResponse {
        #[source]
        source: reqwest::Error,
    },
    /// FCM reported a different number of results than tokens sent.
    #[error("FCM returned {received} results for {expected} tokens")]
    MisalignedResponse { expected: usize, received: usize },
}

impl From<FcmError> for PushError {
    fn from(err: FcmError) -> Self {
        let message = err.to_string();
        PushError::unavailable(message, err)
    }
}

/// Connection settings for [`FcmTransport`].
#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub endpoint: String,
    pub server_key: String,
}

impl FcmConfig {
    pub fn from_env() -> Result<Self, FcmError> {
        let server_key = std::env::var("FCM_SERVER_KEY")
            .map_err(|_| FcmError::MissingEnvVar {
                var: "FCM_SERVER_KEY",
            })?;
        let endpoint = std::env::var("FCM_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_FCM_ENDPOINT.to_owned());
        Ok(Self {
            endpoint,
            server_key,
        })
    }
}

#[derive(Debug, Serialize)]
struct FcmMulticastRequest {
    registration_ids: Vec<String>,
    notification: FcmNotificationPayload,
}

#[derive(Debug, Serialize)]
struct FcmNotificationPayload {
    title: String,
    body: String,
}

#[derive(Debug, Deserialize)]
struct FcmMulticastResponse {
    results: Vec<FcmSendResult>,
}

#[derive(Debug, Deserialize)]
struct FcmSendResult {
    message_id: Option<String>,
    error: Option<String>,
}

/// Push transport backed by Firebase Cloud Messaging.
#[derive(Clone)]
pub struct FcmTransport {
    client: Client,
    endpoint: Arc<str>,
    server_key: Arc<str>,
}

impl FcmTransport {
    /// Build the transport from connection settings.
    pub fn new(config: FcmConfig) -> Result<Self, FcmError> {
        let client = Client::builder()
            .build()
            .map_err(|source| FcmError::ClientBuilder { source })?;

        Ok(Self {
            client,
            endpoint: Arc::<str>::from(config.endpoint),
            server_key: Arc::<str>::from(config.server_key),
        })
    }

    async fn send(
        &self,
        notification: PushNotification,
        tokens: Vec<String>,
    ) -> Result<Vec<SendOutcome>, PushError> {
        if tokens.len() > MAX_RECIPIENTS_PER_SEND {
            return Err(PushError::TooManyRecipients {
                count: tokens.len(),
                limit: MAX_RECIPIENTS_PER_SEND,
            });
        }

        let expected = tokens.len();
        let request = FcmMulticastRequest {
            registration_ids: tokens,
            notification: FcmNotificationPayload {
                title: notification.title,
                body: notification.body,
            },
        };

        let response = self
            .client
            .post(self.endpoint.as_ref())
            .header(
                header::AUTHORIZATION,
                format!("key={}", self.server_key),
            )
            .json(&request)
            .send()
            .await
            .map_err(|source| FcmError::RequestSend { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FcmError::RequestStatus { status }.into());
        }

        let payload: FcmMulticastResponse = response
            .json()
            .await
            .map_err(|source| FcmError::DecodeResponse { source })?;

        if payload.results.len() != expected {
            return Err(FcmError::MisalignedResponse {
                expected,
                received: payload.results.len(),
            }
            .into());
        }

        Ok(payload
            .results
            .into_iter()
            .map(|result| SendOutcome {
                success: result.error.is_none(),
                message_id: result.message_id,
            })
            .collect())
    }
}

impl PushTransport for FcmTransport {
    fn send_multicast(
        &self,
        notification: PushNotification,
        tokens: Vec<String>,
    ) -> BoxFuture<'static, Result<Vec<SendOutcome>, PushError>> {
        let transport = self.clone();
        Box::pin(async move { transport.send(notification, tokens).await })
    }
}
