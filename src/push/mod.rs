//! Push delivery transport.
//!
//! The transport sends one multicast message to a list of device tokens and
//! reports a per-recipient outcome aligned positionally with the input
//! list. A single call accepts at most [`MAX_RECIPIENTS_PER_SEND`] tokens;
//! the dispatcher chunks larger rosters before calling in.

#[cfg(feature = "fcm-push")]
pub mod fcm;

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

/// Hard per-call recipient limit imposed by the delivery transport.
pub const MAX_RECIPIENTS_PER_SEND: usize = 500;

/// Title and body of one push message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

/// Per-recipient delivery outcome, aligned with the input token order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Whether the transport accepted the message for this token.
    pub success: bool,
    /// Transport-assigned message id, when one was reported. The transport
    /// does not guarantee a call-level id.
    pub message_id: Option<String>,
}

/// Failures raised by push transport backends. A transport-level failure
/// means no per-token outcome is available for the whole call.
#[derive(Debug, Error)]
pub enum PushError {
    /// The transport could not be reached or answered unusably.
    #[error("push transport unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The caller exceeded the per-call recipient limit.
    #[error("{count} recipients exceed the per-call limit of {limit}")]
    TooManyRecipients { count: usize, limit: usize },
}

impl PushError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        PushError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Abstraction over the multicast push delivery service.
pub trait PushTransport: Send + Sync {
    fn send_multicast(
        &self,
        notification: PushNotification,
        tokens: Vec<String>,
    ) -> BoxFuture<'static, Result<Vec<SendOutcome>, PushError>>;
}
