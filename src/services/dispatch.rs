use std::{sync::Arc, time::Duration};

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    dao::{match_store::FailureLedger, models::PushFailureEntity},
    push::{MAX_RECIPIENTS_PER_SEND, PushNotification, PushTransport},
};

/// Recorded when the transport reports no message id at all.
const MESSAGE_ID_FALLBACK: &str = "not available";

/// Aggregate outcome of one dispatch, the only delivery information ever
/// surfaced to the caller that triggered it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Tokens the transport accepted.
    pub success_count: usize,
    /// Tokens that did not deliver.
    pub failure_count: usize,
    /// The failed tokens, in original send order.
    pub failed_tokens: Vec<String>,
}

/// Sends a multicast push to a token list, classifies per-recipient
/// outcomes and records failures in the ledger.
#[derive(Clone)]
pub struct NotificationDispatcher {
    transport: Arc<dyn PushTransport>,
    ledger: Arc<dyn FailureLedger>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        transport: Arc<dyn PushTransport>,
        ledger: Arc<dyn FailureLedger>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            ledger,
            timeout,
        }
    }

    /// Deliver one notification to every token in the list.
    ///
    /// Empty tokens (members with no registered device) are skipped as
    /// undeliverable no-ops. The remainder is sent in batches within the
    /// transport's per-call recipient limit; a transport error or timeout
    /// marks the whole batch failed. Failed tokens are recorded in the
    /// failure ledger under the current minute bucket. Delivery problems
    /// never propagate as errors; the returned counts are the only signal.
    pub async fn dispatch(&self, title: &str, body: &str, tokens: Vec<String>) -> DispatchResult {
        let total = tokens.len();
        let deliverable: Vec<String> = tokens
            .into_iter()
            .filter(|token| !token.trim().is_empty())
            .collect();
        let skipped = total - deliverable.len();
        if skipped > 0 {
            debug!(skipped, "skipping members without a registered device");
        }
        if deliverable.is_empty() {
            return DispatchResult::default();
        }

        let mut success_count = 0;
        let mut failed_tokens = Vec::new();
        let mut message_id: Option<String> = None;

        for batch in deliverable.chunks(MAX_RECIPIENTS_PER_SEND) {
            let notification = PushNotification {
                title: title.to_owned(),
                body: body.to_owned(),
            };
            let send = self
                .transport
                .send_multicast(notification, batch.to_vec());

            match tokio::time::timeout(self.timeout, send).await {
                Ok(Ok(outcomes)) => {
                    for (token, outcome) in batch.iter().zip(outcomes) {
                        if let Some(id) = outcome.message_id {
                            message_id = Some(id);
                        }
                        if outcome.success {
                            success_count += 1;
                        } else {
                            failed_tokens.push(token.clone());
                        }
                    }
                }
                Ok(Err(err)) => {
                    warn!(error = %err, batch = batch.len(), "push transport rejected the batch");
                    failed_tokens.extend(batch.iter().cloned());
                }
                Err(_) => {
                    warn!(batch = batch.len(), "push delivery timed out; counting the batch as failed");
                    failed_tokens.extend(batch.iter().cloned());
                }
            }
        }

        info!(success_count, "push messages sent");

        if !failed_tokens.is_empty() {
            warn!(failed = failed_tokens.len(), "tokens failed delivery");
            let entry = PushFailureEntity {
                bucket_id: bucket_id(OffsetDateTime::now_utc()),
                failed_tokens: failed_tokens.clone(),
                message_id: message_id.unwrap_or_else(|| MESSAGE_ID_FALLBACK.to_owned()),
            };
            if let Err(err) = self.ledger.record(entry).await {
                warn!(error = %err, "failed to record push failures");
            }
        }

        DispatchResult {
            success_count,
            failure_count: failed_tokens.len(),
            failed_tokens,
        }
    }
}

/// Ledger key for a delivery attempt: UTC day, month, year, hour and
/// minute concatenated without padding. Attempts within the same minute
/// share a key and overwrite each other.
fn bucket_id(now: OffsetDateTime) -> String {
    format!(
        "{}{}{}{}{}",
        now.day(),
        now.month() as u8,
        now.year(),
        now.hour(),
        now.minute()
    )
}
