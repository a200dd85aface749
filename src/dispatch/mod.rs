//! Server-side Push Dispatch
//!
//! Fan-out of a notification payload to every registered subscription of a
//! set of recipients. Delivery is best-effort per endpoint: one dead
//! endpoint never aborts the rest, and the result is a count of successes
//! rather than an all-or-nothing verdict.

use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;

use crate::notify::NotificationPayload;
use crate::push::{ProfileId, PushSubscriptionRecord, SubscriptionStore};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("delivery to {endpoint} failed: {reason}")]
    Send { endpoint: String, reason: String },
}

impl DispatchError {
    pub fn send(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Send {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

/// Delivers one encrypted push message to one endpoint
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscriptionRecord,
        payload: &NotificationPayload,
    ) -> Result<(), DispatchError>;
}

/// Outcome of a fan-out: how many endpoints were attempted and how many
/// deliveries succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    pub recipients: usize,
    pub attempted: usize,
    pub delivered: usize,
}

/// Fans a payload out to every registered subscription of each recipient
pub struct Dispatcher {
    subscriptions: Arc<dyn SubscriptionStore>,
    sender: Arc<dyn PushSender>,
}

impl Dispatcher {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, sender: Arc<dyn PushSender>) -> Self {
        Self {
            subscriptions,
            sender,
        }
    }

    /// Deliver the payload to every subscription of every recipient.
    /// Per-endpoint failures are logged and counted, never propagated; a
    /// recipient whose subscription lookup fails is skipped.
    pub async fn deliver(
        &self,
        recipients: &[ProfileId],
        payload: &NotificationPayload,
    ) -> DeliveryReport {
        let mut report = DeliveryReport {
            recipients: recipients.len(),
            ..DeliveryReport::default()
        };

        for profile_id in recipients {
            let records = match self.subscriptions.list_for_profile(profile_id).await {
                Ok(records) => records,
                Err(err) => {
                    warn!("could not load subscriptions for {profile_id}: {err}");
                    continue;
                }
            };

            for record in &records {
                report.attempted += 1;
                match self.sender.send(record, payload).await {
                    Ok(()) => report.delivered += 1,
                    Err(err) => warn!("push delivery failed: {err}"),
                }
            }
        }

        info!(
            "dispatched \"{}\" to {} recipients: {}/{} deliveries succeeded",
            payload.title, report.recipients, report.delivered, report.attempted
        );
        report
    }
}
