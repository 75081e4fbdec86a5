use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::channel::{ChannelNames, ChannelTarget};
use super::event::DomainEvent;
use super::inbox::{InboxPolicy, InboxStore, Notification};
use super::recipients::RecipientResolver;
use super::transport::{Envelope, Transport, TransportError};
use crate::config::NotificationConfig;
use crate::directory::SupervisorRegistry;
use crate::ids::{RecordId, UserId};

/// Entry point the workflows call once their write has committed.
///
/// Implementations never fail: every problem is logged and reported in the
/// returned [`DeliveryReport`].
#[async_trait]
pub trait Notify: Send + Sync {
    async fn notify(&self, event: DomainEvent) -> DeliveryReport;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Published,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelDelivery {
    pub target: ChannelTarget,
    pub channel: String,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InboxOutcome {
    Stored { notification_id: Uuid },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxWrite {
    pub recipient: Option<UserId>,
    #[serde(flatten)]
    pub outcome: InboxOutcome,
}

/// What the notifier did with one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub event_id: Uuid,
    pub event: String,
    pub subject_id: RecordId,
    pub recipient: Option<UserId>,
    pub deliveries: Vec<ChannelDelivery>,
    pub inbox: Vec<InboxWrite>,
}

impl DeliveryReport {
    pub fn shared(&self) -> Option<&ChannelDelivery> {
        self.deliveries
            .iter()
            .find(|delivery| delivery.target == ChannelTarget::Shared)
    }

    pub fn private(&self) -> Option<&ChannelDelivery> {
        self.deliveries
            .iter()
            .find(|delivery| matches!(delivery.target, ChannelTarget::Private(_)))
    }

    pub fn fully_delivered(&self) -> bool {
        self.deliveries
            .iter()
            .all(|delivery| delivery.outcome == DeliveryOutcome::Published)
    }
}

/// Resolves the recipient, publishes to the shared and private channels and
/// mirrors the event into the inbox.
pub struct EventNotifier {
    transport: Arc<dyn Transport>,
    resolver: RecipientResolver,
    inbox: Arc<dyn InboxStore>,
    channels: ChannelNames,
    publish_timeout: Duration,
    inbox_policy: InboxPolicy,
}

impl EventNotifier {
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: Arc<dyn SupervisorRegistry>,
        inbox: Arc<dyn InboxStore>,
        config: &NotificationConfig,
    ) -> Self {
        Self {
            transport,
            resolver: RecipientResolver::new(registry),
            inbox,
            channels: config.channels.clone(),
            publish_timeout: config.publish_timeout,
            inbox_policy: config.inbox_policy,
        }
    }

    pub fn channels(&self) -> &ChannelNames {
        &self.channels
    }

    async fn publish_to(
        &self,
        target: ChannelTarget,
        event_name: &str,
        envelope: &Envelope,
    ) -> ChannelDelivery {
        let channel = self.channels.resolve(&target);
        let attempt = tokio::time::timeout(
            self.publish_timeout,
            self.transport.publish(&channel, event_name, envelope),
        )
        .await
        .unwrap_or_else(|_| {
            Err(TransportError::Timeout {
                channel: channel.clone(),
                millis: self.publish_timeout.as_millis(),
            })
        });

        let outcome = match attempt {
            Ok(()) => {
                metrics::counter!("hris_notifications_published_total", "channel" => target.label())
                    .increment(1);
                DeliveryOutcome::Published
            }
            Err(err) => {
                metrics::counter!("hris_notifications_failed_total", "channel" => target.label())
                    .increment(1);
                warn!(
                    event = event_name,
                    subject_id = %envelope.subject_id,
                    channel = %channel,
                    transport = self.transport.name(),
                    error = %err,
                    "notification publish failed"
                );
                DeliveryOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };

        ChannelDelivery {
            target,
            channel,
            outcome,
        }
    }

    fn write_inbox(
        &self,
        event_name: &str,
        envelope: &Envelope,
        recipient: Option<&UserId>,
    ) -> Vec<InboxWrite> {
        let mut rows: Vec<Option<UserId>> = Vec::new();
        if self.inbox_policy.writes_addressed() {
            if let Some(user) = recipient {
                rows.push(Some(user.clone()));
            }
        }
        if self.inbox_policy.writes_broadcast() {
            rows.push(None);
        }

        rows.into_iter()
            .map(|row_recipient| {
                let notification = Notification::new(
                    event_name.to_string(),
                    row_recipient.clone(),
                    envelope.data.to_value(),
                );
                let outcome = match self.inbox.insert(notification) {
                    Ok(stored) => InboxOutcome::Stored {
                        notification_id: stored.id,
                    },
                    Err(err) => {
                        metrics::counter!("hris_inbox_write_failures_total").increment(1);
                        warn!(
                            event = event_name,
                            subject_id = %envelope.subject_id,
                            error = %err,
                            "inbox write failed"
                        );
                        InboxOutcome::Failed {
                            reason: err.to_string(),
                        }
                    }
                };
                InboxWrite {
                    recipient: row_recipient,
                    outcome,
                }
            })
            .collect()
    }
}

#[async_trait]
impl Notify for EventNotifier {
    async fn notify(&self, event: DomainEvent) -> DeliveryReport {
        let event_name = event.event_name();
        let recipient = self.resolver.resolve(&event.department_id);
        let envelope = Envelope::from(&event);

        if recipient.is_none() {
            debug!(
                event = %event_name,
                department_id = %event.department_id,
                "no supervisor assigned; shared channel only"
            );
        }

        let mut deliveries = Vec::with_capacity(2);
        for target in ChannelNames::targets_for(recipient.as_ref()) {
            deliveries.push(self.publish_to(target, &event_name, &envelope).await);
        }

        let inbox = self.write_inbox(&event_name, &envelope, recipient.as_ref());

        let report = DeliveryReport {
            event_id: event.id,
            event: event_name,
            subject_id: event.subject_id,
            recipient,
            deliveries,
            inbox,
        };

        info!(
            event = %report.event,
            subject_id = %report.subject_id,
            recipient = report.recipient.as_ref().map(UserId::as_str).unwrap_or("-"),
            delivered = report.fully_delivered(),
            "notification dispatched"
        );

        report
    }
}
