//! Real-time notification fan-out for workflow state changes.
//!
//! Workflows hand a committed [`DomainEvent`] to a [`Notify`] implementation.
//! The [`EventNotifier`] publishes it on the shared channel and, when the
//! subject's department has a supervisor, on that supervisor's private
//! channel; it then mirrors the event into the inbox. Nothing in this path is
//! allowed to fail the caller. [`SubscriberSession`] is the receiving end.

pub mod channel;
pub mod event;
pub mod feed;
pub mod inbox;
pub mod notifier;
pub mod payload;
pub mod recipients;
pub mod router;
pub mod subscriber;
pub mod transport;

#[cfg(test)]
mod tests;

pub use channel::{ChannelNames, ChannelTarget};
pub use event::{known_event_names, DomainEvent, EventType, SubjectKind};
pub use feed::{FeedChange, FeedEntry, FeedStore, NotificationFeed, FEED_CAPACITY};
pub use inbox::{InMemoryInbox, InboxError, InboxPolicy, InboxStore, Notification};
pub use notifier::{
    ChannelDelivery, DeliveryOutcome, DeliveryReport, EventNotifier, InboxOutcome, InboxWrite,
    Notify,
};
pub use payload::{Notifiable, Snapshot, SnapshotBuilder};
pub use recipients::RecipientResolver;
pub use router::{notification_router, FeedSource, NotificationState};
pub use subscriber::{SubscriberSession, Viewer};
pub use transport::{Envelope, LocalBroker, RedisTransport, Transport, TransportError};
