use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use super::{Envelope, Transport, TransportError};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// In-process broker: one bounded broadcast sender per subscribed channel.
///
/// Lagging receivers lose the oldest envelopes rather than blocking publishers.
/// Senders are created on subscribe and dropped once their last receiver is
/// gone, so publishing to an unwatched channel allocates nothing.
#[derive(Debug)]
pub struct LocalBroker {
    channels: Mutex<HashMap<String, broadcast::Sender<Envelope>>>,
    capacity: usize,
}

impl Default for LocalBroker {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl LocalBroker {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<Envelope> {
        let mut guard = self.channels.lock().expect("broker mutex poisoned");
        guard.retain(|_, sender| sender.receiver_count() > 0);
        guard
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscription as a stream; lag notifications are logged and skipped.
    pub fn subscribe_stream(&self, channel: &str) -> impl Stream<Item = Envelope> + Send + 'static {
        let channel = channel.to_string();
        BroadcastStream::new(self.subscribe(&channel)).filter_map(move |item| {
            let channel = channel.clone();
            async move {
                match item {
                    Ok(envelope) => Some(envelope),
                    Err(err) => {
                        warn!(channel = %channel, error = %err, "subscriber lagged behind broker");
                        None
                    }
                }
            }
        })
    }

    /// Number of channels currently holding a sender.
    pub fn open_channels(&self) -> usize {
        self.channels.lock().expect("broker mutex poisoned").len()
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        let guard = self.channels.lock().expect("broker mutex poisoned");
        guard
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl Transport for LocalBroker {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn publish(
        &self,
        channel: &str,
        event_name: &str,
        envelope: &Envelope,
    ) -> Result<(), TransportError> {
        let delivered = {
            let mut guard = self.channels.lock().expect("broker mutex poisoned");
            match guard.get(channel) {
                Some(sender) if sender.receiver_count() > 0 => {
                    sender.send(envelope.clone()).unwrap_or(0)
                }
                Some(_) => {
                    guard.remove(channel);
                    0
                }
                None => 0,
            }
        };
        debug!(channel, event = event_name, delivered, "published on local broker");
        Ok(())
    }
}
