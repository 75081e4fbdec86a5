use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use redis::{AsyncCommands, Client};
use tracing::{debug, warn};

use super::{Envelope, Transport, TransportError};

/// Publishes envelopes as JSON strings with Redis `PUBLISH`.
#[derive(Clone)]
pub struct RedisTransport {
    client: Client,
}

impl RedisTransport {
    pub fn connect(redis_url: &str) -> Result<Self, TransportError> {
        let client = Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// Subscribe to `channels`; undecodable messages are logged and dropped.
    pub async fn subscribe(
        &self,
        channels: &[String],
    ) -> Result<BoxStream<'static, Envelope>, TransportError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        for channel in channels {
            pubsub.subscribe(channel).await?;
        }

        let stream = pubsub.into_on_message().filter_map(|msg| async move {
            let channel = msg.get_channel_name().to_string();
            let payload: String = match msg.get_payload() {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(channel = %channel, error = %err, "non-text message on notification channel");
                    return None;
                }
            };
            match serde_json::from_str::<Envelope>(&payload) {
                Ok(envelope) => Some(envelope),
                Err(err) => {
                    warn!(channel = %channel, error = %err, "undecodable notification envelope");
                    None
                }
            }
        });

        Ok(stream.boxed())
    }
}

#[async_trait]
impl Transport for RedisTransport {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn publish(
        &self,
        channel: &str,
        event_name: &str,
        envelope: &Envelope,
    ) -> Result<(), TransportError> {
        let mut connection = self.client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(envelope)?;
        let receivers: i64 = connection.publish(channel, serialized).await?;
        debug!(channel, event = event_name, receivers, "published on redis");
        Ok(())
    }
}
