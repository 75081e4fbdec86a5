use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use tracing::{debug, info};

use super::channel::{ChannelNames, ChannelTarget};
use super::feed::{FeedChange, FeedStore};
use super::recipients::RecipientResolver;
use super::transport::{Envelope, LocalBroker};
use crate::ids::UserId;

/// The person behind a browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Viewer {
    pub user_id: UserId,
    pub supervisor: bool,
}

impl Viewer {
    pub fn classify(user_id: UserId, resolver: &RecipientResolver) -> Self {
        let supervisor = resolver.is_supervisor(&user_id);
        Self {
            user_id,
            supervisor,
        }
    }

    pub fn targets(&self) -> Vec<ChannelTarget> {
        let recipient = self.supervisor.then_some(&self.user_id);
        ChannelNames::targets_for(recipient)
    }
}

/// One viewer's subscriptions plus the feed they populate.
#[derive(Debug, Clone)]
pub struct SubscriberSession {
    viewer: Viewer,
    channels: Vec<String>,
    feed: FeedStore,
}

impl SubscriberSession {
    pub fn new(viewer: Viewer, names: &ChannelNames) -> Self {
        let channels = viewer
            .targets()
            .iter()
            .map(|target| names.resolve(target))
            .collect();
        Self {
            viewer,
            channels,
            feed: FeedStore::default(),
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn feed(&self) -> &FeedStore {
        &self.feed
    }

    pub fn receive(&self, envelope: Envelope) -> FeedChange {
        let event = envelope.event.clone();
        let change = self.feed.apply(envelope);
        debug!(user_id = %self.viewer.user_id, event = %event, ?change, "feed updated");
        change
    }

    /// Merged stream of every channel this session listens on.
    pub fn local_stream(&self, broker: &LocalBroker) -> BoxStream<'static, Envelope> {
        stream::select_all(
            self.channels
                .iter()
                .map(|channel| broker.subscribe_stream(channel).boxed()),
        )
        .boxed()
    }

    /// Stream of envelopes that were new to this session's feed.
    pub fn fresh<S>(self, source: S) -> impl Stream<Item = Envelope> + Send + 'static
    where
        S: Stream<Item = Envelope> + Send + 'static,
    {
        source.filter_map(move |envelope| {
            let change = self.receive(envelope.clone());
            async move { (change == FeedChange::Appended).then_some(envelope) }
        })
    }

    /// Drain `source` into the feed until it ends.
    pub async fn run<S>(&self, source: S)
    where
        S: Stream<Item = Envelope> + Send,
    {
        info!(
            user_id = %self.viewer.user_id,
            channels = ?self.channels,
            "subscriber session started"
        );
        futures_util::pin_mut!(source);
        while let Some(envelope) = source.next().await {
            self.receive(envelope);
        }
        info!(user_id = %self.viewer.user_id, "subscriber session ended");
    }
}
