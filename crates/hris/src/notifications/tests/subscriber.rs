use std::sync::Arc;

use futures_util::StreamExt;
use uuid::Uuid;

use super::common::*;
use crate::ids::UserId;
use crate::notifications::channel::ChannelNames;
use crate::notifications::feed::FeedChange;
use crate::notifications::inbox::{InMemoryInbox, InboxPolicy};
use crate::notifications::notifier::Notify;
use crate::notifications::recipients::RecipientResolver;
use crate::notifications::subscriber::{SubscriberSession, Viewer};
use crate::notifications::transport::LocalBroker;

fn resolver() -> RecipientResolver {
    RecipientResolver::new(directory())
}

#[test]
fn supervisors_listen_on_their_private_channel_too() {
    let names = ChannelNames::default();

    let supervisor = Viewer::classify(UserId::new("sup-finance"), &resolver());
    assert!(supervisor.supervisor);
    let session = SubscriberSession::new(supervisor, &names);
    assert_eq!(
        session.channels(),
        ["hris.broadcast".to_string(), "hris.supervisor.sup-finance".to_string()]
    );

    let officer = Viewer::classify(UserId::new("hr-officer"), &resolver());
    assert!(!officer.supervisor);
    let session = SubscriberSession::new(officer, &names);
    assert_eq!(session.channels(), ["hris.broadcast".to_string()]);
}

#[test]
fn classification_failure_means_shared_only() {
    let viewer = Viewer::classify(
        UserId::new("sup-finance"),
        &RecipientResolver::new(Arc::new(FailingRegistry)),
    );
    assert!(!viewer.supervisor);
}

#[test]
fn receive_reports_feed_changes() {
    let viewer = Viewer::classify(UserId::new("hr-officer"), &resolver());
    let session = SubscriberSession::new(viewer, &ChannelNames::default());
    let event_id = Uuid::new_v4();

    assert_eq!(
        session.receive(envelope("leave.request_created", event_id)),
        FeedChange::Appended
    );
    assert_eq!(
        session.receive(envelope("leave.request_created", event_id)),
        FeedChange::Duplicate
    );
    assert_eq!(session.feed().unread(), 1);
}

#[tokio::test]
async fn supervisor_sees_one_entry_for_both_copies() {
    let broker = Arc::new(LocalBroker::default());
    let notifier = notifier_with(
        broker.clone(),
        directory(),
        Arc::new(InMemoryInbox::default()),
        InboxPolicy::Disabled,
    );

    let viewer = Viewer::classify(UserId::new("sup-finance"), &resolver());
    let session = SubscriberSession::new(viewer, notifier.channels());
    let stream = session.local_stream(&broker);
    assert_eq!(broker.subscriber_count("hris.supervisor.sup-finance"), 1);

    let event = created_event("finance");
    notifier.notify(event.clone()).await;

    let fresh: Vec<_> = session.clone().fresh(stream.take(2)).collect().await;
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].event_id, event.id);

    let entries = session.feed().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].subject_id, event.subject_id);
    assert_eq!(entries[0].event, "leave.request_created");
}

#[tokio::test]
async fn other_supervisors_only_get_the_shared_copy() {
    let broker = Arc::new(LocalBroker::default());
    let notifier = notifier_with(
        broker.clone(),
        directory(),
        Arc::new(InMemoryInbox::default()),
        InboxPolicy::Disabled,
    );

    let viewer = Viewer::classify(UserId::new("sup-warehouse"), &resolver());
    let session = SubscriberSession::new(viewer, notifier.channels());
    let stream = session.local_stream(&broker);

    notifier.notify(created_event("finance")).await;
    notifier.notify(created_event("warehouse")).await;

    // finance: shared only; warehouse: shared plus private.
    session.run(stream.take(3)).await;

    let entries = session.feed().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(session.feed().unread(), 2);
}
