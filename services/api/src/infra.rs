use chrono::NaiveDate;
use hris::config::NotificationConfig;
use hris::directory::{DirectorySeed, InMemoryDirectory};
use hris::error::AppError;
use hris::notifications::{
    EventNotifier, FeedSource, InMemoryInbox, LocalBroker, NotificationState, RecipientResolver,
    RedisTransport, Transport,
};
use hris::workflows::{HrService, WorkflowStores};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything the HTTP routes and the demo need, wired against one directory.
pub(crate) struct Components {
    pub(crate) service: Arc<HrService>,
    pub(crate) notifications: NotificationState,
    pub(crate) directory: Arc<InMemoryDirectory>,
    pub(crate) inbox: Arc<InMemoryInbox>,
    /// Present when events stay in process (no Redis URL configured).
    pub(crate) broker: Option<Arc<LocalBroker>>,
}

pub(crate) fn load_directory(seed_file: Option<&Path>) -> Result<InMemoryDirectory, AppError> {
    let seed = match seed_file {
        Some(path) => {
            let seed = DirectorySeed::from_path(path)?;
            info!(
                path = %path.display(),
                employees = seed.employees.len(),
                assignments = seed.assignments.len(),
                "directory seeded from file"
            );
            seed
        }
        None => DirectorySeed::sample(),
    };
    Ok(InMemoryDirectory::from_seed(seed))
}

pub(crate) fn build_components(
    config: &NotificationConfig,
    directory: Arc<InMemoryDirectory>,
) -> Result<Components, AppError> {
    let (transport, source, broker): (Arc<dyn Transport>, FeedSource, Option<Arc<LocalBroker>>) =
        match config.redis_url.as_deref() {
            Some(url) => {
                let redis = RedisTransport::connect(url)?;
                let transport: Arc<dyn Transport> = Arc::new(redis.clone());
                info!(transport = "redis", "notification transport configured");
                (transport, FeedSource::Redis(redis), None)
            }
            None => {
                let broker = Arc::new(LocalBroker::default());
                let transport: Arc<dyn Transport> = broker.clone();
                info!(transport = "local", "notification transport configured");
                (transport, FeedSource::Local(broker.clone()), Some(broker))
            }
        };

    let inbox = Arc::new(InMemoryInbox::default());
    let notifier = Arc::new(EventNotifier::new(
        transport,
        directory.clone(),
        inbox.clone(),
        config,
    ));
    let service = Arc::new(HrService::new(
        directory.clone(),
        WorkflowStores::in_memory(),
        notifier,
    ));
    let notifications = NotificationState {
        inbox: inbox.clone(),
        source,
        resolver: RecipientResolver::new(directory.clone()),
        channels: config.channels.clone(),
    };

    Ok(Components {
        service,
        notifications,
        directory,
        inbox,
        broker,
    })
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
