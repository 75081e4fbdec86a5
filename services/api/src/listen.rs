use crate::infra::load_directory;
use clap::Args;
use futures_util::StreamExt;
use hris::config::AppConfig;
use hris::error::AppError;
use hris::ids::UserId;
use hris::notifications::{
    Envelope, RecipientResolver, RedisTransport, SubscriberSession, TransportError, Viewer,
};
use hris::telemetry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ListenArgs {
    /// User whose feed to follow; supervisors also get their private channel
    #[arg(long)]
    pub(crate) user: String,
    /// JSON file with employees and department supervisors
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run_listen(args: ListenArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let redis_url = config.notifications.redis_url.as_deref().ok_or_else(|| {
        TransportError::Unavailable("HRIS_REDIS_URL must be set to listen".to_string())
    })?;
    let seed = args.seed.or(config.seed_file);
    let directory = Arc::new(load_directory(seed.as_deref())?);

    let viewer = Viewer::classify(UserId::new(args.user), &RecipientResolver::new(directory));
    let session = SubscriberSession::new(viewer, &config.notifications.channels);

    let transport = RedisTransport::connect(redis_url)?;
    let source = transport.subscribe(session.channels()).await?;
    info!(
        user_id = %session.viewer().user_id,
        supervisor = session.viewer().supervisor,
        channels = ?session.channels(),
        "listening for notifications"
    );
    println!("Listening on {}", session.channels().join(", "));

    let feed = session.feed().clone();
    let fresh = session.clone().fresh(source);
    futures_util::pin_mut!(fresh);
    while let Some(envelope) = fresh.next().await {
        println!("{} (unread {})", describe(&envelope), feed.unread());
    }

    Ok(())
}

pub(crate) fn describe(envelope: &Envelope) -> String {
    format!(
        "{} {} {} status={}",
        envelope.occurred_at.format("%Y-%m-%d %H:%M:%S"),
        envelope.event,
        envelope.subject_id,
        envelope.data.get_str("status").unwrap_or("-")
    )
}
