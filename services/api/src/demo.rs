use crate::infra::{build_components, load_directory, parse_date};
use crate::listen::describe;
use chrono::{Duration as DateDuration, Local, NaiveDate};
use clap::Args;
use hris::config::NotificationConfig;
use hris::error::AppError;
use hris::ids::{EmployeeId, UserId};
use hris::notifications::{Envelope, SubscriberSession, TransportError, Viewer};
use hris::workflows::{Decision, DecisionInput, LeaveKind, LeaveSubmission};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;

const DRAIN_WINDOW: Duration = Duration::from_millis(100);

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// First day of the sample leave (YYYY-MM-DD). Defaults to two weeks from today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let start_date = args
        .start_date
        .unwrap_or_else(|| Local::now().date_naive() + DateDuration::days(14));
    let end_date = start_date + DateDuration::days(2);

    let config = NotificationConfig::default();
    let directory = Arc::new(load_directory(None)?);
    let components = build_components(&config, directory)?;
    let broker = components.broker.clone().ok_or_else(|| {
        TransportError::Unavailable("demo runs on the in-process broker".to_string())
    })?;

    println!("HRIS notification demo");
    println!("Department supervisors:");
    for assignment in components.directory.assignments() {
        println!(
            "  - {} -> {}",
            assignment.department_id, assignment.supervisor_id
        );
    }

    let mut taps: Vec<(String, Receiver<Envelope>)> = [
        config.channels.shared.clone(),
        config.channels.private(&UserId::new("sup-finance")),
    ]
    .into_iter()
    .map(|channel| {
        let receiver = broker.subscribe(&channel);
        (channel, receiver)
    })
    .collect();

    let resolver = &components.notifications.resolver;
    let sessions: Vec<SubscriberSession> = ["sup-finance", "hr-officer"]
        .into_iter()
        .map(|user| {
            SubscriberSession::new(Viewer::classify(UserId::new(user), resolver), &config.channels)
        })
        .collect();
    let streams: Vec<_> = sessions
        .iter()
        .map(|session| session.local_stream(&broker))
        .collect();

    println!("\n1. Leave request in a supervised department (finance)");
    let supervised = components
        .service
        .submit_leave(sample_leave("E-1001", start_date, end_date))
        .await?;
    print_deliveries(&mut taps);

    println!("\n2. Leave request in a department without a supervisor (facilities)");
    components
        .service
        .submit_leave(sample_leave("E-3001", start_date, end_date))
        .await?;
    print_deliveries(&mut taps);

    println!("\n3. Supervisor approves the finance request");
    components
        .service
        .decide_leave(
            &supervised.leave_id,
            DecisionInput {
                decision: Decision::Approve,
                decided_by: UserId::new("sup-finance"),
                remarks: Some("Approved for the dates requested".to_string()),
            },
        )
        .await?;
    print_deliveries(&mut taps);

    println!("\nSession feeds (de-duplicated by event id)");
    for (session, stream) in sessions.iter().zip(streams) {
        // The broker never closes its channels, so drain for a short window.
        let _ = tokio::time::timeout(DRAIN_WINDOW, session.run(stream)).await;
        let viewer = session.viewer();
        println!(
            "  {} ({}) unread={}",
            viewer.user_id,
            if viewer.supervisor { "supervisor" } else { "staff" },
            session.feed().unread()
        );
        for entry in session.feed().entries() {
            println!(
                "    - {} {} status={}",
                entry.event,
                entry.subject_id,
                entry.data.get_str("status").unwrap_or("-")
            );
        }
    }

    let inbox = components.inbox.all();
    println!("\nInbox rows written: {}", inbox.len());
    for row in inbox {
        println!(
            "  - {} -> {}",
            row.notification_type,
            row.recipient_user_id
                .as_ref()
                .map(UserId::as_str)
                .unwrap_or("everyone")
        );
    }

    Ok(())
}

fn sample_leave(employee: &str, start_date: NaiveDate, end_date: NaiveDate) -> LeaveSubmission {
    LeaveSubmission {
        employee_id: EmployeeId::new(employee),
        leave_kind: LeaveKind::Vacation,
        start_date,
        end_date,
        reason: "Family visit".to_string(),
    }
}

fn print_deliveries(taps: &mut [(String, Receiver<Envelope>)]) {
    for (channel, receiver) in taps.iter_mut() {
        while let Ok(envelope) = receiver.try_recv() {
            println!("   {channel:<28} {}", describe(&envelope));
        }
    }
}
