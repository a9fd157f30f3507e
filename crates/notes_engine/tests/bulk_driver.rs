mod support;

use std::sync::Arc;
use std::time::Duration;

use notes_core::BulkStatus;
use notes_engine::{BulkDriver, ChannelMessageSink, DriverSettings};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use support::{statuses_until_terminal, FakePage};

fn fixed_delay_settings() -> DriverSettings {
    DriverSettings {
        min_delay_ms: 3_000,
        max_delay_ms: 3_000,
        ..DriverSettings::default()
    }
}

#[tokio::test(start_paused = true)]
async fn drains_questions_in_order_with_countdown_between() {
    notes_logging::initialize_for_tests();
    let page = Arc::new(FakePage::new().replying_after(Duration::from_millis(2_500)));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = BulkDriver::spawn(
        page.clone(),
        fixed_delay_settings(),
        Arc::new(ChannelMessageSink::new(tx)),
    );

    let accepted = handle
        .enqueue(vec!["What is a polity?".into(), "  ".into(), "Define rights.".into()])
        .await
        .unwrap();
    assert_eq!(accepted, 2);

    let statuses = statuses_until_terminal(&mut rx).await;

    assert_eq!(
        statuses[..3],
        [
            BulkStatus::Queued {
                total: 2,
                pending: 2,
                processed: 0,
                added: 2,
            },
            BulkStatus::Started {
                total: 2,
                pending: 2,
                processed: 0,
            },
            BulkStatus::Asking {
                index: 1,
                total: 2,
                pending: 1,
                question: "What is a polity?".into(),
            },
        ]
    );
    assert_eq!(statuses.last(), Some(&BulkStatus::Complete { processed: 2 }));

    let answered: Vec<_> = statuses
        .iter()
        .filter_map(|s| match s {
            BulkStatus::Answered { index, total, pending } => Some((*index, *total, *pending)),
            _ => None,
        })
        .collect();
    assert_eq!(answered, vec![(1, 2, 1), (2, 2, 0)]);

    let countdown: Vec<_> = statuses
        .iter()
        .filter_map(|s| match s {
            BulkStatus::Delay { remaining_ms, .. } => Some(*remaining_ms),
            _ => None,
        })
        .collect();
    assert_eq!(countdown, vec![3_000, 2_000, 1_000, 0]);

    assert_eq!(page.fills(), vec!["What is a polity?", "Define rights."]);
    assert_eq!(
        page.assistant_turns(),
        vec!["Answer to What is a polity?", "Answer to Define rights."]
    );
}

#[tokio::test(start_paused = true)]
async fn waiting_progress_reports_elapsed_time() {
    let page = Arc::new(FakePage::new().replying_after(Duration::from_millis(2_500)));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = BulkDriver::spawn(page, DriverSettings::default(), Arc::new(ChannelMessageSink::new(tx)));

    handle.enqueue(vec!["Only question".into()]).await.unwrap();
    let statuses = statuses_until_terminal(&mut rx).await;

    let waiting: Vec<_> = statuses
        .iter()
        .filter_map(|s| match s {
            BulkStatus::WaitingReply {
                index,
                elapsed_ms,
                timeout_ms,
                ..
            } => Some((*index, *elapsed_ms, *timeout_ms)),
            _ => None,
        })
        .collect();
    assert_eq!(
        waiting,
        vec![(1, 0, 300_000), (1, 1_000, 300_000), (1, 2_000, 300_000), (1, 2_500, 300_000)]
    );
    assert!(!statuses.iter().any(|s| matches!(s, BulkStatus::Delay { .. })));
}

#[tokio::test(start_paused = true)]
async fn batches_sent_mid_run_join_the_same_queue() {
    let page = Arc::new(FakePage::new().replying_after(Duration::from_millis(1_500)));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = BulkDriver::spawn(
        page.clone(),
        fixed_delay_settings(),
        Arc::new(ChannelMessageSink::new(tx)),
    );

    handle.enqueue(vec!["first".into()]).await.unwrap();

    let mut statuses = Vec::new();
    while let Some(notes_core::RuntimeMessage::BulkStatus(status)) = rx.recv().await {
        let asking = matches!(status, BulkStatus::Asking { .. });
        statuses.push(status);
        if asking {
            break;
        }
    }

    let accepted = handle
        .enqueue(vec!["second".into(), "third".into()])
        .await
        .unwrap();
    assert_eq!(accepted, 2);

    statuses.extend(statuses_until_terminal(&mut rx).await);

    assert!(statuses.contains(&BulkStatus::QueuedMore {
        total: 3,
        pending: 2,
        processed: 0,
        added: 2,
    }));
    let starts = statuses
        .iter()
        .filter(|s| matches!(s, BulkStatus::Started { .. }))
        .count();
    assert_eq!(starts, 1);
    for status in &statuses {
        match status {
            BulkStatus::Asking { index, total, pending, .. } => {
                assert_eq!(index + pending, *total)
            }
            BulkStatus::Answered { index, total, pending } => assert_eq!(index + pending, *total),
            _ => {}
        }
    }
    assert_eq!(statuses.last(), Some(&BulkStatus::Complete { processed: 3 }));
    assert_eq!(page.fills(), vec!["first", "second", "third"]);
}

#[tokio::test(start_paused = true)]
async fn missing_composer_aborts_and_resets() {
    notes_logging::initialize_for_tests();
    let page = Arc::new(FakePage::new().without_composer());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = BulkDriver::spawn(
        page.clone(),
        DriverSettings::default(),
        Arc::new(ChannelMessageSink::new(tx)),
    );

    handle.enqueue(vec!["a".into(), "b".into()]).await.unwrap();
    let statuses = statuses_until_terminal(&mut rx).await;
    assert_eq!(
        statuses.last(),
        Some(&BulkStatus::Error {
            error: "Could not find ChatGPT input box.".into()
        })
    );
    assert_eq!(page.clicks(), 0);
    assert!(!statuses.iter().any(|s| matches!(s, BulkStatus::Answered { .. })));
    assert_eq!(statuses.iter().filter(|s| s.is_terminal()).count(), 1);

    handle.enqueue(vec!["c".into()]).await.unwrap();
    let next = statuses_until_terminal(&mut rx).await;
    assert_eq!(
        next[0],
        BulkStatus::Queued {
            total: 1,
            pending: 1,
            processed: 0,
            added: 1,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn missing_send_button_aborts() {
    let page = Arc::new(FakePage::new().without_send_button());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = BulkDriver::spawn(
        page.clone(),
        DriverSettings::default(),
        Arc::new(ChannelMessageSink::new(tx)),
    );

    handle.enqueue(vec!["a".into()]).await.unwrap();
    let statuses = statuses_until_terminal(&mut rx).await;
    assert_eq!(
        statuses.last(),
        Some(&BulkStatus::Error {
            error: "Could not find ChatGPT send button.".into()
        })
    );
    assert_eq!(page.fills(), vec!["a"]);
}

#[tokio::test(start_paused = true)]
async fn silent_page_times_out() {
    let page = Arc::new(FakePage::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let settings = DriverSettings {
        reply_timeout_ms: 3_000,
        ..DriverSettings::default()
    };
    let handle = BulkDriver::spawn(page.clone(), settings, Arc::new(ChannelMessageSink::new(tx)));

    handle.enqueue(vec!["a".into(), "b".into()]).await.unwrap();
    let statuses = statuses_until_terminal(&mut rx).await;

    let (last, rest) = statuses.split_last().unwrap();
    assert_eq!(
        last,
        &BulkStatus::Error {
            error: "Timed out waiting for ChatGPT reply.".into()
        }
    );
    assert!(matches!(
        rest.last(),
        Some(BulkStatus::WaitingReply {
            elapsed_ms: 3_000,
            timeout_ms: 3_000,
            ..
        })
    ));
    assert_eq!(page.clicks(), 1);
}

#[tokio::test]
async fn blank_batches_are_not_queued() {
    let page = Arc::new(FakePage::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = BulkDriver::spawn(page, DriverSettings::default(), Arc::new(ChannelMessageSink::new(tx)));

    assert_eq!(handle.enqueue(vec!["   ".into(), String::new()]).await.unwrap(), 0);
    assert!(rx.try_recv().is_err());
}
