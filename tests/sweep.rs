mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use httpmock::Method::POST;
use httpmock::MockServer;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use simple_reminder::config::{Config, PushConfig, PushSettings};
use simple_reminder::domains::reminder::Frequency;
use simple_reminder::factories::app_factory::SimpleReminderFactory;
use simple_reminder::interfaces::notifications::PushRelay;
use simple_reminder::interfaces::reporting::TracingErrorSink;
use simple_reminder::interfaces::storage::KeyValueStore;
use simple_reminder::reminders::repository::LAST_CHECKED_KEY;
use simple_reminder::services::notifier::NOTIFICATION_TITLE;
use simple_reminder::services::push::NtfyRelay;
use simple_reminder::summary::{last_checked, load_summary};
use simple_reminder::{ReminderRepository, Sweeper};

use common::{harness, seed, FlakyStore, RecordingNotifier};

const NOW: OffsetDateTime = datetime!(2026-10-19 10:30:00 UTC);

#[tokio::test]
async fn due_reminders_fire_once_and_are_removed() {
    let h = harness();
    let overdue = seed(&h.store, "take out the trash", NOW - Duration::hours(1)).await;
    let exactly_now = seed(&h.store, "stand up", NOW).await;
    let future = seed(&h.store, "dentist", NOW + Duration::days(1)).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let sweeper = Sweeper::new(h.repo.clone(), notifier.clone());

    let report = sweeper.run(NOW).await.unwrap();
    assert_eq!(report.fired, vec![overdue.id.clone(), exactly_now.id.clone()]);
    assert_eq!(report.kept, 1);
    assert!(report.failed.is_empty());
    assert_eq!(notifier.bodies(), ["take out the trash", "stand up"]);
    assert!(notifier
        .sent
        .lock()
        .unwrap()
        .iter()
        .all(|(title, _)| title == NOTIFICATION_TITLE));

    let remaining = h.repo.load_all().await.unwrap().reminders;
    assert_eq!(remaining, vec![future]);

    let again = sweeper.run(NOW + Duration::minutes(1)).await.unwrap();
    assert!(again.fired.is_empty());
    assert_eq!(notifier.bodies().len(), 2);
}

#[tokio::test]
async fn recurring_reminders_are_removed_after_firing() {
    let h = harness();
    let mut weekly = seed(&h.store, "team sync", NOW - Duration::minutes(5)).await;
    weekly.frequency = Some(Frequency::Weekly);
    h.repo.save(&weekly).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let report = Sweeper::new(h.repo.clone(), notifier.clone())
        .run(NOW)
        .await
        .unwrap();

    assert_eq!(report.fired, vec![weekly.id.clone()]);
    assert_eq!(h.repo.load(&weekly.id).await.unwrap(), None);
}

#[tokio::test]
async fn failed_notifications_keep_the_reminder() {
    let h = harness();
    let stuck = seed(&h.store, "call the bank", NOW - Duration::minutes(10)).await;
    let delivered = seed(&h.store, "feed the cat", NOW - Duration::minutes(5)).await;

    let notifier = Arc::new(RecordingNotifier::failing_on("bank"));
    let report = Sweeper::new(h.repo.clone(), notifier.clone())
        .run(NOW)
        .await
        .unwrap();

    assert_eq!(report.fired, vec![delivered.id]);
    assert_eq!(report.failed, vec![stuck.id.clone()]);
    assert_eq!(report.kept, 0);
    assert_eq!(h.repo.load_all().await.unwrap().reminders, vec![stuck]);

    let summary = load_summary(&h.repo).await.unwrap().unwrap();
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.next_topic.as_deref(), Some("call the bank"));
}

#[tokio::test]
async fn failed_removal_skips_the_notification() {
    let store = Arc::new(FlakyStore::default());
    let repo = ReminderRepository::new(store.clone(), Arc::new(TracingErrorSink));
    let due = seed(&store.inner, "pay the invoice", NOW - Duration::minutes(1)).await;
    store.fail_removes.store(true, Ordering::SeqCst);

    let notifier = Arc::new(RecordingNotifier::default());
    let sweeper = Sweeper::new(repo.clone(), notifier.clone());

    let report = sweeper.run(NOW).await.unwrap();
    assert!(report.fired.is_empty());
    assert_eq!(report.failed, vec![due.id.clone()]);
    assert!(notifier.bodies().is_empty());
    assert_eq!(repo.load_all().await.unwrap().reminders, vec![due.clone()]);

    store.fail_removes.store(false, Ordering::SeqCst);
    let report = sweeper.run(NOW).await.unwrap();
    assert_eq!(report.fired, vec![due.id]);
    assert_eq!(notifier.bodies(), ["pay the invoice"]);

    sweeper.run(NOW).await.unwrap();
    assert_eq!(notifier.bodies().len(), 1);
}

#[tokio::test]
async fn sweep_records_last_checked_and_summary() {
    let h = harness();
    let next = seed(&h.store, "water the garden", NOW + Duration::hours(2)).await;
    seed(&h.store, "book flights", NOW + Duration::days(3)).await;
    h.store.set("garbage", "[1, 2").await.unwrap();

    let report = Sweeper::new(h.repo.clone(), Arc::new(RecordingNotifier::default()))
        .run(NOW)
        .await
        .unwrap();
    assert!(report.fired.is_empty());
    assert_eq!(report.kept, 2);
    assert_eq!(report.quarantined, 1);

    assert_eq!(
        last_checked(&h.repo).await.unwrap().as_deref(),
        Some("2026-10-19T10:30:00Z")
    );
    assert!(h.store.get(LAST_CHECKED_KEY).await.unwrap().is_some());

    let summary = load_summary(&h.repo).await.unwrap().unwrap();
    assert_eq!(summary.pending, 2);
    assert_eq!(summary.next_topic, Some(next.topic));
    assert_eq!(summary.next_date, Some(next.date));
    assert_eq!(summary.refreshed_at, NOW);
}

#[tokio::test]
async fn notification_text_is_sanitized() {
    let h = harness();
    seed(&h.store, "say \"hi\"\nto   Sam", NOW - Duration::seconds(1)).await;

    let notifier = Arc::new(RecordingNotifier::default());
    Sweeper::new(h.repo.clone(), notifier.clone())
        .run(NOW)
        .await
        .unwrap();

    assert_eq!(notifier.bodies(), [r#"say \"hi\" to Sam"#]);
}

#[tokio::test]
async fn ntfy_relay_posts_the_topic() {
    let server = MockServer::start_async().await;
    let push_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/kids-phone")
                .header("Title", NOTIFICATION_TITLE)
                .body("pick up the kids");
            then.status(200).body("{}");
        })
        .await;

    let relay = NtfyRelay::new(&PushSettings {
        base_url: format!("{}/", server.base_url()),
        topic: "kids-phone".to_string(),
    })
    .unwrap();
    assert_eq!(relay.endpoint(), format!("{}/kids-phone", server.base_url()));

    relay.push("pick up the kids").await.unwrap();
    push_mock.assert_hits_async(1).await;
}

#[test]
fn ntfy_topics_are_url_encoded() {
    let relay = NtfyRelay::new(&PushSettings {
        base_url: "https://ntfy.example".to_string(),
        topic: "my phone/alerts".to_string(),
    })
    .unwrap();
    assert_eq!(relay.endpoint(), "https://ntfy.example/my%20phone%2Falerts");
}

#[tokio::test]
async fn ntfy_relay_reports_error_statuses() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/reminders");
            then.status(503);
        })
        .await;

    let relay = NtfyRelay::new(&PushSettings {
        base_url: server.base_url(),
        topic: "reminders".to_string(),
    })
    .unwrap();
    assert!(relay.push("anything").await.is_err());
}

#[tokio::test]
async fn sweep_relays_fired_reminders_when_push_is_enabled() {
    let server = MockServer::start_async().await;
    let push_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/reminders").body("stretch");
            then.status(200);
        })
        .await;

    let config = Config {
        push: Some(PushConfig {
            enabled: Some(true),
            topic: Some("reminders".to_string()),
            base_url: Some(server.base_url()),
        }),
        ..Config::default()
    };

    let h = harness();
    seed(&h.store, "stretch", NOW - Duration::minutes(1)).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let sweeper =
        SimpleReminderFactory::sweeper_with_notifier(&config, h.repo.clone(), notifier.clone())
            .unwrap();

    let report = sweeper.run(NOW).await.unwrap();
    assert_eq!(report.fired.len(), 1);
    assert_eq!(notifier.bodies(), ["stretch"]);
    push_mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn relay_failure_does_not_block_the_sweep() {
    let server = MockServer::start_async().await;
    let push_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/reminders");
            then.status(500);
        })
        .await;

    let h = harness();
    let due = seed(&h.store, "lock the door", NOW - Duration::minutes(1)).await;
    let relay = NtfyRelay::new(&PushSettings {
        base_url: server.base_url(),
        topic: "reminders".to_string(),
    })
    .unwrap();
    let sweeper = Sweeper::new(h.repo.clone(), Arc::new(RecordingNotifier::default()))
        .with_relay(Arc::new(relay));

    let report = sweeper.run(NOW).await.unwrap();
    assert_eq!(report.fired, vec![due.id]);
    assert!(h.repo.load_all().await.unwrap().reminders.is_empty());
    push_mock.assert_hits_async(1).await;
}
