mod common;

use time::macros::datetime;
use time::OffsetDateTime;

use simple_reminder::error::SimpleReminderError;
use simple_reminder::parser::ReminderParser;
use simple_reminder::reminders::ReminderBook;

use common::harness;

// Monday.
const NOW: OffsetDateTime = datetime!(2026-10-19 10:30:00 +2);

const TOPICS: [&str; 5] = [
    "call Joe",
    "buy 2 lamps for the hallway",
    r#"send the "Q3 numbers" to finance"#,
    "renew the car insurance",
    "email Priya about the offsite",
];

fn phrases() -> Vec<(&'static str, OffsetDateTime)> {
    vec![
        ("tomorrow at 1pm", datetime!(2026-10-20 13:00:00 +2)),
        ("in 45 minutes", datetime!(2026-10-19 11:15:00 +2)),
        ("in 3 days", datetime!(2026-10-22 10:30:00 +2)),
        ("2 hours from now", datetime!(2026-10-19 12:30:00 +2)),
        ("on friday at 9:30am", datetime!(2026-10-23 09:30:00 +2)),
        ("on thursday", datetime!(2026-10-22 09:00:00 +2)),
        ("tonight", datetime!(2026-10-19 20:00:00 +2)),
        ("tonight at 9", datetime!(2026-10-19 21:00:00 +2)),
        ("tonight at 11", datetime!(2026-10-19 23:00:00 +2)),
        ("tonight at 8:30", datetime!(2026-10-19 20:30:00 +2)),
        ("today at 9", datetime!(2026-10-19 21:00:00 +2)),
        ("today at 11", datetime!(2026-10-19 11:00:00 +2)),
        ("at 3pm", datetime!(2026-10-19 15:00:00 +2)),
        ("at 18:45", datetime!(2026-10-19 18:45:00 +2)),
        ("on 2026-12-24 at 18:00", datetime!(2026-12-24 18:00:00 +2)),
        ("on december 25 at 8am", datetime!(2026-12-25 08:00:00 +2)),
        ("on the 3rd of march", datetime!(2027-03-03 09:00:00 +2)),
        ("the day after tomorrow at noon", datetime!(2026-10-21 12:00:00 +2)),
    ]
}

#[test]
fn topic_and_date_survive_every_phrase() {
    let parser = ReminderParser::new();
    for topic in TOPICS {
        for (phrase, expected) in phrases() {
            let text = format!("remind me to {topic} {phrase}");
            let parsed = parser.parse(&text, NOW);
            assert_eq!(parsed.topic, topic, "topic for {text:?}");
            assert_eq!(parsed.date, Some(expected), "date for {text:?}");
            assert!(parsed.date.unwrap() > NOW, "{text:?} is not in the future");
        }
    }
}

#[test]
fn leading_phrases_leave_the_topic_intact() {
    let parser = ReminderParser::new();
    for topic in TOPICS {
        for (phrase, expected) in phrases() {
            let text = format!("remind me {phrase} to {topic}");
            let parsed = parser.parse(&text, NOW);
            assert_eq!(parsed.topic, format!("to {topic}"), "topic for {text:?}");
            assert_eq!(parsed.date, Some(expected), "date for {text:?}");
        }
    }
}

#[test]
fn extra_whitespace_is_ignored() {
    let parser = ReminderParser::new();
    let parsed = parser.parse("  remind   me to   call   Joe    tomorrow at 1pm  ", NOW);
    assert_eq!(parsed.topic, "call Joe");
    assert_eq!(parsed.date, Some(datetime!(2026-10-20 13:00:00 +2)));
}

#[tokio::test]
async fn text_without_a_date_is_never_stored() {
    let parser = ReminderParser::new();
    let h = harness();
    let mut book = ReminderBook::open(h.repo.clone()).await.unwrap();

    for text in [
        "remind me to buy milk",
        "read chapter 12",
        "meet Sam at the cafe",
        "remind me to fix the 4 broken chairs",
    ] {
        let parsed = parser.parse(text, NOW);
        assert_eq!(parsed.date, None, "{text:?} should not have a date");
        assert!(!parsed.topic.is_empty());

        let err = book.create_from_text(&parser, text, NOW).await.unwrap_err();
        assert!(matches!(err, SimpleReminderError::Validation(_)));
    }
    assert!(book.read_all().is_empty());
    assert!(h.store.is_empty().await);
}
