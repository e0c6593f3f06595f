//! Turns a free-form sentence such as "remind me to call Joe tomorrow at 1pm"
//! into a topic and a fire time.

mod expressions;

use std::sync::Arc;

use regex::Regex;
use time::OffsetDateTime;

use crate::zone::LocalZone;

pub use expressions::{Expression, ExpressionFinder, DEFAULT_HOUR};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReminder {
    pub topic: String,
    pub date: Option<OffsetDateTime>,
    /// The date phrase that was consumed, as written by the user.
    pub matched: Option<String>,
}

pub struct ReminderParser {
    finder: ExpressionFinder,
    /// Zone for wall-clock phrases; `None` reads them in `now`'s offset.
    zone: Option<Arc<dyn LocalZone>>,
    filler: Regex,
    token: Regex,
    quoted: Regex,
}

impl Default for ReminderParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReminderParser {
    pub fn new() -> Self {
        Self {
            finder: ExpressionFinder::new(),
            zone: None,
            filler: Regex::new(r"(?i)^\s*remind\s+me(?:\s+to)?\b[\s,:]*").unwrap(),
            token: Regex::new(r"\S+").unwrap(),
            quoted: Regex::new(r#""([^"]*)""#).unwrap(),
        }
    }

    pub fn with_zone(mut self, zone: Arc<dyn LocalZone>) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn parse(&self, text: &str, now: OffsetDateTime) -> ParsedReminder {
        let text = self.strip_filler(text);
        let found = match &self.zone {
            Some(zone) => self.finder.find_in(text, now, zone.as_ref()),
            None => self.finder.find(text, now),
        };
        let Some(expression) = found else {
            return ParsedReminder {
                topic: self.normalize_quoted(&collapse(text)),
                date: None,
                matched: None,
            };
        };

        let topic = self.topic_without(text, &expression);
        ParsedReminder {
            topic: self.normalize_quoted(&topic),
            date: Some(expression.date),
            matched: Some(text[expression.start..expression.end].to_string()),
        }
    }

    fn strip_filler<'a>(&self, text: &'a str) -> &'a str {
        match self.filler.find(text) {
            Some(found) => &text[found.end()..],
            None => text.trim_start(),
        }
    }

    /// Keeps every word outside the matched span, in order. A word that only
    /// partly overlaps the span keeps its outside part when that part has any
    /// letters or digits ("(tomorrow)" drops entirely, "5pm-ish" keeps "-ish").
    fn topic_without(&self, text: &str, expression: &Expression) -> String {
        let (start, end) = (expression.start, expression.end);
        let mut words: Vec<&str> = Vec::new();
        for word in self.token.find_iter(text) {
            if word.end() <= start || word.start() >= end {
                words.push(word.as_str());
                continue;
            }
            let before = &text[word.start()..start.max(word.start())];
            let after = &text[end.min(word.end())..word.end()];
            for piece in [before, after] {
                if piece.chars().any(char::is_alphanumeric) {
                    words.push(piece);
                }
            }
        }
        words
            .join(" ")
            .trim_matches(|c: char| c.is_whitespace() || ",;:".contains(c))
            .to_string()
    }

    fn normalize_quoted(&self, topic: &str) -> String {
        self.quoted
            .replace_all(topic, |caps: &regex::Captures| {
                format!("\"{}\"", collapse(&caps[1]))
            })
            .into_owned()
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
