use async_trait::async_trait;
use console::{style, Term};
use time::macros::format_description;
use time::OffsetDateTime;

use crate::domains::reminder::Reminder;
use crate::interfaces::prompts::Confirmation;
use crate::summary::Summary;
use crate::zone::LocalZone;

const DISPLAY_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[weekday repr:short] [year]-[month]-[day] [hour]:[minute]");
const SHORT_ID_LEN: usize = 8;

/// Asks on the terminal; anything but "y" or "yes" declines.
pub struct TerminalConfirmation {
    term: Term,
}

impl Default for TerminalConfirmation {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalConfirmation {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

#[async_trait]
impl Confirmation for TerminalConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        let question = format!("{} {} ", style(prompt).bold(), style("[y/N]").color256(245));
        if self.term.write_str(&question).is_err() {
            return false;
        }
        match self.term.read_line() {
            Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

pub fn format_date(date: OffsetDateTime, zone: &dyn LocalZone) -> String {
    let local = zone.to_local(date);
    local
        .format(DISPLAY_FORMAT)
        .unwrap_or_else(|_| local.to_string())
}

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

pub fn reminder_line(reminder: &Reminder, zone: &dyn LocalZone) -> String {
    let mut line = format!(
        "{}  {}  {}",
        style(short_id(&reminder.id)).color256(245),
        style(format_date(reminder.date, zone)).color256(81),
        reminder.topic
    );
    if let Some(frequency) = reminder.frequency {
        line.push_str(&format!("  {}", style(format!("↻ {frequency}")).color256(214)));
    }
    if let Some(url) = &reminder.url {
        line.push_str(&format!("  {}", style(url).underlined().color256(45)));
    }
    line
}

pub fn print_reminders(reminders: &[Reminder], zone: &dyn LocalZone) {
    if reminders.is_empty() {
        println!("{}", style("No reminders.").color256(245));
        return;
    }
    for reminder in reminders {
        println!("{}", reminder_line(reminder, zone));
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// One-line failure message, the terminal stand-in for a failure toast.
pub fn print_failure(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

pub fn print_status(summary: Option<&Summary>, last_checked: Option<&str>, zone: &dyn LocalZone) {
    let checked = last_checked
        .and_then(|raw| {
            OffsetDateTime::parse(raw, &time::format_description::well_known::Rfc3339).ok()
        })
        .map(|date| format_date(date, zone))
        .unwrap_or_else(|| "never".to_string());
    println!("{} {}", style("Last checked:").bold(), checked);

    match summary {
        Some(summary) => {
            println!("{} {}", style("Pending:").bold(), summary.pending);
            if let (Some(topic), Some(date)) = (&summary.next_topic, summary.next_date) {
                println!(
                    "{} {} ({})",
                    style("Next:").bold(),
                    topic,
                    format_date(date, zone)
                );
            }
        }
        None => println!("{} {}", style("Pending:").bold(), "unknown"),
    }
}
