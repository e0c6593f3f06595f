pub mod config;
pub mod db;
pub mod domains;
pub mod effects;
pub mod error;
pub mod factories;
pub mod interfaces;
pub mod parser;
pub mod providers;
pub mod reminders;
pub mod services;
pub mod summary;
pub mod sweep;
pub mod ui;
pub mod zone;

pub use crate::config::Config;
pub use crate::domains::reminder::{Frequency, Reminder};
pub use crate::error::{Result, SimpleReminderError};
pub use crate::parser::{ParsedReminder, ReminderParser};
pub use crate::reminders::{ReminderBook, ReminderRepository};
pub use crate::sweep::{SweepReport, Sweeper};
