use simple_reminder::config::Config;
use simple_reminder::error::Result;
use simple_reminder::factories::app_factory::SimpleReminderFactory;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

/// Background entry point: one sweep, no arguments. Meant to be run by cron,
/// launchd or a systemd timer. `SIMPLE_REMINDER_CONFIG` and
/// `SIMPLE_REMINDER_DB` are honoured when set.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,simple_reminder=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = std::env::var("SIMPLE_REMINDER_CONFIG").ok();
    let db_override = std::env::var("SIMPLE_REMINDER_DB").ok();
    let config = Config::load(config_path.as_deref())?;

    let repo = SimpleReminderFactory::repository(&config, db_override.as_deref()).await?;
    let sweeper = SimpleReminderFactory::sweeper(&config, repo)?;
    sweeper.run(OffsetDateTime::now_utc()).await?;
    Ok(())
}
