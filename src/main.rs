use clap::Parser;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use simple_reminder::config::Config;
use simple_reminder::domains::reminder::Frequency;
use simple_reminder::error::Result;
use simple_reminder::factories::app_factory::SimpleReminderFactory;
use simple_reminder::interfaces::prompts::{AssumeYes, Confirmation};
use simple_reminder::parser::ReminderParser;
use simple_reminder::summary;
use simple_reminder::ui::{self, TerminalConfirmation};

#[derive(Parser, Debug)]
#[command(name = "simple-reminder")]
#[command(about = "Natural-language reminders from the command line")]
struct Cli {
    #[arg(long, env = "SIMPLE_REMINDER_CONFIG")]
    config: Option<String>,

    #[arg(long, env = "SIMPLE_REMINDER_DB")]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Create a reminder, e.g. `add remind me to call Joe tomorrow at 1pm`
    Add {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Show how a sentence would be read without saving it
    Preview {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    List,
    /// Mark a reminder as recurring; `none` clears it
    Recur {
        id: String,
        frequency: String,
    },
    Url {
        id: String,
        url: String,
    },
    Delete {
        id: String,

        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Fire every reminder that is due
    Check,
    Status,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,simple_reminder=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        ui::print_failure(&err.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let zone = config.zone()?;
    let db = cli.db.as_deref();

    match cli.command {
        Commands::Add { text } => {
            let mut book = SimpleReminderFactory::book(&config, db).await?;
            let parser = ReminderParser::new().with_zone(zone.clone());
            let reminder = book
                .create_from_text(&parser, &text.join(" "), OffsetDateTime::now_utc())
                .await?;
            ui::print_success(&format!(
                "Reminder set for {}",
                ui::format_date(reminder.date, zone.as_ref())
            ));
            println!("{}", ui::reminder_line(&reminder, zone.as_ref()));
        }
        Commands::Preview { text } => {
            let parsed = ReminderParser::new()
                .with_zone(zone.clone())
                .parse(&text.join(" "), OffsetDateTime::now_utc());
            println!("topic: {}", parsed.topic);
            match (parsed.date, parsed.matched) {
                (Some(date), Some(matched)) => {
                    println!("date:  {} (from \"{matched}\")", ui::format_date(date, zone.as_ref()))
                }
                _ => println!("date:  none found"),
            }
        }
        Commands::List => {
            let book = SimpleReminderFactory::book(&config, db).await?;
            ui::print_reminders(book.read_all(), zone.as_ref());
        }
        Commands::Recur { id, frequency } => {
            let frequency = match frequency.trim().to_ascii_lowercase().as_str() {
                "none" | "off" | "once" => None,
                other => Some(other.parse::<Frequency>()?),
            };
            let mut book = SimpleReminderFactory::book(&config, db).await?;
            let id = book.resolve_id(&id)?;
            let reminder = book.update_recurrence(&id, frequency).await?;
            ui::print_success(&match reminder.frequency {
                Some(frequency) => format!("Reminder repeats {frequency}"),
                None => "Reminder no longer repeats".to_string(),
            });
        }
        Commands::Url { id, url } => {
            let mut book = SimpleReminderFactory::book(&config, db).await?;
            let id = book.resolve_id(&id)?;
            book.update_url(&id, &url).await?;
            ui::print_success("Link attached");
        }
        Commands::Delete { id, yes } => {
            let mut book = SimpleReminderFactory::book(&config, db).await?;
            let id = book.resolve_id(&id)?;
            let confirmation: Box<dyn Confirmation> = if yes {
                Box::new(AssumeYes)
            } else {
                Box::new(TerminalConfirmation::new())
            };
            if book.delete(&id, confirmation.as_ref()).await? {
                ui::print_success("Reminder deleted");
            } else {
                println!("Kept the reminder.");
            }
        }
        Commands::Check => {
            let repo = SimpleReminderFactory::repository(&config, db).await?;
            let sweeper = SimpleReminderFactory::sweeper(&config, repo)?;
            let report = sweeper.run(OffsetDateTime::now_utc()).await?;
            ui::print_success(&format!(
                "{} fired, {} waiting",
                report.fired.len(),
                report.kept
            ));
            if !report.failed.is_empty() {
                ui::print_failure(&format!(
                    "{} could not be delivered and will be retried",
                    report.failed.len()
                ));
            }
        }
        Commands::Status => {
            let repo = SimpleReminderFactory::repository(&config, db).await?;
            let summary = summary::load_summary(&repo).await?;
            let last_checked = summary::last_checked(&repo).await?;
            ui::print_status(summary.as_ref(), last_checked.as_deref(), zone.as_ref());
        }
    }
    Ok(())
}
