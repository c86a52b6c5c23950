use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use finorg_client::{ApiClient, TracingObserver};
use finorg_core::{
    Card, Ledger, RecurrenceStatus, RecurringTransaction, TimeRange, Transaction, find_by_id,
    schedule, spending_view, summarize,
    time::{now_in_zone, today_in_zone, zone},
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod records;
mod render;
mod state;

use config::Config;
use records::{CardsCommand, NewRecurring, RecurringChanges, TransactionsCommand};
use render::Breakdown;

#[derive(Parser, Debug)]
#[command(
    name = "finorg",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FINORG_BUILD_SHA"), ")"),
    about = "Personal finance tracker client"
)]
struct Cli {
    /// Read records from a JSON snapshot instead of the API
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ~/.finorg/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Log in and store the access token
    Login {
        #[arg(long)]
        email: String,
    },

    /// Forget the stored access token
    Logout,

    /// Counts, totals and the most recent transactions
    Dashboard,

    /// Purchase totals for a time range, by category or by month
    Spending {
        /// month, quarter or year (anything else means month)
        #[arg(long)]
        range: Option<String>,

        #[arg(long, value_enum, default_value_t = Breakdown::Category)]
        by: Breakdown,

        /// Write the chart series as CSV to stdout
        #[arg(long)]
        csv: bool,
    },

    /// Cards and linked bank accounts
    Cards {
        #[command(subcommand)]
        command: CardsCommand,
    },

    /// Browse, inspect, add and remove transactions
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommand,
    },

    /// Recurring transactions and their due status
    Recurring {
        #[command(subcommand)]
        command: RecurringCommand,
    },

    /// Fetch everything from the API and write it as a snapshot file
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum RecurringCommand {
    /// List templates with frequency, next date and status
    List {
        /// Only show overdue and due-soon items
        #[arg(long)]
        due: bool,
    },
    /// Ask the backend to generate the due occurrence now
    Process { id: i64 },
    /// Create a recurring template
    Add(NewRecurring),
    /// Change fields of an existing template
    Edit {
        id: i64,
        #[command(flatten)]
        changes: RecurringChanges,
    },
    /// Delete a template
    Rm { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Login { email } => {
            let cfg = config::load_config()?;
            let mut client = api_client(&cfg)?;
            auth::login(&mut client, &email).await?;
        }

        Command::Logout => auth::logout()?,

        Command::Dashboard => {
            let cfg = config::load_config()?;
            let ledger = load_ledger(&cfg, cli.snapshot.as_ref()).await?;
            let summary = summarize(&ledger.transactions, &ledger.cards);
            render::dashboard(&mut io::stdout().lock(), &summary, &ledger.cards)?;
        }

        Command::Spending { range, by, csv } => {
            let cfg = config::load_config()?;
            let range = range
                .as_deref()
                .map(TimeRange::from)
                .unwrap_or(cfg.display.default_range);
            let now = now_in_zone(Utc::now(), &cfg.display.timezone)?;
            let ledger = load_ledger(&cfg, cli.snapshot.as_ref()).await?;
            let view = spending_view(&ledger.transactions, now, range);

            if csv {
                render::spending_csv(io::stdout().lock(), &view, by)?;
            } else {
                render::spending(&mut io::stdout().lock(), &view, by)?;
            }
        }

        Command::Recurring { command } => match command {
            RecurringCommand::List { due } => {
                let cfg = config::load_config()?;
                let today = today_in_zone(Utc::now(), &cfg.display.timezone)?;
                let recurring = match cli.snapshot.as_ref() {
                    Some(path) => load_ledger(&cfg, Some(path)).await?.recurring,
                    None => api_client(&cfg)?.list::<RecurringTransaction>().await?,
                };
                let mut rows = schedule(&recurring, today);
                if due {
                    rows.retain(|r| r.status != RecurrenceStatus::Scheduled);
                }
                render::schedule(&mut io::stdout().lock(), &rows)?;
            }
            RecurringCommand::Process { id } => {
                let cfg = config::load_config()?;
                let client = writable_client(&cfg, cli.snapshot.as_ref())?;
                let updated: RecurringTransaction = client.process_recurring(id).await?;
                println!(
                    "Processed #{} ({}); next occurrence {}",
                    updated.id,
                    updated.description.as_deref().unwrap_or("no description"),
                    updated.next_date
                );
            }
            RecurringCommand::Add(new) => {
                let cfg = config::load_config()?;
                let client = writable_client(&cfg, cli.snapshot.as_ref())?;
                records::add_recurring(&client, new).await?;
            }
            RecurringCommand::Edit { id, changes } => {
                let cfg = config::load_config()?;
                let client = writable_client(&cfg, cli.snapshot.as_ref())?;
                records::edit_recurring(&client, id, changes).await?;
            }
            RecurringCommand::Rm { id } => {
                let cfg = config::load_config()?;
                let client = writable_client(&cfg, cli.snapshot.as_ref())?;
                records::remove::<RecurringTransaction>(&client, id).await?;
            }
        },

        Command::Cards { command } => {
            let cfg = config::load_config()?;
            match command {
                CardsCommand::List => {
                    let cards = match cli.snapshot.as_ref() {
                        Some(path) => load_ledger(&cfg, Some(path)).await?.cards,
                        None => api_client(&cfg)?.list::<Card>().await?,
                    };
                    render::cards(&mut io::stdout().lock(), &cards)?;
                }
                CardsCommand::Add(new) => {
                    let client = writable_client(&cfg, cli.snapshot.as_ref())?;
                    records::add_card(&client, new).await?;
                }
                CardsCommand::Rm { id } => {
                    let client = writable_client(&cfg, cli.snapshot.as_ref())?;
                    records::remove::<Card>(&client, id).await?;
                }
            }
        }

        Command::Transactions { command } => {
            let cfg = config::load_config()?;
            match command {
                TransactionsCommand::List { card, limit } => {
                    let ledger = load_ledger(&cfg, cli.snapshot.as_ref()).await?;
                    let picked = records::latest(&ledger.transactions, card, limit);
                    render::transactions(&mut io::stdout().lock(), &picked, &ledger.cards)?;
                }
                TransactionsCommand::Show { id } => {
                    let ledger = load_ledger(&cfg, cli.snapshot.as_ref()).await?;
                    let Some(t) = find_by_id(&ledger.transactions, id) else {
                        bail!("no transaction #{id}");
                    };
                    render::transaction_detail(&mut io::stdout().lock(), t, &ledger.cards)?;
                }
                TransactionsCommand::Add(new) => {
                    let now = now_in_zone(Utc::now(), &cfg.display.timezone)?;
                    let client = writable_client(&cfg, cli.snapshot.as_ref())?;
                    records::add_transaction(&client, new, now).await?;
                }
                TransactionsCommand::Rm { id } => {
                    let client = writable_client(&cfg, cli.snapshot.as_ref())?;
                    records::remove::<Transaction>(&client, id).await?;
                }
            }
        }

        Command::Export { out } => {
            let cfg = config::load_config()?;
            let ledger = api_client(&cfg)?.fetch_ledger().await?;
            state::write_snapshot(&out, &ledger)?;
            println!(
                "Wrote {} transactions, {} cards, {} recurring to {}",
                ledger.transactions.len(),
                ledger.cards.len(),
                ledger.recurring.len(),
                out.display()
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FINORG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn api_client(cfg: &Config) -> Result<ApiClient> {
    let http = reqwest_client(cfg)?;
    let mut client = ApiClient::new(cfg.api.base_url.clone())
        .with_http_client(http)
        .with_observer(Arc::new(TracingObserver));
    let session = auth::load_session()?;
    match session.token_for(&cfg.api.base_url) {
        Some(token) => client = client.with_token(token),
        None if session.access_token.is_some() => {
            tracing::warn!(base_url = %cfg.api.base_url, "stored token belongs to another API; sending none");
        }
        None => {}
    }
    Ok(client)
}

/// Mutations always go to the API; a snapshot file is read-only.
fn writable_client(cfg: &Config, snapshot: Option<&PathBuf>) -> Result<ApiClient> {
    if snapshot.is_some() {
        bail!("--snapshot is read-only; this command needs the API");
    }
    api_client(cfg)
}

fn reqwest_client(cfg: &Config) -> Result<finorg_client::reqwest::Client> {
    finorg_client::reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.api.timeout_secs))
        .build()
        .context("build http client")
}

/// Records for the views, with transaction times moved into the display zone.
async fn load_ledger(cfg: &Config, snapshot: Option<&PathBuf>) -> Result<Ledger> {
    let mut ledger = match snapshot {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading snapshot");
            state::read_snapshot(path)?
        }
        None => api_client(cfg)?.fetch_ledger().await?,
    };
    ledger.localize(&zone(&cfg.display.timezone)?);
    Ok(ledger)
}
