use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ledgerlens_core::{Categorizer, TransactionCandidate, TransactionStore, TxnType};
use ledgerlens_finance::{
    balance, category_breakdown, expense_by_month_and_category, month_summary, monthly_balance,
    JsonLedger, Month, TransactionFilter,
};
use ledgerlens_ingest::{StatementFormat, StatementParser};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "ledgerlens", version, about = "Personal finance tracker with bank statement import")]
struct Cli {
    /// Debug logging (RUST_LOG takes priority)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Owner whose transactions are read or written (default from config)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Ledger file (default from config, then ~/.ledgerlens/ledger.json)
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a CSV or PDF bank statement
    Import {
        file: PathBuf,

        /// csv or pdf (default: from the file extension)
        #[arg(long)]
        format: Option<String>,
    },

    /// Add one transaction by hand; the category is assigned automatically
    Add {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        description: String,
        #[arg(long = "type")]
        txn_type: TxnType,
    },

    /// List transactions, newest first
    List {
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "type")]
        txn_type: Option<TxnType>,
        #[arg(long, default_value_t = ledgerlens_finance::query::DEFAULT_LIMIT)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Total income, expense and balance
    Balance,

    /// Income, expense and balance per month
    Monthly,

    /// Totals per category for one transaction type
    Breakdown {
        #[arg(long = "type", default_value = "expense")]
        txn_type: TxnType,
    },

    /// Category totals for one month (YYYY-MM)
    MonthSummary {
        #[arg(long)]
        month: Month,
    },

    /// Expense totals per month and category
    ByCategory,

    /// Configuration file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default ~/.ledgerlens/config.toml
    Init,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG > --verbose > info
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let command = match cli.command {
        Command::Config { command } => {
            return match command {
                ConfigCommand::Init => config::init_config(),
                ConfigCommand::Show => print_json(&config::load_config()?),
            };
        }
        other => other,
    };

    let cfg = config::load_config()?;
    let owner = cli.owner.unwrap_or_else(|| cfg.ledger.owner.clone());
    let ledger_path = match cli.ledger {
        Some(p) => p,
        None => cfg.ledger_path()?,
    };
    let mut ledger = JsonLedger::open(&ledger_path)?;

    match command {
        Command::Import { file, format } => {
            let format = match format {
                Some(ext) => StatementFormat::from_extension(&ext)?,
                None => StatementFormat::from_path(&file)?,
            };
            let bytes = std::fs::read(&file).with_context(|| format!("read {}", file.display()))?;

            let parser = StatementParser::new(cfg.categorizer());
            let report = parser
                .import(&bytes, format, &owner, &mut ledger)
                .with_context(|| format!("importing {}", file.display()))?;
            ledger.flush()?;
            print_json(&report)?;
        }

        Command::Add {
            date,
            amount,
            description,
            txn_type,
        } => {
            let candidate = manual_candidate(date, amount, &description, txn_type, &cfg.categorizer())?;
            let outcome = ledger.save(&owner, std::slice::from_ref(&candidate))?;
            ledger.flush()?;

            if outcome.saved == 0 {
                println!("Duplicate transaction, nothing saved");
            } else {
                info!("Added transaction in category {}", candidate.category);
                print_json(&candidate)?;
            }
        }

        Command::List {
            start,
            end,
            category,
            txn_type,
            limit,
            offset,
        } => {
            let filter = TransactionFilter {
                start,
                end,
                category,
                txn_type,
                limit,
                offset,
            };
            print_json(&filter.apply(ledger.for_owner(&owner)))?;
        }

        Command::Balance => print_json(&balance(ledger.for_owner(&owner)))?,

        Command::Monthly => print_json(&monthly_balance(ledger.for_owner(&owner)))?,

        Command::Breakdown { txn_type } => {
            print_json(&category_breakdown(ledger.for_owner(&owner), txn_type))?
        }

        Command::MonthSummary { month } => {
            #[derive(Serialize)]
            struct Out {
                month: String,
                summary: std::collections::BTreeMap<String, f64>,
            }
            print_json(&Out {
                month: month.to_string(),
                summary: month_summary(ledger.for_owner(&owner), month),
            })?
        }

        Command::ByCategory => print_json(&expense_by_month_and_category(ledger.for_owner(&owner)))?,

        Command::Config { .. } => {}
    }

    Ok(())
}

/// Validate a hand-entered transaction and assign its category.
fn manual_candidate(
    date: NaiveDate,
    amount: f64,
    description: &str,
    txn_type: TxnType,
    categorizer: &Categorizer,
) -> Result<TransactionCandidate> {
    let description = description.trim();
    if description.is_empty() {
        bail!("description must not be empty");
    }
    if !amount.is_finite() || amount <= 0.0 {
        bail!("amount must be a finite number greater than zero");
    }

    Ok(TransactionCandidate {
        description: description.to_string(),
        amount,
        timestamp: date,
        txn_type,
        category: categorizer.categorize(description),
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}
