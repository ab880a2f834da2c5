use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use penny_core::{FinancialContext, NewTransaction, TransactionType, TxSource};
use penny_store::{Store, User};

mod config;

#[derive(Parser, Debug)]
#[command(name = "penny", version, about = "Personal finance assistant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Config management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// User management
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Record a transaction manually
    Add {
        #[arg(long)]
        user: String,

        /// Transaction date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        description: String,

        /// Amount; stored as a magnitude, sign comes from --kind
        #[arg(long)]
        amount: f64,

        #[arg(long, default_value = "Uncategorized")]
        category: String,

        /// income | expense | investment
        #[arg(long, default_value = "expense")]
        kind: String,
    },

    /// List recent transactions
    List {
        #[arg(long)]
        user: String,

        #[arg(long, default_value_t = 100)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Monthly or yearly totals
    Summary {
        #[command(subcommand)]
        command: SummaryCommand,
    },

    /// Import a bank-statement PDF: extract, sanitize, parse, store
    Import {
        #[arg(long)]
        user: String,

        /// Path to the statement (must end in .pdf)
        file: PathBuf,
    },

    /// Ask the assistant a question about your finances
    Chat {
        #[arg(long)]
        user: String,

        message: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default ~/.penny/config.toml
    Init,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create { name: String },
    /// Delete a user and all their transactions
    Delete { name: String },
    List,
}

#[derive(Subcommand, Debug)]
enum SummaryCommand {
    Month {
        #[arg(long)]
        user: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },
    Year {
        #[arg(long)]
        user: String,
        #[arg(long)]
        year: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
        },

        Command::User { command } => {
            let store = open_store(&cfg)?;
            match command {
                UserCommand::Create { name } => {
                    let u = store.create_user(&name)?;
                    println!("Created user '{}' (id {})", u.name, u.id);
                }
                UserCommand::Delete { name } => {
                    store.delete_user(&name)?;
                    println!("Deleted user '{name}' and their transactions");
                }
                UserCommand::List => {
                    for u in store.list_users()? {
                        println!("{}  {}", u.id, u.name);
                    }
                }
            }
        }

        Command::Add {
            user,
            date,
            description,
            amount,
            category,
            kind,
        } => {
            let store = open_store(&cfg)?;
            let user = require_user(&store, &user)?;

            let kind = TransactionType::parse(&kind)
                .with_context(|| format!("unknown kind {kind:?} (income|expense|investment)"))?;
            let date = match date {
                Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .with_context(|| format!("parsing date {d:?} (expected YYYY-MM-DD)"))?
                    .and_hms_opt(0, 0, 0)
                    .context("building timestamp")?,
                None => Local::now().naive_local(),
            };

            let tx = NewTransaction {
                date,
                description,
                amount,
                category,
                kind,
                source: TxSource::Manual,
            }
            .with_abs_amount();

            let created = store.insert_transaction(user.id, &tx)?;
            println!(
                "Recorded {} ${:.2} '{}' on {}",
                created.kind.as_str(),
                created.amount,
                created.description,
                created.date.date()
            );
        }

        Command::List {
            user,
            limit,
            offset,
        } => {
            let store = open_store(&cfg)?;
            let user = require_user(&store, &user)?;
            for t in store.list_transactions(user.id, limit, offset)? {
                println!(
                    "{}  {:<11} ${:>10.2}  {:<20} {} [{}]",
                    t.date.date(),
                    t.kind.as_str(),
                    t.amount,
                    t.category,
                    t.description,
                    t.source.as_str()
                );
            }
        }

        Command::Summary { command } => {
            let store = open_store(&cfg)?;
            match command {
                SummaryCommand::Month { user, year, month } => {
                    if !(1..=12).contains(&month) {
                        bail!("month must be 1-12, got {month}");
                    }
                    let user = require_user(&store, &user)?;
                    let txns = store.transactions_for_month(user.id, year, month)?;
                    let s = penny_core::summarize(&txns);
                    println!("Summary for {year}-{month:02}\n");
                    print_summary(&s);
                }
                SummaryCommand::Year { user, year } => {
                    let user = require_user(&store, &user)?;
                    let txns = store.transactions_for_year(user.id, year)?;
                    let y = penny_core::yearly_summary(&txns);
                    println!("Summary for {year}\n");
                    for (month, m) in &y.monthly {
                        println!(
                            "{year}-{month:02}  income ${:>10.2}  expense ${:>10.2}  investment ${:>10.2}",
                            m.income, m.expense, m.investment
                        );
                    }
                    println!();
                    print_summary(&y.totals);
                }
            }
        }

        Command::Import { user, file } => {
            import_statement(&cfg, &user, &file).await?;
        }

        Command::Chat { user, message } => {
            let store = open_store(&cfg)?;
            let user = require_user(&store, &user)?;
            let transactions = store.all_transactions(user.id)?;
            let context = FinancialContext::from_transactions(&transactions);

            let client = build_client(&cfg)?;
            let reply = penny_llm::respond(
                &client,
                &context,
                &message,
                Local::now().date_naive(),
            )
            .await?;
            println!("{reply}");
        }
    }

    Ok(())
}

fn print_summary(s: &penny_core::Summary) {
    println!("Income:      ${:.2}", s.total_income);
    println!("Expenses:    ${:.2}", s.total_expense);
    println!("Investments: ${:.2}", s.total_investment);
    println!("Net savings: ${:.2}", s.net_savings);
    if !s.expense_by_category.is_empty() {
        println!("\nExpenses by category:");
        for (category, amount) in &s.expense_by_category {
            println!("  {category}: ${amount:.2}");
        }
    }
}

fn open_store(cfg: &config::Config) -> Result<Store> {
    Store::open(&cfg.db_path()?)
}

fn require_user(store: &Store, name: &str) -> Result<User> {
    store
        .find_user(name)?
        .with_context(|| format!("no such user: {name} (run: penny user create {name})"))
}

fn build_client(cfg: &config::Config) -> Result<penny_llm::Client> {
    Ok(penny_llm::Client::new(cfg.llm_config()?, cfg.api_key()?))
}

/// The PDF upload pipeline: extract text, sanitize, ask the model for
/// transactions, normalize, then commit the batch atomically.
async fn import_statement(cfg: &config::Config, user: &str, file: &Path) -> Result<()> {
    if !file
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".pdf"))
    {
        bail!("only PDF files are allowed: {}", file.display());
    }

    let mut store = open_store(cfg)?;
    let user = require_user(&store, user)?;

    let text = penny_ingest::extract_pdf_text(file)?;
    let sanitized = penny_sanitize::sanitize(&text)?;
    log::debug!(
        "sanitized statement text: {} -> {} bytes, {} substrings masked",
        sanitized.original_len,
        sanitized.masked_len,
        sanitized.mappings.len()
    );

    let client = build_client(cfg)?;
    let records = penny_llm::extract_transactions(&client, &sanitized.text).await;
    if records.is_empty() {
        println!("No transactions found in {}", file.display());
        return Ok(());
    }

    let report = penny_ingest::normalize_batch(&records, Local::now().naive_local());
    let created = store
        .insert_batch(user.id, &report.accepted())
        .context("storing imported transactions")?;

    println!(
        "Imported {} transactions from {} ({} skipped)\n",
        created.len(),
        file.display(),
        report.skipped_count()
    );
    for t in &created {
        println!(
            "{}  {:<11} ${:>10.2}  {:<20} {}",
            t.date.date(),
            t.kind.as_str(),
            t.amount,
            t.category,
            t.description
        );
    }
    for (index, reason) in report.skipped() {
        println!("skipped record {index}: {reason}");
    }

    Ok(())
}
