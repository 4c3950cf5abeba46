mod api;
mod render;
mod store;
mod sync;

use std::path::PathBuf;

use chrono::{Datelike, FixedOffset, Local, SubsecRound, Utc};
use clap::{Args, Parser, Subcommand};
use ledger::period::{local_date, offset_from_minutes};
use ledger::summary::{group_by_day, month_summary};
use ledger::{Category, Expense, ExpenseInput, Period, PeriodError, UpiError, ValidationError};
use serde::Serialize;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::store::{OfflineStore, StoreError};
use crate::sync::SyncReport;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing session token; pass --session-token or set SPEND_SESSION_TOKEN")]
    MissingSessionToken,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid expense: {0}")]
    Invalid(#[from] ValidationError),
    #[error("{0}")]
    Upi(#[from] UpiError),
    #[error("invalid period: {0}")]
    Period(#[from] PeriodError),
    #[error("no expense with id {0}")]
    NotFound(Uuid),
    #[error("could not determine a data directory; pass --store or set SPEND_STORE")]
    NoDataDir,
    #[error("{0} expense(s) failed to sync")]
    SyncIncomplete(usize),
    #[error("refusing to clear without --yes")]
    ConfirmationRequired,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "spend", about = "Daily expense tracker with offline store and server sync")]
struct Cli {
    #[arg(long, global = true, env = "SPEND_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, global = true, env = "SPEND_SESSION_TOKEN")]
    session_token: Option<String>,

    /// Offline store file; defaults to the platform data directory.
    #[arg(long, global = true, env = "SPEND_STORE")]
    store: Option<PathBuf>,

    /// Minutes east of UTC used for day boundaries; defaults to the system zone.
    #[arg(long, global = true, env = "SPEND_TZ_OFFSET_MINUTES", allow_hyphen_values = true)]
    tz_offset: Option<i32>,

    /// Print JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    session_token: Option<String>,
    store_path: PathBuf,
    offset: FixedOffset,
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record an expense in the offline store.
    Add(AddArgs),
    /// All local expenses, newest first.
    List,
    /// Local expenses recorded today.
    Today,
    /// Local expenses grouped by day.
    History,
    /// Monthly summary of local expenses.
    Stats(MonthArgs),
    Delete {
        id: Uuid,
    },
    Clear {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    Categories,
    /// Parse a decoded UPI QR payload; with --amount, print the payment link.
    Scan(ScanArgs),
    /// Push every local expense to the server.
    Sync,
    /// Server-side expenses.
    Remote(RemoteCommand),
    Ping,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    amount: f64,
    #[arg(long, default_value = "food")]
    category: String,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct MonthArgs {
    #[arg(long, requires = "month")]
    year: Option<i32>,
    /// 0-based month index (0 = January).
    #[arg(long, requires = "year")]
    month: Option<u32>,
}

#[derive(Args, Debug)]
struct ScanArgs {
    payload: String,
    #[arg(long)]
    amount: Option<String>,
    #[arg(long)]
    note: Option<String>,
}

#[derive(Args, Debug)]
struct RemoteCommand {
    #[command(subcommand)]
    command: RemoteSubcommand,
}

#[derive(Subcommand, Debug)]
enum RemoteSubcommand {
    All,
    Today,
    Month(MonthArgs),
    Stats(MonthArgs),
    Delete { id: Uuid },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext {
        base_url: cli.base_url,
        session_token: cli.session_token,
        store_path: match cli.store {
            Some(path) => path,
            None => default_store_path()?,
        },
        offset: cli.tz_offset.map_or_else(|| *Local::now().offset(), offset_from_minutes),
        json: cli.json,
    };

    match cli.command {
        Command::Add(args) => run_add(&ctx, args),
        Command::List => run_list(&ctx),
        Command::Today => run_today(&ctx),
        Command::History => run_history(&ctx),
        Command::Stats(args) => run_stats(&ctx, &args),
        Command::Delete { id } => run_delete(&ctx, id),
        Command::Clear { yes } => run_clear(&ctx, yes),
        Command::Categories => run_categories(&ctx),
        Command::Scan(args) => run_scan(&ctx, args),
        Command::Sync => run_sync(&ctx).await,
        Command::Remote(remote) => run_remote(&ctx, remote).await,
        Command::Ping => run_ping(&ctx).await,
    }
}

fn default_store_path() -> Result<PathBuf, CliError> {
    directories::ProjectDirs::from("", "", "spendbook")
        .map(|dirs| dirs.data_dir().join("expenses.json"))
        .ok_or(CliError::NoDataDir)
}

fn open_store(ctx: &CliContext) -> Result<OfflineStore, CliError> {
    let store = OfflineStore::open(&ctx.store_path)?;
    if store.skipped() > 0 {
        eprintln!("warning: skipped {} unreadable record(s) in {}", store.skipped(), store.path().display());
    }
    Ok(store)
}

fn month_period(ctx: &CliContext, args: &MonthArgs) -> Result<Period, CliError> {
    match (args.year, args.month) {
        (Some(year), Some(month)) => Ok(Period::month(year, month, ctx.offset)?),
        _ => Ok(Period::current_month(Utc::now(), ctx.offset)?),
    }
}

fn run_add(ctx: &CliContext, args: AddArgs) -> Result<(), CliError> {
    let input = ExpenseInput {
        category_id: Some(args.category),
        title: Some(args.title),
        description: args.description,
        amount: Some(args.amount),
    };
    let expense = Expense::new(input.validate()?, Utc::now().trunc_subsecs(3));

    let mut store = open_store(ctx)?;
    store.put(expense.clone())?;

    if ctx.json {
        return print_json(&expense);
    }
    println!("{}", render::expense_line(&expense, ctx.offset));
    Ok(())
}

fn run_list(ctx: &CliContext) -> Result<(), CliError> {
    let store = open_store(ctx)?;
    print_expenses(ctx, &store.all())
}

fn run_today(ctx: &CliContext) -> Result<(), CliError> {
    let store = open_store(ctx)?;
    print_expenses(ctx, &store.today(Utc::now(), ctx.offset)?)
}

fn run_history(ctx: &CliContext) -> Result<(), CliError> {
    let store = open_store(ctx)?;
    let groups = group_by_day(&store.all(), ctx.offset);
    if ctx.json {
        return print_json(&groups);
    }
    println!("{}", render::history(&groups, ctx.offset));
    Ok(())
}

fn run_stats(ctx: &CliContext, args: &MonthArgs) -> Result<(), CliError> {
    let period = month_period(ctx, args)?;
    let store = open_store(ctx)?;
    let summary = month_summary(&store.all(), period, Utc::now());
    if ctx.json {
        return print_json(&summary);
    }
    println!("{}", render::month_summary(&summary, ctx.offset));
    Ok(())
}

fn run_delete(ctx: &CliContext, id: Uuid) -> Result<(), CliError> {
    let mut store = open_store(ctx)?;
    let title = store.get(id).map(|e| e.title.clone()).ok_or(CliError::NotFound(id))?;
    store.delete(id)?;
    println!("deleted {id} ({title})");
    Ok(())
}

fn run_clear(ctx: &CliContext, yes: bool) -> Result<(), CliError> {
    if !yes {
        return Err(CliError::ConfirmationRequired);
    }
    let mut store = open_store(ctx)?;
    let count = store.len();
    store.clear()?;
    println!("cleared {count} expense(s)");
    Ok(())
}

fn run_categories(ctx: &CliContext) -> Result<(), CliError> {
    if ctx.json {
        return print_json(&ledger::category::catalog());
    }
    for category in Category::ALL {
        println!("{:<12} {:<20} {}", category.id(), category.name(), category.color());
    }
    Ok(())
}

fn run_scan(ctx: &CliContext, args: ScanArgs) -> Result<(), CliError> {
    let scan = ledger::upi::parse_scan(&args.payload)?;
    let link = match args.amount.as_deref() {
        Some(amount) => Some(ledger::upi::payment_link(&scan.payee, amount, args.note.as_deref())?),
        None => None,
    };

    if ctx.json {
        return print_json(&serde_json::json!({ "scan": scan, "url": link }));
    }
    println!("payee {}", scan.payee);
    if let Some(name) = &scan.payee_name {
        println!("name  {name}");
    }
    if let Some(amount) = &scan.amount {
        println!("amount requested {amount}");
    }
    if let Some(link) = link {
        println!("{link}");
    }
    Ok(())
}

async fn run_sync(ctx: &CliContext) -> Result<(), CliError> {
    let client = ApiClient::new(&ctx.base_url, ctx.session_token.as_deref())?;
    let store = open_store(ctx)?;
    if store.is_empty() {
        println!("nothing to sync");
        return Ok(());
    }

    let mut report = SyncReport::default();
    for expense in store.all() {
        let outcome = client.push(&expense).await;
        report.record(expense.id, outcome)?;
    }
    println!("{}", report.summary());

    if !report.is_complete() {
        return Err(CliError::SyncIncomplete(report.failed.len()));
    }
    Ok(())
}

async fn run_remote(ctx: &CliContext, remote: RemoteCommand) -> Result<(), CliError> {
    let client = ApiClient::new(&ctx.base_url, ctx.session_token.as_deref())?;
    match remote.command {
        RemoteSubcommand::All => print_expenses(ctx, &client.all().await?),
        RemoteSubcommand::Today => print_expenses(ctx, &client.today().await?),
        RemoteSubcommand::Month(args) => {
            let (year, month0) = month_args(ctx, &args);
            print_expenses(ctx, &client.month(year, month0).await?)
        }
        RemoteSubcommand::Stats(args) => {
            let (year, month0) = month_args(ctx, &args);
            let summary = client.stats(year, month0).await?;
            if ctx.json {
                return print_json(&summary);
            }
            println!("{}", render::month_summary(&summary, ctx.offset));
            Ok(())
        }
        RemoteSubcommand::Delete { id } => {
            client.delete(id).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

/// Explicit year/month, or the current local month.
fn month_args(ctx: &CliContext, args: &MonthArgs) -> (i32, u32) {
    match (args.year, args.month) {
        (Some(year), Some(month)) => (year, month),
        _ => {
            let today = local_date(Utc::now(), ctx.offset);
            (today.year(), today.month0())
        }
    }
}

async fn run_ping(ctx: &CliContext) -> Result<(), CliError> {
    let client = reqwest::Client::new();
    let url = format!("{}/healthz", ctx.base_url.trim_end_matches('/'));
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Server { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

fn print_expenses(ctx: &CliContext, expenses: &[Expense]) -> Result<(), CliError> {
    if ctx.json {
        return print_json(&expenses);
    }
    println!("{}", render::expense_list(expenses, ctx.offset));
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
