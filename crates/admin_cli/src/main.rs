use std::{error::Error, io::Write, path::PathBuf};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, Expense, ExpenseInput, Filter, MoneyCents, summarize};
use migration::MigratorTrait;
use report::{ReportError, ReportInput, ReportWarning};
use sea_orm::{Database, DatabaseConnection, DbErr};
use serde_json::json;
use thiserror::Error;

/// Sample records inserted by `seed`.
const SAMPLES: [(f64, &str); 3] = [(50.0, "Food"), (30.0, "Transport"), (100.0, "Bills")];

#[derive(Error, Debug)]
enum AdminError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("aborted")]
    Aborted,
}

#[derive(Parser, Debug)]
#[command(name = "spendline_admin")]
#[command(about = "Admin utilities for Spendline (inspect, seed and export expenses)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./spendline.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored expenses, newest date first.
    List(FilterArgs),
    /// Print per-category counts and totals.
    Stats,
    /// Insert the sample expenses (Food 50, Transport 30, Bills 100).
    Seed,
    /// Delete one expense by id.
    Delete(DeleteArgs),
    /// Render a PDF report to a file.
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Category name or `all`.
    #[arg(long)]
    category: Option<String>,
    /// Zero-based month (0 = January) or `all`.
    #[arg(long)]
    month: Option<String>,
    #[arg(long)]
    year: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> Result<Filter, EngineError> {
        Filter::parse(
            self.category.as_deref(),
            self.month.as_deref(),
            self.year.as_deref(),
        )
    }
}

#[derive(Args, Debug)]
struct DeleteArgs {
    id: String,
    /// Skip the confirmation prompt.
    #[arg(long, short)]
    yes: bool,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    filter: FilterArgs,
    /// PNG or JPEG chart snapshot to embed.
    #[arg(long)]
    chart: Option<PathBuf>,
    #[arg(long, default_value = "expense-report.pdf")]
    out: PathBuf,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, AdminError> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Single-key y/N prompt on stderr.
fn confirm(prompt: &str) -> Result<bool, AdminError> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt),
        Print(" [y/N] ")
    )?;
    out.flush()?;

    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        let answer = match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err(AdminError::Aborted);
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char(_) | KeyCode::Enter | KeyCode::Esc => false,
            _ => continue,
        };
        execute!(out, Print(if answer { "y\r\n" } else { "n\r\n" }))?;
        out.flush()?;
        return Ok(answer);
    }
}

fn print_expense(expense: &Expense) {
    println!(
        "{}  {}  {:<13} {:>12}",
        expense.id,
        expense.date,
        expense.category.as_str(),
        expense.amount.to_string()
    );
}

async fn connect_db(database_url: &str) -> Result<DatabaseConnection, AdminError> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn seed(engine: &Engine) -> Result<Vec<Expense>, AdminError> {
    let now = Utc::now();
    let mut created = Vec::with_capacity(SAMPLES.len());
    for (amount, category) in SAMPLES {
        let input = ExpenseInput {
            amount: Some(json!(amount)),
            category: Some(json!(category)),
            date: None,
        };
        created.push(engine.create_expense(&input, now).await?);
    }
    Ok(created)
}

/// Writes the report and returns its page count and any non-fatal warnings.
async fn write_report(
    engine: &Engine,
    args: &ReportArgs,
) -> Result<(usize, Vec<ReportWarning>), AdminError> {
    let filter = args.filter.to_filter()?;
    let expenses = engine.list_expenses().await?;
    let summary = summarize(&expenses, &filter)?;

    let mut warnings = Vec::new();
    let chart = match &args.chart {
        Some(path) => match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warnings.push(ReportWarning::ChartSkipped(format!(
                    "cannot read {}: {err}",
                    path.display()
                )));
                None
            }
        },
        None => None,
    };
    let output = report::render_pdf(&ReportInput::from_summary(&summary, chart, Utc::now()))?;
    warnings.extend(output.warnings);
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }
    std::fs::write(&args.out, &output.bytes)?;
    Ok((output.pages, warnings))
}

async fn run(cli: Cli) -> Result<(), AdminError> {
    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build()?;

    match cli.command {
        Command::List(args) => {
            let filter = args.to_filter()?;
            let expenses = engine.list_expenses().await?;
            let summary = summarize(&expenses, &filter)?;
            for expense in &summary.expenses {
                print_expense(expense);
            }
            println!("{} expense(s), total {}", summary.expenses.len(), summary.total);
        }
        Command::Stats => {
            let stats = engine.stats().await?;
            println!("total: {}", stats.total);
            for row in stats.by_category {
                println!(
                    "{:<13} {:>5} {:>12}",
                    row.category,
                    row.count,
                    MoneyCents::new(row.total_minor).to_string()
                );
            }
        }
        Command::Seed => {
            let created = seed(&engine).await?;
            println!("added {} sample expense(s)", created.len());
        }
        Command::Delete(args) => {
            if !args.yes && !confirm(&format!("Delete expense {}?", args.id))? {
                return Err(AdminError::Aborted);
            }
            engine.delete_expense(&args.id).await?;
            println!("deleted expense: {}", args.id);
        }
        Command::Report(args) => {
            let (pages, _) = write_report(&engine, &args).await?;
            println!("wrote {} ({pages} page(s))", args.out.display());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    run(cli).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_engine() -> Engine {
        let db = connect_db("sqlite::memory:").await.unwrap();
        Engine::builder().database(db).build().unwrap()
    }

    #[test]
    fn parses_report_command() {
        let cli = Cli::try_parse_from([
            "spendline_admin",
            "--database-url",
            "sqlite::memory:",
            "report",
            "--month",
            "0",
            "--year",
            "2024",
            "--out",
            "jan.pdf",
        ])
        .unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.out, PathBuf::from("jan.pdf"));
        assert!(args.chart.is_none());
        assert!(args.filter.to_filter().is_ok());
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["spendline_admin", "vault"]).is_err());
    }

    #[tokio::test]
    async fn seed_inserts_samples() {
        let engine = memory_engine().await;
        let created = seed(&engine).await.unwrap();
        assert_eq!(created.len(), 3);

        let stats = engine.stats().await.unwrap();
        assert_eq!(stats.total, 3);
        let total: i64 = stats.by_category.iter().map(|row| row.total_minor).sum();
        assert_eq!(total, 18_000);
    }

    #[tokio::test]
    async fn report_is_written_to_disk() {
        let engine = memory_engine().await;
        seed(&engine).await.unwrap();

        let out = std::env::temp_dir().join(format!("spendline-report-{}.pdf", std::process::id()));
        let args = ReportArgs {
            filter: FilterArgs::default(),
            chart: None,
            out: out.clone(),
        };
        let (pages, warnings) = write_report(&engine, &args).await.unwrap();
        assert_eq!(pages, 1);
        assert!(warnings.is_empty());
        assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF"));
        std::fs::remove_file(out).unwrap();
    }

    #[tokio::test]
    async fn unreadable_chart_still_writes_report() {
        let engine = memory_engine().await;
        seed(&engine).await.unwrap();

        let dir = std::env::temp_dir();
        let out = dir.join(format!("spendline-nochart-{}.pdf", std::process::id()));
        let args = ReportArgs {
            filter: FilterArgs::default(),
            chart: Some(dir.join("spendline-missing-chart.png")),
            out: out.clone(),
        };
        let (_, warnings) = write_report(&engine, &args).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ReportWarning::ChartSkipped(_)));
        assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF"));
        std::fs::remove_file(out).unwrap();
    }
}
