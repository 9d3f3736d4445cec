use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::application::{
    AppError, CategoryReport, ExpenseFilter, ExpenseService, Period, PeriodTotal,
};
use crate::domain::{
    ExpenseRecord, NewExpense, ValidationError, YearMonth, format_cents, sum, validate_amount,
    validate_date, validate_date_or, validate_date_range, validate_days, validate_month,
};
use crate::io::{Exporter, csv_target, default_renderer};
use crate::storage::LoadOutcome;

/// Spendbook - Personal Expense Tracker
#[derive(Parser)]
#[command(name = "spendbook")]
#[command(about = "A local-first expense tracker that keeps your spending in a JSON file")]
#[command(version)]
pub struct Cli {
    /// Data file path
    #[arg(
        short,
        long,
        global = true,
        env = "SPENDBOOK_FILE",
        default_value = "expenses.json"
    )]
    pub file: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new expense
    Add {
        /// Amount spent (e.g., "12.50" or "12")
        amount: String,

        /// Category name, or its number from `spendbook categories`
        #[arg(short, long)]
        category: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Description of the expense
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List expenses, sorted by date
    List {
        /// Only show this category (exact match)
        #[arg(short, long)]
        category: Option<String>,

        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter to date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Only show this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Calculate spending totals
    #[command(subcommand)]
    Total(TotalCommands),

    /// Show spending by category
    Breakdown {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export all expenses to CSV
    Export {
        /// Output file (defaults to expenses.csv; ".csv" is appended if missing)
        output: Option<String>,
    },

    /// Draw a bar chart of spending by category
    Chart,

    /// List known categories
    Categories,
}

#[derive(Subcommand)]
pub enum TotalCommands {
    /// Total for a month
    Month {
        /// Month (YYYY-MM, defaults to the current month)
        month: Option<String>,
    },

    /// Total for the last 7 days
    Week,

    /// Total for the last N days, today included
    Recent {
        /// Number of days to look back
        #[arg(long, default_value = "7")]
        days: String,
    },

    /// All-time total
    All,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let (mut service, outcome) = ExpenseService::open(&self.file).await;
        report_load_outcome(&self.file, &outcome, self.verbose);

        execute(&mut service, self.command).await
    }
}

/// Run one command, then save anything a failed save left behind, whether or
/// not the command itself succeeded.
pub async fn execute(service: &mut ExpenseService, command: Commands) -> Result<()> {
    let result = run_command(service, command).await;

    if let Err(e) = service.flush().await {
        eprintln!("Error saving data: {}", e);
    }

    result
}

fn report_load_outcome(file: &str, outcome: &LoadOutcome, verbose: bool) {
    match outcome {
        LoadOutcome::Fresh => {
            if verbose {
                eprintln!("Starting with a new expense file: {}", file);
            }
        }
        LoadOutcome::Loaded(count) => {
            if verbose {
                eprintln!("Loaded {} expenses from {}", count, file);
            }
        }
        LoadOutcome::Corrupt(reason) => {
            eprintln!("Could not load {} ({}). Starting fresh.", file, reason);
        }
    }
}

async fn run_command(service: &mut ExpenseService, command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            amount,
            category,
            date,
            description,
        } => run_add_command(service, &amount, &category, date, description).await?,

        Commands::List {
            category,
            from,
            to,
            month,
        } => run_list_command(service, category, from, to, month)?,

        Commands::Total(total_cmd) => run_total_command(service, total_cmd)?,

        Commands::Breakdown { format } => run_breakdown_command(service, &format)?,

        Commands::Export { output } => {
            let path = csv_target(output.as_deref());
            match Exporter::new(service).export_to_file(&path) {
                Ok(count) => println!("Exported {} expenses to {}", count, path.display()),
                Err(AppError::NothingToExport) => println!("No expenses to export."),
                Err(e) => return Err(e).context("Error exporting to CSV"),
            }
        }

        Commands::Chart => run_chart_command(service)?,

        Commands::Categories => {
            let used = service.used_categories();
            for (i, name) in service.categories().iter().enumerate() {
                let marker = if used.contains(name) { "*" } else { " " };
                println!("{:>3}. {} {}", i + 1, marker, name);
            }
        }
    }
    Ok(())
}

async fn run_add_command(
    service: &mut ExpenseService,
    amount: &str,
    category: &str,
    date: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let amount_cents = validate_amount(amount)?;
    let category = service.choose_category(category)?;
    let date = validate_date_or(date.as_deref(), today())?;
    let expense = NewExpense::new(
        amount_cents,
        &category,
        date,
        description.unwrap_or_default(),
    )?;

    let result = service.add_expense(expense).await;
    println!(
        "Added expense: ${} for {} on {}",
        format_cents(result.record.amount_cents),
        result.record.category,
        result.record.date
    );

    if let Some(e) = result.save_error {
        eprintln!("Error saving data: {}", e);
    }
    Ok(())
}

fn run_list_command(
    service: &ExpenseService,
    category: Option<String>,
    from: Option<String>,
    to: Option<String>,
    month: Option<String>,
) -> Result<()> {
    let date_range = list_date_range(from.as_deref(), to.as_deref())?;
    let month = month.map(|m| validate_month(&m)).transpose()?;

    let filter = ExpenseFilter {
        category,
        date_range,
        month,
    };
    let expenses = service.list_expenses(&filter);

    if service.records().is_empty() {
        println!("No expenses recorded yet.");
    } else if expenses.is_empty() {
        println!("No expenses found for the selected criteria.");
    } else {
        print_expense_table(&expenses);
    }
    Ok(())
}

/// Turn optional `--from`/`--to` bounds into an inclusive range. A missing
/// bound leaves that side open.
fn list_date_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Option<(NaiveDate, NaiveDate)>, ValidationError> {
    let range = match (from, to) {
        (Some(from), Some(to)) => Some(validate_date_range(from, to)?),
        (Some(from), None) => Some((validate_date(from)?, NaiveDate::MAX)),
        (None, Some(to)) => Some((NaiveDate::MIN, validate_date(to)?)),
        (None, None) => None,
    };
    Ok(range)
}

fn print_expense_table(expenses: &[&ExpenseRecord]) {
    println!("Found {} expense(s)", expenses.len());
    println!("{}", "-".repeat(70));
    println!("{:<12} {:<15} {:>10}  DESCRIPTION", "DATE", "CATEGORY", "AMOUNT");
    println!("{}", "-".repeat(70));

    for expense in expenses {
        println!(
            "{:<12} {:<15} {:>10}  {}",
            expense.date,
            truncate(&expense.category, 15),
            format_cents(expense.amount_cents),
            truncate(&expense.description, 25)
        );
    }

    println!("{}", "-".repeat(70));
    println!(
        "{:<28} {:>10}",
        "TOTAL",
        format_cents(sum(expenses.iter().copied()))
    );
}

fn run_total_command(service: &ExpenseService, cmd: TotalCommands) -> Result<()> {
    let total = match cmd {
        TotalCommands::Month { month } => {
            let month = match month {
                Some(m) => validate_month(&m)?,
                None => YearMonth::of(today()),
            };
            service.month_total(month)
        }
        TotalCommands::Week => service.recent_total(7, today()),
        TotalCommands::Recent { days } => service.recent_total(validate_days(&days)?, today()),
        TotalCommands::All => service.all_time_total(),
    };

    print_period_total(&total);
    Ok(())
}

fn print_period_total(total: &PeriodTotal) {
    match total.period {
        Period::Month(month) => {
            println!("Total for {}: ${}", month, format_cents(total.total));
            println!("Number of transactions: {}", total.count);
        }
        Period::RecentDays { days, .. } => {
            println!("Total for last {} days: ${}", days, format_cents(total.total));
            println!("Number of transactions: {}", total.count);
        }
        Period::AllTime => {
            println!("All-time total: ${}", format_cents(total.total));
        }
    }
}

fn run_breakdown_command(service: &ExpenseService, format: &str) -> Result<()> {
    let report = service.category_report();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "csv" => {
            Exporter::new(service)
                .export_breakdown_csv(std::io::stdout().lock())
                .context("Failed to write breakdown")?;
        }
        "table" => print_breakdown_table(&report),
        _ => {
            anyhow::bail!("Invalid format '{}'. Valid formats: table, json, csv", format);
        }
    }
    Ok(())
}

fn print_breakdown_table(report: &CategoryReport) {
    if report.is_empty() {
        println!("No expenses to analyze.");
        return;
    }

    println!("Spending by Category");
    println!("{}", "-".repeat(40));
    for cat in &report.categories {
        println!(
            "{:<20} {:>10} ({:>5.1}%)",
            truncate(&cat.category, 20),
            format_cents(cat.total),
            cat.percentage
        );
    }
    println!("{}", "-".repeat(40));
    println!("{:<20} {:>10} (100.0%)", "TOTAL", format_cents(report.total));
}

fn run_chart_command(service: &ExpenseService) -> Result<()> {
    let Some(renderer) = default_renderer() else {
        println!("Charting is not available in this build (enable the `chart` feature).");
        return Ok(());
    };

    let report = service.category_report();
    if report.is_empty() {
        println!("No expenses to visualize.");
        return Ok(());
    }

    let stdout = std::io::stdout();
    renderer
        .render(&report.categories, &mut stdout.lock())
        .context("Failed to draw chart")?;
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer description", 10), "a much ...");
        assert_eq!(truncate("café au lait", 7), "café...");
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "spendbook", "-f", "data.json", "add", "12.50", "-c", "Food", "-d", "lunch",
        ])
        .unwrap();

        assert_eq!(cli.file, "data.json");
        match cli.command {
            Commands::Add {
                amount,
                category,
                date,
                description,
            } => {
                assert_eq!(amount, "12.50");
                assert_eq!(category, "Food");
                assert_eq!(date, None);
                assert_eq!(description.as_deref(), Some("lunch"));
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_file_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["spendbook", "add", "5", "-c", "Food", "-f", "x.json"])
            .unwrap();
        assert_eq!(cli.file, "x.json");
        assert!(matches!(cli.command, Commands::Add { .. }));
    }

    #[test]
    fn test_cli_parses_total_recent() {
        let cli = Cli::try_parse_from(["spendbook", "total", "recent", "--days", "30"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Total(TotalCommands::Recent { ref days }) if days == "30"
        ));

        let cli = Cli::try_parse_from(["spendbook", "total", "recent"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Total(TotalCommands::Recent { ref days }) if days == "7"
        ));
    }

    #[test]
    fn test_list_date_range_open_ends() {
        let jan5 = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        assert_eq!(list_date_range(None, None), Ok(None));
        assert_eq!(
            list_date_range(Some("2024-01-05"), None),
            Ok(Some((jan5, NaiveDate::MAX)))
        );
        assert_eq!(
            list_date_range(None, Some("2024-01-05")),
            Ok(Some((NaiveDate::MIN, jan5)))
        );
        assert!(matches!(
            list_date_range(Some("2024-02-01"), Some("2024-01-05")),
            Err(ValidationError::InvertedRange { .. })
        ));
        assert!(list_date_range(None, Some("soon")).is_err());
    }

    #[tokio::test]
    async fn test_open_ended_ranges_filter_expenses() {
        let temp = tempfile::TempDir::new().unwrap();
        let (mut service, _) = ExpenseService::open(temp.path().join("expenses.json")).await;
        for day in [1, 5, 9] {
            let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            let expense = NewExpense::new(100 * i64::from(day), "Food", date, "").unwrap();
            service.add_expense(expense).await;
        }

        let from = ExpenseFilter {
            date_range: list_date_range(Some("2024-01-05"), None).unwrap(),
            ..Default::default()
        };
        let dates: Vec<&str> = service
            .list_expenses(&from)
            .iter()
            .map(|r| r.date.as_str())
            .collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-09"]);

        let to = ExpenseFilter {
            date_range: list_date_range(None, Some("2024-01-05")).unwrap(),
            ..Default::default()
        };
        let dates: Vec<&str> = service
            .list_expenses(&to)
            .iter()
            .map(|r| r.date.as_str())
            .collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-05"]);
    }

    #[tokio::test]
    async fn test_failed_command_still_retries_save() {
        let temp = tempfile::TempDir::new().unwrap();
        let data_dir = temp.path().join("data");
        let path = data_dir.join("expenses.json");
        let (mut service, _) = ExpenseService::open(&path).await;

        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let expense = NewExpense::new(1250, "Food", date, "lunch").unwrap();
        let result = service.add_expense(expense).await;
        assert!(result.save_error.is_some());
        assert!(!path.exists());

        std::fs::create_dir(&data_dir).unwrap();
        let command = Commands::List {
            category: None,
            from: None,
            to: None,
            month: Some("2024-13".into()),
        };
        assert!(execute(&mut service, command).await.is_err());

        assert!(!service.has_unsaved_changes());
        let (reloaded, outcome) = ExpenseService::open(&path).await;
        assert_eq!(outcome, LoadOutcome::Loaded(1));
        assert_eq!(reloaded.records(), service.records());
    }

    #[test]
    fn test_cli_parses_total_month() {
        let cli = Cli::try_parse_from(["spendbook", "total", "month", "2024-01"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Total(TotalCommands::Month { month: Some(ref m) }) if m == "2024-01"
        ));
    }
}
