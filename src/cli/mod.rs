pub mod costs;
pub mod import;
pub mod init;
pub mod logistics;
pub mod receivables;
pub mod report;
pub mod rules;
pub mod status;
pub mod transactions;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::db::SqliteStorage;
use crate::error::{FinflowError, Result};
use crate::models::{LogisticsKind, MatchType, Scope, TransactionType};
use crate::reports::Period;
use crate::settings::get_data_dir;

pub(crate) fn open_storage() -> Result<SqliteStorage> {
    SqliteStorage::open_in_data_dir(&get_data_dir())
}

/// Accepts exactly `YYYY-MM-DD` or `DD/MM/YYYY`; `None` means today.
pub(crate) fn date_or_today(value: Option<&str>) -> Result<NaiveDate> {
    let Some(raw) = value else {
        return Ok(chrono::Local::now().date_naive());
    };
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| FinflowError::InvalidInput(format!("invalid date: {raw}")))
}

#[derive(Parser)]
#[command(
    name = "finflow",
    version,
    about = "Finance ledger for small audiovisual production companies."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up finflow: choose a data directory and initialize storage.
    Init {
        /// Path for finflow data (default: ~/Documents/finflow)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Name shown in reports
        #[arg(long = "user-name")]
        user_name: Option<String>,
    },
    /// Import a bank statement (CSV or delimited text).
    Import {
        /// Path to the statement file
        file: String,
        /// Scope to tag the imported rows with (default from settings)
        #[arg(long, value_enum)]
        scope: Option<Scope>,
        /// Do not derive Uber logistics records
        #[arg(long = "no-logistics")]
        no_logistics: bool,
    },
    /// Undo the most recent import, or a specific one.
    Undo {
        /// Import batch id (default: the latest)
        #[arg(long)]
        import: Option<String>,
    },
    /// Remove every imported transaction and logistics record.
    ClearImports,
    /// Manage ledger transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Manage logistics (transport and shipping) records.
    Logistics {
        #[command(subcommand)]
        command: LogisticsCommands,
    },
    /// Manage recurring fixed costs.
    Costs {
        #[command(subcommand)]
        command: CostsCommands,
    },
    /// Manage receivables.
    Receivables {
        #[command(subcommand)]
        command: ReceivablesCommands,
    },
    /// Manage categorization rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Filtered transaction report with totals.
    Report {
        #[arg(long, value_enum)]
        scope: Option<Scope>,
        #[arg(long, value_enum, default_value = "all")]
        period: Period,
        /// Reference date for the period (default: today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long = "type", value_enum)]
        txn_type: Option<TransactionType>,
        /// Case-insensitive match on description or category
        #[arg(long)]
        search: Option<String>,
    },
    /// Show storage location and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// List transactions, newest first.
    List {
        #[arg(long, value_enum)]
        scope: Option<Scope>,
        /// Only rows from this import batch
        #[arg(long)]
        import: Option<String>,
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Add a manual transaction.
    Add {
        description: String,
        amount: f64,
        #[arg(long = "type", value_enum)]
        txn_type: TransactionType,
        #[arg(long)]
        category: String,
        /// YYYY-MM-DD or DD/MM/YYYY (default: today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long, value_enum)]
        scope: Option<Scope>,
    },
    /// Remove a transaction by id.
    Remove { id: String },
    /// Remove every transaction, imported or manual.
    Clear,
}

#[derive(Subcommand)]
pub enum LogisticsCommands {
    /// Add a manual Uber or shipping record.
    Add {
        title: String,
        amount: f64,
        #[arg(long = "type", value_enum)]
        kind: LogisticsKind,
        /// YYYY-MM-DD or DD/MM/YYYY (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Path or URL of a receipt
        #[arg(long)]
        attachment: Option<String>,
        /// Record as pending instead of completed
        #[arg(long)]
        pending: bool,
    },
    /// List logistics records with totals.
    List,
    /// Remove a logistics record by id.
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum CostsCommands {
    /// Add a recurring monthly cost.
    Add {
        description: String,
        amount: f64,
        #[arg(long)]
        category: String,
        /// Due day of the month (1-31)
        #[arg(long)]
        day: u32,
        /// First month the cost applies (default: today)
        #[arg(long)]
        start: Option<String>,
        #[arg(long, value_enum)]
        scope: Option<Scope>,
    },
    /// Change fields of an existing cost.
    Edit {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        /// Due day of the month (1-31)
        #[arg(long)]
        day: Option<u32>,
        /// Last month the cost applies
        #[arg(long)]
        end: Option<String>,
    },
    /// List costs and monthly totals.
    List,
    /// Toggle paid/pending; paying books an expense dated today.
    Pay { id: String },
    /// Toggle whether a cost is active.
    Toggle { id: String },
    /// Remove a cost.
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum ReceivablesCommands {
    /// Add a receivable.
    Add {
        /// Client name
        client: String,
        /// Project title
        project: String,
        /// Total value due
        total: f64,
        /// Service date (default: today)
        #[arg(long = "service-date")]
        service_date: Option<String>,
        /// Due date (default: service date)
        #[arg(long = "due")]
        due_date: Option<String>,
        #[arg(long, value_enum)]
        scope: Option<Scope>,
    },
    /// List receivables.
    List,
    /// Record a payment, booked as income dated today.
    Pay { id: String, amount: f64 },
    /// Remove a receivable.
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a categorization rule.
    Add {
        /// Pattern to match against transaction descriptions
        pattern: String,
        /// Category to assign
        #[arg(long)]
        category: String,
        #[arg(long = "match-type", value_enum, default_value = "contains")]
        match_type: MatchType,
        /// Only apply to income or expense rows
        #[arg(long = "applies-to", value_enum)]
        applies_to: Option<TransactionType>,
        /// Rule priority (higher wins)
        #[arg(long, default_value = "0")]
        priority: i64,
    },
    /// List all categorization rules.
    List,
    /// Delete a rule by id.
    Remove { id: String },
}
