use chrono::{NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Business,
    Personal,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Personal => "personal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub description: String,
    /// Always the magnitude; direction lives in `txn_type`.
    pub amount: f64,
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_id: Option<String>,
    #[serde(default)]
    pub scope: Scope,
}

impl Transaction {
    pub fn is_imported(&self) -> bool {
        self.import_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogisticsKind {
    Uber,
    Shipping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogisticsStatus {
    Completed,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LogisticsKind,
    pub title: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub status: LogisticsStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostStatus {
    Paid,
    Pending,
}

/// A recurring fixed cost, due every month on `day_of_month`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cost {
    pub id: String,
    pub description: String,
    pub category: String,
    pub amount: f64,
    pub day_of_month: u32,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub active: bool,
    pub status: CostStatus,
    #[serde(default)]
    pub scope: Scope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceivableStatus {
    Pending,
    Partial,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableRecord {
    pub id: String,
    pub client_name: String,
    pub project_title: String,
    pub total_value: f64,
    pub amount_received: f64,
    pub service_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: ReceivableStatus,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub scope: Scope,
}

impl ReceivableRecord {
    pub fn outstanding(&self) -> f64 {
        (self.total_value - self.amount_received).max(0.0)
    }
}

/// One file-processing run, kept so a batch can be undone or recognized again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub import_id: String,
    pub filename: String,
    pub checksum: String,
    pub record_count: usize,
    pub logistics_count: usize,
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,
    pub imported_at: NaiveDateTime,
    pub scope: Scope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Contains,
    StartsWith,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub id: String,
    pub pattern: String,
    pub match_type: MatchType,
    pub category: String,
    /// Restricts the rule to one direction; `None` matches both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<TransactionType>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub hit_count: u64,
}

/// Intermediate representation of one accepted statement line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub date: NaiveDate,
    pub description: String,
    /// Signed: negative for money leaving the account.
    pub amount: f64,
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `<prefix>-<unix millis>-<9 random base36 chars>`.
pub fn generate_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    format!("{prefix}-{millis}-{}", random_suffix(9))
}

/// Batch ids sort by creation time: the millisecond stamp is zero-padded so
/// lexicographic order matches chronological order.
pub fn generate_batch_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    format!("batch-{millis:013}-{}", random_suffix(6))
}
