use chrono::{Datelike, Duration, NaiveDate};

use crate::ledger::{stats, FinancialStats};
use crate::logistics::LogisticsStats;
use crate::models::{Scope, Transaction, TransactionType};

// ---------------------------------------------------------------------------
// Period filter helper
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Period {
    #[default]
    All,
    Day,
    Week,
    Month,
    Year,
}

/// Inclusive date bounds for `period` around `reference`. Weeks run Sunday
/// through Saturday.
pub fn period_bounds(period: Period, reference: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    match period {
        Period::All => None,
        Period::Day => Some((reference, reference)),
        Period::Week => {
            let offset = reference.weekday().num_days_from_sunday() as i64;
            let start = reference - Duration::days(offset);
            Some((start, start + Duration::days(6)))
        }
        Period::Month => {
            let start = reference.with_day(1)?;
            let next = if reference.month() == 12 {
                NaiveDate::from_ymd_opt(reference.year() + 1, 1, 1)?
            } else {
                NaiveDate::from_ymd_opt(reference.year(), reference.month() + 1, 1)?
            };
            Some((start, next.pred_opt()?))
        }
        Period::Year => Some((
            NaiveDate::from_ymd_opt(reference.year(), 1, 1)?,
            NaiveDate::from_ymd_opt(reference.year(), 12, 31)?,
        )),
    }
}

// ---------------------------------------------------------------------------
// Transaction filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub scope: Option<Scope>,
    /// `None` keeps both directions.
    pub txn_type: Option<TransactionType>,
    pub search: Option<String>,
    pub period: Period,
    pub reference: NaiveDate,
}

impl TransactionFilter {
    pub fn new(reference: NaiveDate) -> Self {
        Self {
            scope: None,
            txn_type: None,
            search: None,
            period: Period::All,
            reference,
        }
    }
}

pub fn filter_transactions<'t>(
    transactions: &'t [Transaction],
    filter: &TransactionFilter,
) -> Vec<&'t Transaction> {
    let bounds = period_bounds(filter.period, filter.reference);
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut out: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| filter.scope.map_or(true, |s| t.scope == s))
        .filter(|t| filter.txn_type.map_or(true, |k| t.txn_type == k))
        .filter(|t| {
            needle.as_deref().map_or(true, |n| {
                t.description.to_lowercase().contains(n) || t.category.to_lowercase().contains(n)
            })
        })
        .filter(|t| bounds.map_or(true, |(start, end)| t.date >= start && t.date <= end))
        .collect();
    // Stable: same-day entries keep ledger order.
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

pub struct Report<'t> {
    pub transactions: Vec<&'t Transaction>,
    pub stats: FinancialStats,
}

pub fn build_report<'t>(transactions: &'t [Transaction], filter: &TransactionFilter) -> Report<'t> {
    let transactions = filter_transactions(transactions, filter);
    let stats = stats(transactions.iter().copied());
    Report { transactions, stats }
}

/// Totals per category, largest first.
pub fn category_totals(transactions: &[&Transaction]) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for t in transactions {
        match totals.iter_mut().find(|(name, _)| *name == t.category) {
            Some((_, total)) => *total += t.amount,
            None => totals.push((t.category.clone(), t.amount)),
        }
    }
    totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    totals
}

pub struct StatusSnapshot {
    pub ledger: FinancialStats,
    pub transaction_count: usize,
    pub imported_count: usize,
    pub import_batches: usize,
    pub logistics: LogisticsStats,
    pub costs_pending: f64,
    pub costs_paid: f64,
    pub receivables_outstanding: f64,
}

pub fn status_snapshot(books: &crate::books::Books) -> StatusSnapshot {
    let list = books.ledger.list();
    StatusSnapshot {
        ledger: books.ledger.stats(),
        transaction_count: books.ledger.len(),
        imported_count: list.iter().filter(|t| t.is_imported()).count(),
        import_batches: books.history.list().len(),
        logistics: books.logistics.stats(),
        costs_pending: books.costs.total_pending(),
        costs_paid: books.costs.total_paid(),
        receivables_outstanding: books.receivables.total_outstanding(),
    }
}
