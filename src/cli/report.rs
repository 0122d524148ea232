use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::books::Books;
use crate::error::Result;
use crate::fmt::{date, money};
use crate::models::{Scope, TransactionType};
use crate::reports::{build_report, category_totals, period_bounds, Period, TransactionFilter};

use super::transactions::signed_amount;
use super::{date_or_today, open_storage};

pub fn run(
    scope: Option<Scope>,
    period: Period,
    reference: Option<&str>,
    txn_type: Option<TransactionType>,
    search: Option<String>,
) -> Result<()> {
    let storage = open_storage()?;
    let books = Books::open(&storage)?;

    let filter = TransactionFilter {
        scope,
        txn_type,
        search,
        period,
        ..TransactionFilter::new(date_or_today(reference)?)
    };
    let report = build_report(books.ledger.list(), &filter);

    let heading = match period_bounds(period, filter.reference) {
        Some((start, end)) if start == end => format!("Report for {}", date(start)),
        Some((start, end)) => format!("Report {} - {}", date(start), date(end)),
        None => "Report (all dates)".to_string(),
    };

    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Category", "Amount"]);
    for t in &report.transactions {
        table.add_row(vec![
            Cell::new(date(t.date)),
            Cell::new(&t.description),
            Cell::new(&t.category),
            Cell::new(signed_amount(t)),
        ]);
    }
    println!("{heading}\n{table}");

    let mut totals = Table::new();
    totals.set_header(vec!["Category", "Total"]);
    for (name, total) in category_totals(&report.transactions) {
        totals.add_row(vec![Cell::new(name), Cell::new(money(total))]);
    }
    println!("By category\n{totals}");

    let balance = if report.stats.balance >= 0.0 {
        money(report.stats.balance).green().bold()
    } else {
        money(report.stats.balance).red().bold()
    };
    println!("Income:   {}", money(report.stats.total_income).green());
    println!("Expenses: {}", money(report.stats.total_expense).red());
    println!("Balance:  {balance}");
    Ok(())
}
