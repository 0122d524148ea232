use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::books::Books;
use crate::error::{FinflowError, Result};
use crate::fmt::{date, money};
use crate::models::{generate_id, Scope, Transaction, TransactionType};
use crate::settings::load_settings;

use super::{date_or_today, open_storage};

pub(crate) fn signed_amount(t: &Transaction) -> String {
    match t.txn_type {
        TransactionType::Income => money(t.amount).green().to_string(),
        TransactionType::Expense => money(-t.amount).red().to_string(),
    }
}

pub fn list(scope: Option<Scope>, import: Option<&str>, limit: usize) -> Result<()> {
    let storage = open_storage()?;
    let books = Books::open(&storage)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Category", "Amount", "Scope"]);
    let rows = books
        .ledger
        .list()
        .iter()
        .filter(|t| scope.map_or(true, |s| t.scope == s))
        .filter(|t| import.map_or(true, |id| t.import_id.as_deref() == Some(id)))
        .take(limit);
    for t in rows {
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(date(t.date)),
            Cell::new(&t.description),
            Cell::new(&t.category),
            Cell::new(signed_amount(t)),
            Cell::new(t.scope.as_str()),
        ]);
    }
    println!("Transactions\n{table}");
    Ok(())
}

pub fn add(
    description: &str,
    amount: f64,
    txn_type: TransactionType,
    category: &str,
    on: Option<&str>,
    scope: Option<Scope>,
) -> Result<()> {
    if !(amount.is_finite() && amount > 0.0) {
        return Err(FinflowError::InvalidInput(
            "amount must be a positive number".to_string(),
        ));
    }
    let transaction = Transaction {
        id: generate_id("manual"),
        description: description.trim().to_string(),
        amount,
        txn_type,
        category: category.to_string(),
        date: date_or_today(on)?,
        import_id: None,
        scope: scope.unwrap_or(load_settings().default_scope),
    };
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    let id = transaction.id.clone();
    books.ledger.add(transaction)?;
    println!("Added transaction {id}");
    Ok(())
}

pub fn remove(id: &str) -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    let description = books
        .ledger
        .get(id)
        .map(|t| t.description.clone())
        .ok_or_else(|| FinflowError::NotFound {
            kind: "transaction",
            id: id.to_string(),
        })?;
    books.ledger.remove(id)?;
    println!("Removed transaction {id}: {description}");
    Ok(())
}

pub fn clear() -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    let removed = books.ledger.clear_all()?;
    println!("Removed {removed} transactions.");
    Ok(())
}
