use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::books::Books;
use crate::error::{FinflowError, Result};
use crate::fmt::{date, money};
use crate::models::{generate_id, ReceivableRecord, ReceivableStatus, Scope};
use crate::settings::load_settings;

use super::{date_or_today, open_storage};

pub fn add(
    client: &str,
    project: &str,
    total: f64,
    service_date: Option<&str>,
    due_date: Option<&str>,
    scope: Option<Scope>,
) -> Result<()> {
    let service_date = date_or_today(service_date)?;
    let due_date = match due_date {
        Some(raw) => date_or_today(Some(raw))?,
        None => service_date,
    };
    let record = ReceivableRecord {
        id: generate_id("rec"),
        client_name: client.trim().to_string(),
        project_title: project.trim().to_string(),
        total_value: total,
        amount_received: 0.0,
        service_date,
        due_date,
        status: ReceivableStatus::Pending,
        created_at: chrono::Local::now().naive_local(),
        scope: scope.unwrap_or(load_settings().default_scope),
    };
    let id = record.id.clone();
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    books.receivables.add(record)?;
    println!("Added receivable {id}: {project} ({client}) {}", money(total));
    Ok(())
}

pub fn list() -> Result<()> {
    let storage = open_storage()?;
    let books = Books::open(&storage)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Client", "Project", "Total", "Received", "Due", "Status"]);
    for r in books.receivables.list() {
        let status = match r.status {
            ReceivableStatus::Paid => "paid".green().to_string(),
            ReceivableStatus::Partial => "partial".yellow().to_string(),
            ReceivableStatus::Pending => "pending".red().to_string(),
        };
        table.add_row(vec![
            Cell::new(&r.id),
            Cell::new(&r.client_name),
            Cell::new(&r.project_title),
            Cell::new(money(r.total_value)),
            Cell::new(money(r.amount_received)),
            Cell::new(date(r.due_date)),
            Cell::new(status),
        ]);
    }
    println!("Receivables\n{table}");
    println!("Outstanding: {}", money(books.receivables.total_outstanding()).bold());
    Ok(())
}

pub fn pay(id: &str, amount: f64) -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    let today = chrono::Local::now().date_naive();
    let status = books
        .receivables
        .record_payment(id, amount, today, &mut books.ledger)?;
    let label = match status {
        ReceivableStatus::Paid => "paid in full",
        _ => "partially paid",
    };
    println!("Recorded {} on {id}; now {label}.", money(amount));
    if let Some(record) = books.receivables.get(id) {
        if record.outstanding() > 0.0 {
            println!("Still due: {}", money(record.outstanding()));
        }
    }
    Ok(())
}

pub fn remove(id: &str) -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    if !books.receivables.remove(id)? {
        return Err(FinflowError::NotFound {
            kind: "receivable",
            id: id.to_string(),
        });
    }
    println!("Removed receivable {id}");
    Ok(())
}
