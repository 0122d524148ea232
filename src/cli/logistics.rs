use comfy_table::{Cell, Table};

use crate::books::Books;
use crate::error::{FinflowError, Result};
use crate::fmt::{date, money};
use crate::models::{generate_id, LogisticsKind, LogisticsStatus, LogisticsTransaction};

use super::{date_or_today, open_storage};

pub fn add(
    title: &str,
    amount: f64,
    kind: LogisticsKind,
    on: Option<&str>,
    attachment: Option<String>,
    pending: bool,
) -> Result<()> {
    if !(amount.is_finite() && amount > 0.0) {
        return Err(FinflowError::InvalidInput(
            "amount must be a positive number".to_string(),
        ));
    }
    let entry = LogisticsTransaction {
        id: generate_id("log"),
        kind,
        title: title.trim().to_string(),
        date: date_or_today(on)?,
        amount,
        status: if pending {
            LogisticsStatus::Pending
        } else {
            LogisticsStatus::Completed
        },
        attachment,
        import_id: None,
    };
    let id = entry.id.clone();
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    books.logistics.add(entry)?;
    println!("Added logistics record {id}: {} ({})", title.trim(), money(amount));
    Ok(())
}

pub fn list() -> Result<()> {
    let storage = open_storage()?;
    let books = Books::open(&storage)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Type", "Title", "Amount", "Status"]);
    for entry in books.logistics.list() {
        table.add_row(vec![
            Cell::new(&entry.id),
            Cell::new(date(entry.date)),
            Cell::new(match entry.kind {
                LogisticsKind::Uber => "uber",
                LogisticsKind::Shipping => "shipping",
            }),
            Cell::new(&entry.title),
            Cell::new(money(entry.amount)),
            Cell::new(match entry.status {
                LogisticsStatus::Completed => "completed",
                LogisticsStatus::Pending => "pending",
            }),
        ]);
    }
    println!("Logistics\n{table}");

    let stats = books.logistics.stats();
    println!(
        "Total {}  |  Uber {} ({}, {}%)  |  Shipping {} ({}, {}%)",
        money(stats.total),
        money(stats.uber_total),
        stats.uber_count,
        stats.uber_pct,
        money(stats.shipping_total),
        stats.shipping_count,
        stats.shipping_pct
    );
    Ok(())
}

pub fn remove(id: &str) -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    if !books.logistics.remove(id)? {
        return Err(FinflowError::NotFound {
            kind: "logistics record",
            id: id.to_string(),
        });
    }
    println!("Removed logistics record {id}");
    Ok(())
}
