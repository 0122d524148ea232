use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::books::Books;
use crate::error::{FinflowError, Result};
use crate::fmt::{date, money};
use crate::models::{generate_id, Cost, CostStatus, Scope};
use crate::settings::load_settings;

use super::{date_or_today, open_storage};

pub fn add(
    description: &str,
    amount: f64,
    category: &str,
    day: u32,
    start: Option<&str>,
    scope: Option<Scope>,
) -> Result<()> {
    if !(amount.is_finite() && amount > 0.0) {
        return Err(FinflowError::InvalidInput(
            "amount must be a positive number".to_string(),
        ));
    }
    let cost = Cost {
        id: generate_id("cost"),
        description: description.trim().to_string(),
        category: category.to_string(),
        amount,
        day_of_month: day,
        start_date: date_or_today(start)?,
        end_date: None,
        active: true,
        status: CostStatus::Pending,
        scope: scope.unwrap_or(load_settings().default_scope),
    };
    let id = cost.id.clone();
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    books.costs.add(cost)?;
    println!("Added cost {id}: {description} ({} on day {day})", money(amount));
    Ok(())
}

/// Fields left as `None` keep their stored value.
pub struct CostChanges {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub day: Option<u32>,
    pub end: Option<String>,
}

pub fn edit(id: &str, changes: CostChanges) -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    let mut cost = books
        .costs
        .get(id)
        .cloned()
        .ok_or_else(|| FinflowError::NotFound {
            kind: "cost",
            id: id.to_string(),
        })?;

    if let Some(description) = changes.description {
        cost.description = description.trim().to_string();
    }
    if let Some(amount) = changes.amount {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(FinflowError::InvalidInput(
                "amount must be a positive number".to_string(),
            ));
        }
        cost.amount = amount;
    }
    if let Some(category) = changes.category {
        cost.category = category;
    }
    if let Some(day) = changes.day {
        cost.day_of_month = day;
    }
    if let Some(end) = changes.end {
        cost.end_date = Some(date_or_today(Some(&end))?);
    }

    let summary = format!(
        "{} ({} on day {})",
        cost.description,
        money(cost.amount),
        cost.day_of_month
    );
    books.costs.update(cost)?;
    println!("Updated cost {id}: {summary}");
    Ok(())
}

pub fn list() -> Result<()> {
    let storage = open_storage()?;
    let books = Books::open(&storage)?;

    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Description",
        "Category",
        "Day",
        "Amount",
        "Since",
        "Status",
        "Active",
    ]);
    for c in books.costs.list() {
        let status = match c.status {
            CostStatus::Paid => "paid".green().to_string(),
            CostStatus::Pending => "pending".yellow().to_string(),
        };
        table.add_row(vec![
            Cell::new(&c.id),
            Cell::new(&c.description),
            Cell::new(&c.category),
            Cell::new(c.day_of_month),
            Cell::new(money(c.amount)),
            Cell::new(date(c.start_date)),
            Cell::new(status),
            Cell::new(if c.active { "yes" } else { "no" }),
        ]);
    }
    println!("Fixed costs\n{table}");
    println!(
        "Pending: {}  Paid: {}",
        money(books.costs.total_pending()).yellow(),
        money(books.costs.total_paid()).green()
    );
    Ok(())
}

pub fn pay(id: &str) -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    let today = chrono::Local::now().date_naive();
    match books.costs.toggle_status(id, today, &mut books.ledger)? {
        CostStatus::Paid => {
            println!("Cost {id} marked paid; expense booked for {}.", date(today))
        }
        CostStatus::Pending => println!("Cost {id} back to pending."),
    }
    Ok(())
}

pub fn toggle(id: &str) -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    let active = books.costs.toggle_active(id)?;
    println!("Cost {id} is now {}.", if active { "active" } else { "inactive" });
    Ok(())
}

pub fn remove(id: &str) -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    if !books.costs.remove(id)? {
        return Err(FinflowError::NotFound {
            kind: "cost",
            id: id.to_string(),
        });
    }
    println!("Removed cost {id}");
    Ok(())
}
