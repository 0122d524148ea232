use std::path::PathBuf;

use colored::Colorize;

use crate::books::Books;
use crate::error::Result;
use crate::fmt::{date, money};
use crate::importer::{clear_imports, import_file, remove_import, undo_last_import};
use crate::models::Scope;
use crate::settings::load_settings;

use super::open_storage;

pub fn run(file: &str, scope: Option<Scope>, no_logistics: bool) -> Result<()> {
    let settings = load_settings();
    let scope = scope.unwrap_or(settings.default_scope);
    let derive_logistics = settings.derive_logistics && !no_logistics;

    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    let summary = import_file(&mut books, &PathBuf::from(file), scope, derive_logistics)?;

    if let Some(prev) = &summary.previous_import {
        println!(
            "{}",
            format!("Warning: this file was already imported (batch {prev}).").yellow()
        );
    }
    println!("{} transações importadas.", summary.imported);
    if summary.logistics > 0 {
        println!("{} lançamentos de Uber identificados.", summary.logistics);
    }
    if let Some((start, end)) = summary.date_range {
        println!("Period:   {} - {}", date(start), date(end));
    }
    println!("Income:   {}", money(summary.stats.total_income).green());
    println!("Expenses: {}", money(summary.stats.total_expense).red());
    println!("Batch:    {}", summary.import_id);
    Ok(())
}

pub fn undo(import: Option<&str>) -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    let summary = match import {
        Some(id) => remove_import(&mut books, id)?,
        None => undo_last_import(&mut books)?,
    };
    let source = summary
        .filename
        .as_deref()
        .map(|name| format!(" ({name})"))
        .unwrap_or_default();
    println!(
        "Removed import {}{source}: {} transactions, {} logistics records.",
        summary.import_id, summary.transactions, summary.logistics
    );
    Ok(())
}

pub fn clear() -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    let removed = clear_imports(&mut books)?;
    println!("Removed {removed} imported transactions.");
    Ok(())
}
