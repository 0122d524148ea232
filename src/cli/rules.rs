use comfy_table::{Cell, Table};

use crate::books::Books;
use crate::error::{FinflowError, Result};
use crate::models::{MatchType, TransactionType};

use super::open_storage;

pub fn add(
    pattern: &str,
    category: &str,
    match_type: MatchType,
    applies_to: Option<TransactionType>,
    priority: i64,
) -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    let rule = books
        .rules
        .add(pattern, match_type, category, applies_to, priority)?;
    println!("Added rule {}: '{pattern}' \u{2192} {category}", rule.id);
    Ok(())
}

pub fn list() -> Result<()> {
    let storage = open_storage()?;
    let books = Books::open(&storage)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Pattern", "Type", "Applies to", "Category", "Priority", "Hits"]);
    for rule in books.rules.list() {
        let match_type = match rule.match_type {
            MatchType::Contains => "contains",
            MatchType::StartsWith => "starts_with",
            MatchType::Regex => "regex",
        };
        table.add_row(vec![
            Cell::new(&rule.id),
            Cell::new(&rule.pattern),
            Cell::new(match_type),
            Cell::new(rule.applies_to.map_or("any", |t| t.as_str())),
            Cell::new(&rule.category),
            Cell::new(rule.priority),
            Cell::new(rule.hit_count),
        ]);
    }
    println!("Rules\n{table}");
    Ok(())
}

pub fn remove(id: &str) -> Result<()> {
    let storage = open_storage()?;
    let mut books = Books::open(&storage)?;
    if !books.rules.remove(id)? {
        return Err(FinflowError::NotFound {
            kind: "rule",
            id: id.to_string(),
        });
    }
    println!("Deleted rule {id}");
    Ok(())
}
