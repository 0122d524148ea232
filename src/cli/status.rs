use crate::books::Books;
use crate::db::{SqliteStorage, DB_FILE};
use crate::error::Result;
use crate::fmt::money;
use crate::reports::status_snapshot;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    let user = if settings.user_name.is_empty() {
        "(not set)"
    } else {
        &settings.user_name
    };
    println!("User:       {user}");
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    println!("Scope:      {}", settings.default_scope.as_str());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `finflow init` to set up.");
        return Ok(());
    }

    let storage = SqliteStorage::open(&db_path)?;
    let books = Books::open(&storage)?;
    let s = status_snapshot(&books);

    println!();
    println!(
        "Transactions:  {} ({} imported, {} batches)",
        s.transaction_count, s.imported_count, s.import_batches
    );
    println!("Income:        {}", money(s.ledger.total_income));
    println!("Expenses:      {}", money(s.ledger.total_expense));
    println!("Balance:       {}", money(s.ledger.balance));
    println!(
        "Logistics:     {} ({} uber, {} shipping)",
        money(s.logistics.total),
        s.logistics.uber_count,
        s.logistics.shipping_count
    );
    println!(
        "Costs:         {} pending, {} paid",
        money(s.costs_pending),
        money(s.costs_paid)
    );
    println!("Receivables:   {} outstanding", money(s.receivables_outstanding));
    if let Some(last) = books.history.list().last() {
        println!(
            "Last import:   {} ({}, {} rows)",
            last.import_id, last.filename, last.record_count
        );
    }
    Ok(())
}
