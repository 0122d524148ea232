use std::path::Path;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::books::Books;
use crate::categorizer::resolve_category;
use crate::error::{FinflowError, Result};
use crate::ledger::{stats, FinancialStats};
use crate::models::{
    generate_batch_id, generate_id, CategoryRule, ImportRecord, LogisticsKind, LogisticsStatus,
    LogisticsTransaction, ParsedRow, Scope, Transaction, TransactionType,
};
use crate::normalizer::normalize_description;

/// Amounts at or below this magnitude are treated as "no amount found".
pub const MIN_AMOUNT_MAGNITUDE: f64 = 0.001;

/// Binary formats the line parser cannot read.
pub const REJECTED_EXTENSIONS: &[&str] = &["pdf", "xlsx", "xls"];

static HEADER_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)data|date|valor|value|descri").unwrap());
static BR_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})").unwrap());
static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").unwrap());
static MONEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(?-?(?:R\$\s?)?-?(?:\d{1,3}(?:[.,]\d{3})*|\d+)(?:[.,]\d{1,2})?-?\)?$").unwrap()
});

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a money token in either BR (`1.234,56`) or US (`1,234.56`) notation.
/// A leading/trailing minus or enclosing parentheses make the value negative.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let mut clean: String = raw
        .trim()
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .collect();

    let negative = clean.starts_with('-')
        || clean.ends_with('-')
        || (clean.starts_with('(') && clean.ends_with(')'));
    if negative {
        clean.retain(|c| !matches!(c, '-' | '(' | ')'));
    }

    // The separator that appears last is the decimal one.
    let normalized = match (clean.rfind(','), clean.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => clean.replace('.', "").replacen(',', ".", 1),
        (Some(_), Some(_)) => clean.replace(',', ""),
        (Some(_), None) if clean.matches(',').count() > 1 => clean.replace(',', ""),
        (Some(_), None) => clean.replacen(',', ".", 1),
        (None, Some(_)) if clean.matches('.').count() > 1 => clean.replace('.', ""),
        _ => clean,
    };

    if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value: f64 = normalized.parse().ok()?;
    Some(if negative { -value.abs() } else { value })
}

/// `DD/MM/YYYY` or `YYYY-MM-DD` at the start of the cell. Anything after the
/// date (a time, say) is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Some(caps) = BR_DATE.captures(raw) {
        let d: u32 = caps[1].parse().ok()?;
        let m: u32 = caps[2].parse().ok()?;
        let y: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    if let Some(caps) = ISO_DATE.captures(raw) {
        let y: i32 = caps[1].parse().ok()?;
        let m: u32 = caps[2].parse().ok()?;
        let d: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    None
}

/// Quotes are honoured only when they pair up. A stray `"` would otherwise
/// swallow the rest of the line, so unbalanced lines lose their quotes and
/// are split on the bare delimiter.
fn split_cells(line: &str) -> Vec<String> {
    let delimiter = if line.contains(';') { b';' } else { b',' };
    let quoted = if line.matches('"').count() % 2 == 0 {
        quoted_cells(line, delimiter)
    } else {
        None
    };
    let cells = quoted.unwrap_or_else(|| {
        line.replace('"', "")
            .split(delimiter as char)
            .map(str::to_string)
            .collect()
    });
    cells
        .into_iter()
        .map(|c| c.replace('"', "").trim().to_string())
        .collect()
}

fn quoted_cells(line: &str, delimiter: u8) -> Option<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());
    let record = rdr.records().next()?.ok()?;
    Some(record.iter().map(str::to_string).collect())
}

fn is_header(cells: &[String]) -> bool {
    cells.iter().any(|c| HEADER_LABEL.is_match(c))
        && !cells.iter().any(|c| c.chars().any(|ch| ch.is_ascii_digit()))
}

fn is_description_cell(cell: &str) -> bool {
    cell.chars().count() > 2 && !cell.chars().all(|c| c.is_ascii_digit())
}

fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Blank,
    Header,
    /// Missing a date or an amount. Dropped without being reported.
    Skipped,
    Accepted(ParsedRow),
}

/// Classify one statement line. Each cell fills at most one role, scanning left
/// to right: the first date, then the first usable amount, and every other
/// cell long enough to be text joins the description.
pub fn classify_line(line: &str) -> RowOutcome {
    if line.trim().is_empty() {
        return RowOutcome::Blank;
    }
    let cells = split_cells(line);
    if is_header(&cells) {
        return RowOutcome::Header;
    }

    let mut date = None;
    let mut amount = None;
    let mut description: Vec<&str> = Vec::new();

    for cell in &cells {
        if date.is_none() {
            if let Some(d) = parse_date(cell) {
                date = Some(d);
                continue;
            }
        }
        if amount.is_none() && MONEY.is_match(cell) {
            if let Some(v) = parse_currency(cell).filter(|v| v.abs() > MIN_AMOUNT_MAGNITUDE) {
                amount = Some(v);
                continue;
            }
        }
        if is_description_cell(cell) {
            description.push(cell);
        }
    }

    match (date, amount) {
        (Some(date), Some(amount)) => RowOutcome::Accepted(ParsedRow {
            date,
            description: description.join(" "),
            amount,
        }),
        _ => RowOutcome::Skipped,
    }
}

// ---------------------------------------------------------------------------
// Batch parsing
// ---------------------------------------------------------------------------

pub struct ImportOptions<'r> {
    pub scope: Scope,
    /// Emit ride-hailing logistics records (business scope only).
    pub derive_logistics: bool,
    /// User rules, highest priority first.
    pub rules: &'r [CategoryRule],
}

impl<'r> ImportOptions<'r> {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            derive_logistics: true,
            rules: &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatementImport {
    pub import_id: String,
    pub transactions: Vec<Transaction>,
    pub logistics: Vec<LogisticsTransaction>,
    /// Ids of user rules that categorized a row, one entry per row.
    pub rule_hits: Vec<String>,
}

impl StatementImport {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

fn is_ride_hailing(description: &str) -> bool {
    description.contains("Uber") && !description.contains("Eats")
}

fn build_records(
    row: ParsedRow,
    import_id: &str,
    options: &ImportOptions,
    out: &mut StatementImport,
) {
    let txn_type = if row.amount < 0.0 {
        TransactionType::Expense
    } else {
        TransactionType::Income
    };
    let amount = row.amount.abs();
    let description = normalize_description(&row.description);
    let (category, rule_id) = resolve_category(options.rules, &row.description, txn_type);
    if let Some(id) = rule_id {
        out.rule_hits.push(id.to_string());
    }

    if options.derive_logistics
        && options.scope == Scope::Business
        && txn_type == TransactionType::Expense
        && is_ride_hailing(&description)
    {
        out.logistics.push(LogisticsTransaction {
            id: generate_id("uber"),
            kind: LogisticsKind::Uber,
            title: format!("Uber Importado: {}", row.date.format("%Y-%m-%d")),
            date: row.date,
            amount,
            status: LogisticsStatus::Completed,
            attachment: None,
            import_id: Some(import_id.to_string()),
        });
    }

    out.transactions.push(Transaction {
        id: generate_id("import"),
        description,
        amount,
        txn_type,
        category,
        date: row.date,
        import_id: Some(import_id.to_string()),
        scope: options.scope,
    });
}

/// Parse a whole statement. Every record produced shares one fresh import id.
/// An empty `transactions` list means nothing in the text was usable.
pub fn parse_statement(content: &str, options: &ImportOptions) -> StatementImport {
    let import_id = generate_batch_id();
    let mut out = StatementImport {
        import_id: import_id.clone(),
        transactions: Vec::new(),
        logistics: Vec::new(),
        rule_hits: Vec::new(),
    };
    let (mut headers, mut skipped) = (0usize, 0usize);

    for line in content.lines() {
        match classify_line(line) {
            RowOutcome::Blank => {}
            RowOutcome::Header => headers += 1,
            RowOutcome::Skipped => skipped += 1,
            RowOutcome::Accepted(row) => build_records(row, &import_id, options, &mut out),
        }
    }

    tracing::debug!(
        import_id = %import_id,
        accepted = out.transactions.len(),
        logistics = out.logistics.len(),
        headers,
        skipped,
        "parsed statement"
    );
    out
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub import_id: String,
    pub imported: usize,
    pub logistics: usize,
    pub stats: FinancialStats,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Set when a file with the same checksum was imported before.
    pub previous_import: Option<String>,
}

pub fn check_file_type(file_path: &Path) -> Result<()> {
    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if REJECTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(FinflowError::UnsupportedFileType(ext));
    }
    Ok(())
}

/// Read, parse and commit one statement file. Nothing is written unless at
/// least one transaction was recognized.
pub fn import_file(
    books: &mut Books,
    file_path: &Path,
    scope: Scope,
    derive_logistics: bool,
) -> Result<ImportSummary> {
    check_file_type(file_path)?;

    let bytes = std::fs::read(file_path)
        .map_err(|e| FinflowError::UnreadableFile(format!("{}: {e}", file_path.display())))?;
    let content = String::from_utf8_lossy(&bytes);
    if content.trim().is_empty() {
        return Err(FinflowError::UnreadableFile(format!(
            "{}: file is empty",
            file_path.display()
        )));
    }

    let checksum = compute_checksum(&bytes);
    let previous_import = books
        .history
        .find_by_checksum(&checksum)
        .map(|r| r.import_id.clone());
    if let Some(prev) = &previous_import {
        tracing::warn!(file = %file_path.display(), previous = %prev, "file was already imported");
    }

    let options = ImportOptions {
        derive_logistics,
        rules: books.rules.list(),
        ..ImportOptions::new(scope)
    };
    let batch = parse_statement(&content, &options);
    if batch.is_empty() {
        return Err(FinflowError::NoValidTransactions);
    }

    let imported = batch.transactions.len();
    let logistics = batch.logistics.len();
    let stats = stats(&batch.transactions);
    let date_range = batch
        .transactions
        .iter()
        .map(|t| t.date)
        .min()
        .zip(batch.transactions.iter().map(|t| t.date).max());

    let import_id = batch.import_id.clone();
    let record = ImportRecord {
        import_id: import_id.clone(),
        filename: file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string(),
        checksum,
        record_count: imported,
        logistics_count: logistics,
        date_range_start: date_range.map(|r| r.0),
        date_range_end: date_range.map(|r| r.1),
        imported_at: chrono::Local::now().naive_local(),
        scope,
    };

    // The ledger goes first and the history entry last, so a failed write
    // never leaves a history entry without its transactions.
    books.ledger.add_many(batch.transactions)?;
    let rest = books
        .logistics
        .add_many(batch.logistics)
        .and_then(|()| books.rules.record_hits(&batch.rule_hits))
        .and_then(|()| books.history.record(record));
    if let Err(e) = rest {
        rollback_batch(books, &import_id);
        return Err(e);
    }

    tracing::info!(import_id = %import_id, imported, logistics, "import committed");
    Ok(ImportSummary {
        import_id,
        imported,
        logistics,
        stats,
        date_range,
        previous_import,
    })
}

fn rollback_batch(books: &mut Books, import_id: &str) {
    let ledger = books.ledger.remove_by_import_id(import_id);
    let logistics = books.logistics.remove_by_import_id(import_id);
    if let Err(e) = ledger.and(logistics) {
        tracing::warn!(import_id, error = %e, "could not roll back partial import");
    }
}

// ---------------------------------------------------------------------------
// Undo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct UndoSummary {
    pub import_id: String,
    /// Source file name, when the batch is still in the history.
    pub filename: Option<String>,
    pub transactions: usize,
    pub logistics: usize,
}

/// Remove one batch: its transactions, the logistics records derived from it,
/// and its history entry.
pub fn remove_import(books: &mut Books, import_id: &str) -> Result<UndoSummary> {
    let filename = books.history.find(import_id).map(|r| r.filename.clone());
    let transactions = books.ledger.remove_by_import_id(import_id)?;
    let logistics = books.logistics.remove_by_import_id(import_id)?;
    let in_history = books.history.remove(import_id)?;
    if transactions == 0 && logistics == 0 && !in_history {
        return Err(FinflowError::NotFound {
            kind: "import",
            id: import_id.to_string(),
        });
    }
    tracing::info!(import_id, transactions, logistics, "import removed");
    Ok(UndoSummary {
        import_id: import_id.to_string(),
        filename,
        transactions,
        logistics,
    })
}

pub fn undo_last_import(books: &mut Books) -> Result<UndoSummary> {
    let last = books
        .ledger
        .last_import_id()
        .map(str::to_string)
        .ok_or(FinflowError::NothingToUndo)?;
    remove_import(books, &last)
}

/// Drop every imported transaction and logistics record; manual entries stay.
/// Returns how many transactions were removed.
pub fn clear_imports(books: &mut Books) -> Result<usize> {
    let removed = books.ledger.clear_imported()?;
    let logistics = books.logistics.clear_imported()?;
    books.history.clear()?;
    tracing::info!(removed, logistics, "imports cleared");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::CATEGORY_TRANSPORT;
    use crate::db::{MemoryStorage, Storage};
    use crate::models::MatchType;
    use crate::store::{IMPORTS_KEY, TRANSACTIONS_KEY};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_statement(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_currency_locales() {
        assert_eq!(parse_currency("1.234,56"), Some(1234.56));
        assert_eq!(parse_currency("1,234.56"), Some(1234.56));
        assert_eq!(parse_currency("1234,56"), Some(1234.56));
        assert_eq!(parse_currency("42.50"), Some(42.5));
        assert_eq!(parse_currency("1.234.567"), Some(1234567.0));
        assert_eq!(parse_currency("1,234,567"), Some(1234567.0));
    }

    #[test]
    fn test_parse_currency_negatives() {
        assert_eq!(parse_currency("150,00-"), Some(-150.0));
        assert_eq!(parse_currency("(150,00)"), Some(-150.0));
        assert_eq!(parse_currency("-42,50"), Some(-42.5));
        assert_eq!(parse_currency("-R$ 42,50"), Some(-42.5));
    }

    #[test]
    fn test_parse_currency_symbol_and_spaces() {
        assert_eq!(parse_currency("R$ 1.234,56"), Some(1234.56));
        assert_eq!(parse_currency("  R$3 500,00 "), Some(3500.0));
    }

    #[test]
    fn test_parse_currency_rejects_garbage() {
        assert_eq!(parse_currency(""), None);
        assert_eq!(parse_currency("abc"), None);
        assert_eq!(parse_currency("nan"), None);
        assert_eq!(parse_currency("1e5"), None);
        assert_eq!(parse_currency("R$"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("24/10/2023"), Some(ymd(2023, 10, 24)));
        assert_eq!(parse_date("2023-10-24"), Some(ymd(2023, 10, 24)));
        assert_eq!(parse_date("2023-10-24 14:30"), Some(ymd(2023, 10, 24)));
        assert_eq!(parse_date("31/02/2023"), None);
        assert_eq!(parse_date("10-24-2023"), None);
        assert_eq!(parse_date("Compra"), None);
    }

    #[test]
    fn test_classify_uber_line() {
        let outcome = classify_line("24/10/2023;UBER *TRIP 123;-42,50");
        assert_eq!(
            outcome,
            RowOutcome::Accepted(ParsedRow {
                date: ymd(2023, 10, 24),
                description: "UBER *TRIP 123".to_string(),
                amount: -42.5,
            })
        );
    }

    #[test]
    fn test_classify_is_column_order_independent() {
        let expected = RowOutcome::Accepted(ParsedRow {
            date: ymd(2023, 10, 24),
            description: "PIX RECEBIDO".to_string(),
            amount: 1500.0,
        });
        assert_eq!(classify_line("24/10/2023;PIX RECEBIDO;1.500,00"), expected);
        assert_eq!(classify_line("1.500,00;PIX RECEBIDO;24/10/2023"), expected);
        assert_eq!(classify_line("PIX RECEBIDO;24/10/2023;1.500,00"), expected);
    }

    #[test]
    fn test_classify_header_row() {
        assert_eq!(classify_line("Data;Valor;Descrição"), RowOutcome::Header);
        assert_eq!(classify_line("Date,Description,Amount"), RowOutcome::Header);
    }

    #[test]
    fn test_header_words_with_digits_are_not_headers() {
        assert!(matches!(
            classify_line("24/10/2023;Data Show Aluguel;-300,00"),
            RowOutcome::Accepted(_)
        ));
    }

    #[test]
    fn test_classify_missing_amount_is_skipped() {
        assert_eq!(classify_line("24/10/2023;Compra sem valor"), RowOutcome::Skipped);
    }

    #[test]
    fn test_classify_missing_date_is_skipped() {
        assert_eq!(classify_line("Compra;-10,00"), RowOutcome::Skipped);
    }

    #[test]
    fn test_zero_amount_is_not_an_amount() {
        assert_eq!(classify_line("24/10/2023;Tarifa;0,00"), RowOutcome::Skipped);
    }

    #[test]
    fn test_short_and_numeric_cells_stay_out_of_description() {
        let RowOutcome::Accepted(row) = classify_line("24/10/2023;-10,00;12345;OK;Padaria") else {
            panic!("expected accepted row");
        };
        assert_eq!(row.description, "Padaria");
    }

    #[test]
    fn test_second_date_cell_becomes_description() {
        let RowOutcome::Accepted(row) = classify_line("24/10/2023;25/10/2023;Compra;-10,00") else {
            panic!("expected accepted row");
        };
        assert_eq!(row.date, ymd(2023, 10, 24));
        assert_eq!(row.description, "25/10/2023 Compra");
    }

    #[test]
    fn test_quoted_comma_separated_line() {
        let line = "\"2023-10-24\",\"NETFLIX\",\"-39.90\"";
        let RowOutcome::Accepted(row) = classify_line(line) else {
            panic!("expected accepted row");
        };
        assert_eq!(row.amount, -39.9);
        assert_eq!(row.description, "NETFLIX");
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(classify_line("   "), RowOutcome::Blank);
    }

    fn accepted(line: &str) -> ParsedRow {
        match classify_line(line) {
            RowOutcome::Accepted(row) => row,
            other => panic!("expected {line:?} to be accepted, got {other:?}"),
        }
    }

    #[test]
    fn test_unbalanced_quote_does_not_swallow_the_line() {
        let row = accepted("24/10/2023;\"LOJA X;-10,00");
        assert_eq!(row.date, ymd(2023, 10, 24));
        assert_eq!(row.description, "LOJA X");
        assert_eq!(row.amount, -10.0);
    }

    #[test]
    fn test_balanced_quotes_keep_quoted_delimiters() {
        let row = accepted("24/10/2023;\"LOJA; FILIAL\";-10,00");
        assert_eq!(row.description, "LOJA; FILIAL");
        assert_eq!(row.amount, -10.0);

        let row = accepted("24/10/2023;\"CAFE \"\"BOM\"\"\";-7,50");
        assert_eq!(row.description, "CAFE BOM");
    }

    #[test]
    fn test_classify_negative_amount_notations() {
        assert_eq!(accepted("24/10/2023;Tarifa;(150,00)").amount, -150.0);
        assert_eq!(accepted("24/10/2023;Tarifa;150,00-").amount, -150.0);
        assert_eq!(accepted("24/10/2023;Tarifa;-R$ 42,50").amount, -42.5);
    }

    #[test]
    fn test_classify_currency_symbol_amounts() {
        assert_eq!(accepted("24/10/2023;Cachê;R$ 1.234,56").amount, 1234.56);
        assert_eq!(accepted("24/10/2023;Cachê;R$1.234,56").amount, 1234.56);
        assert_eq!(accepted("2023-10-24,Refund,\"1,234.56\"").amount, 1234.56);
    }

    #[test]
    fn test_parse_statement_uber_business() {
        let batch = parse_statement(
            "24/10/2023;UBER *TRIP 123;-42,50",
            &ImportOptions::new(Scope::Business),
        );
        assert_eq!(batch.transactions.len(), 1);
        let t = &batch.transactions[0];
        assert_eq!(t.date, ymd(2023, 10, 24));
        assert_eq!(t.amount, 42.5);
        assert_eq!(t.txn_type, TransactionType::Expense);
        assert_eq!(t.category, CATEGORY_TRANSPORT);
        assert_eq!(t.description, "Uber Trip 123");
        assert_eq!(t.scope, Scope::Business);

        assert_eq!(batch.logistics.len(), 1);
        let l = &batch.logistics[0];
        assert_eq!(l.kind, LogisticsKind::Uber);
        assert_eq!(l.status, LogisticsStatus::Completed);
        assert_eq!(l.amount, 42.5);
        assert_eq!(l.date, t.date);
        assert_eq!(l.import_id, t.import_id);
        assert_eq!(l.title, "Uber Importado: 2023-10-24");
    }

    #[test]
    fn test_parse_statement_uber_personal_has_no_logistics() {
        let batch = parse_statement(
            "24/10/2023;UBER *TRIP 123;-42,50",
            &ImportOptions::new(Scope::Personal),
        );
        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.transactions[0].scope, Scope::Personal);
        assert!(batch.logistics.is_empty());
    }

    #[test]
    fn test_parse_statement_logistics_flag_off() {
        let options = ImportOptions {
            derive_logistics: false,
            ..ImportOptions::new(Scope::Business)
        };
        let batch = parse_statement("24/10/2023;UBER *TRIP 123;-42,50", &options);
        assert!(batch.logistics.is_empty());
    }

    #[test]
    fn test_uber_eats_and_uber_income_have_no_logistics() {
        let content = "24/10/2023;UBER EATS PEDIDO;-55,00\n25/10/2023;UBER REEMBOLSO;20,00";
        let batch = parse_statement(content, &ImportOptions::new(Scope::Business));
        assert_eq!(batch.transactions.len(), 2);
        assert!(batch.logistics.is_empty());
    }

    #[test]
    fn test_parse_statement_mixed_file() {
        let content = "\
Data;Descrição;Valor\r
\r
24/10/2023;UBER *TRIP 123;-42,50\r
24/10/2023;Compra sem valor\r
25/10/2023;PIX RECEBIDO CLIENTE;1.500,00\r
26/10/2023;IFOOD *LANCHE;-35,90\r
";
        let batch = parse_statement(content, &ImportOptions::new(Scope::Business));
        assert_eq!(batch.transactions.len(), 3);
        let descs: Vec<_> = batch.transactions.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descs, ["Uber Trip 123", "Pix Recebido Cliente", "Ifood Lanche"]);
        assert!(batch
            .transactions
            .iter()
            .all(|t| t.import_id.as_deref() == Some(batch.import_id.as_str())));
        assert!(batch.transactions.iter().all(|t| t.amount >= 0.0));
    }

    #[test]
    fn test_parse_statement_ids_unique() {
        let content = "24/10/2023;A LOJA;-1,00\n24/10/2023;A LOJA;-1,00\n24/10/2023;A LOJA;-1,00";
        let batch = parse_statement(content, &ImportOptions::new(Scope::Business));
        let mut ids: Vec<_> = batch.transactions.iter().map(|t| t.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_two_runs_get_distinct_import_ids() {
        let content = "24/10/2023;UBER *TRIP 123;-42,50";
        let a = parse_statement(content, &ImportOptions::new(Scope::Business));
        let b = parse_statement(content, &ImportOptions::new(Scope::Business));
        assert_ne!(a.import_id, b.import_id);
    }

    #[test]
    fn test_parse_statement_nothing_valid() {
        let batch = parse_statement(
            "Data;Valor;Descrição\n24/10/2023;Compra sem valor\n",
            &ImportOptions::new(Scope::Business),
        );
        assert!(batch.is_empty());
        assert!(batch.logistics.is_empty());
    }

    #[test]
    fn test_user_rules_categorize_and_count() {
        let rule = CategoryRule {
            id: "rule-1".to_string(),
            pattern: "LOCADORA".to_string(),
            match_type: MatchType::Contains,
            category: "Locação".to_string(),
            applies_to: None,
            priority: 0,
            hit_count: 0,
        };
        let rules = [rule];
        let options = ImportOptions {
            scope: Scope::Business,
            derive_logistics: true,
            rules: &rules,
        };
        let batch = parse_statement("24/10/2023;LOCADORA LUZ LTDA;-800,00", &options);
        assert_eq!(batch.transactions[0].category, "Locação");
        assert_eq!(batch.transactions[0].description, "Locadora Luz");
        assert_eq!(batch.rule_hits, vec!["rule-1".to_string()]);
    }

    #[test]
    fn test_check_file_type() {
        assert!(check_file_type(Path::new("extrato.csv")).is_ok());
        assert!(check_file_type(Path::new("extrato.txt")).is_ok());
        assert!(check_file_type(Path::new("extrato")).is_ok());
        assert!(matches!(
            check_file_type(Path::new("extrato.PDF")),
            Err(FinflowError::UnsupportedFileType(_))
        ));
        assert!(matches!(
            check_file_type(Path::new("extrato.xlsx")),
            Err(FinflowError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_import_file_commits_batch() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::new();
        let mut books = Books::open(&storage).unwrap();
        let path = write_statement(
            dir.path(),
            "extrato.csv",
            "24/10/2023;UBER *TRIP 123;-42,50\n25/10/2023;PIX RECEBIDO;1.000,00\n",
        );
        let summary = import_file(&mut books, &path, Scope::Business, true).unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.logistics, 1);
        assert_eq!(summary.stats.total_income, 1000.0);
        assert_eq!(summary.stats.total_expense, 42.5);
        assert_eq!(summary.date_range, Some((ymd(2023, 10, 24), ymd(2023, 10, 25))));
        assert!(summary.previous_import.is_none());
        assert_eq!(books.ledger.len(), 2);
        assert_eq!(books.logistics.list().len(), 1);
        assert_eq!(books.history.list().len(), 1);
        assert_eq!(books.history.list()[0].filename, "extrato.csv");
    }

    #[test]
    fn test_import_file_no_valid_rows_leaves_ledger_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::new();
        let mut books = Books::open(&storage).unwrap();
        let first = write_statement(dir.path(), "a.csv", "24/10/2023;LOJA;-10,00\n");
        import_file(&mut books, &first, Scope::Business, true).unwrap();
        let before = books.ledger.len();

        let bad = write_statement(
            dir.path(),
            "b.csv",
            "Data;Valor;Descrição\n24/10/2023;Compra sem valor\n",
        );
        let result = import_file(&mut books, &bad, Scope::Business, true);
        assert!(matches!(result, Err(FinflowError::NoValidTransactions)));
        assert_eq!(books.ledger.len(), before);
        assert_eq!(books.history.list().len(), 1);
    }

    #[test]
    fn test_import_file_rejects_pdf_before_reading() {
        let storage = MemoryStorage::new();
        let mut books = Books::open(&storage).unwrap();
        let result = import_file(
            &mut books,
            Path::new("/does/not/exist.pdf"),
            Scope::Business,
            true,
        );
        assert!(matches!(result, Err(FinflowError::UnsupportedFileType(_))));
    }

    #[test]
    fn test_import_file_unreadable_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::new();
        let mut books = Books::open(&storage).unwrap();
        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            import_file(&mut books, &missing, Scope::Business, true),
            Err(FinflowError::UnreadableFile(_))
        ));
        let empty = write_statement(dir.path(), "empty.csv", "\n  \n");
        assert!(matches!(
            import_file(&mut books, &empty, Scope::Business, true),
            Err(FinflowError::UnreadableFile(_))
        ));
    }

    #[test]
    fn test_import_same_file_twice_is_flagged_but_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::new();
        let mut books = Books::open(&storage).unwrap();
        let path = write_statement(dir.path(), "extrato.csv", "24/10/2023;LOJA;-10,00\n");
        let first = import_file(&mut books, &path, Scope::Business, true).unwrap();
        let second = import_file(&mut books, &path, Scope::Business, true).unwrap();
        assert_eq!(second.previous_import.as_deref(), Some(first.import_id.as_str()));
        assert_ne!(first.import_id, second.import_id);
        assert_eq!(books.ledger.len(), 2);
    }

    #[test]
    fn test_undo_last_import_cascades_to_logistics() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::new();
        let mut books = Books::open(&storage).unwrap();
        let a = write_statement(dir.path(), "a.csv", "23/10/2023;UBER *TRIP 1;-20,00\n");
        let b = write_statement(
            dir.path(),
            "b.csv",
            "24/10/2023;UBER *TRIP 2;-30,00\n24/10/2023;PADARIA;-5,00\n",
        );
        let first = import_file(&mut books, &a, Scope::Business, true).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = import_file(&mut books, &b, Scope::Business, true).unwrap();

        let undo = undo_last_import(&mut books).unwrap();
        assert_eq!(undo.import_id, second.import_id);
        assert_eq!(undo.transactions, 2);
        assert_eq!(undo.logistics, 1);
        assert_eq!(books.ledger.len(), 1);
        assert_eq!(books.ledger.last_import_id(), Some(first.import_id.as_str()));
        assert_eq!(books.logistics.list().len(), 1);
        assert_eq!(books.logistics.list()[0].import_id.as_deref(), Some(first.import_id.as_str()));
        assert!(books.history.find(&second.import_id).is_none());
    }

    /// Delegates to memory but refuses writes to one key.
    struct FailingStorage {
        inner: MemoryStorage,
        fail_key: &'static str,
    }

    impl Storage for FailingStorage {
        fn load(&self, key: &str) -> Result<Option<String>> {
            self.inner.load(key)
        }

        fn save(&self, key: &str, value: &str) -> Result<()> {
            if key == self.fail_key {
                return Err(FinflowError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.save(key, value)
        }
    }

    #[test]
    fn test_failed_ledger_write_records_no_history() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FailingStorage {
            inner: MemoryStorage::new(),
            fail_key: TRANSACTIONS_KEY,
        };
        let path = write_statement(dir.path(), "a.csv", "23/10/2023;UBER *TRIP 1;-20,00\n");
        let mut books = Books::open(&storage).unwrap();
        assert!(import_file(&mut books, &path, Scope::Business, true).is_err());

        let reloaded = Books::open(&storage).unwrap();
        assert!(reloaded.history.list().is_empty());
        assert!(reloaded.logistics.list().is_empty());
    }

    #[test]
    fn test_failed_history_write_rolls_back_transactions() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FailingStorage {
            inner: MemoryStorage::new(),
            fail_key: IMPORTS_KEY,
        };
        let path = write_statement(dir.path(), "a.csv", "23/10/2023;UBER *TRIP 1;-20,00\n");
        let mut books = Books::open(&storage).unwrap();
        assert!(import_file(&mut books, &path, Scope::Business, true).is_err());

        let reloaded = Books::open(&storage).unwrap();
        assert_eq!(reloaded.ledger.len(), 0);
        assert!(reloaded.logistics.list().is_empty());
    }

    #[test]
    fn test_undo_with_no_imports() {
        let storage = MemoryStorage::new();
        let mut books = Books::open(&storage).unwrap();
        assert!(matches!(undo_last_import(&mut books), Err(FinflowError::NothingToUndo)));
    }

    #[test]
    fn test_remove_unknown_import() {
        let storage = MemoryStorage::new();
        let mut books = Books::open(&storage).unwrap();
        assert!(matches!(
            remove_import(&mut books, "batch-nope"),
            Err(FinflowError::NotFound { .. })
        ));
    }

    #[test]
    fn test_clear_imports_keeps_manual_entries() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::new();
        let mut books = Books::open(&storage).unwrap();
        books
            .ledger
            .add(Transaction {
                id: "manual-1".to_string(),
                description: "Cachê".to_string(),
                amount: 500.0,
                txn_type: TransactionType::Income,
                category: "Serviço".to_string(),
                date: ymd(2023, 10, 1),
                import_id: None,
                scope: Scope::Business,
            })
            .unwrap();
        let path = write_statement(dir.path(), "a.csv", "23/10/2023;UBER *TRIP 1;-20,00\n");
        import_file(&mut books, &path, Scope::Business, true).unwrap();

        assert_eq!(clear_imports(&mut books).unwrap(), 1);
        assert_eq!(books.ledger.len(), 1);
        assert!(books.logistics.list().is_empty());
        assert!(books.history.list().is_empty());
    }
}
