use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STATEMENT: &str = "\
Data;Descrição;Valor
24/10/2023;UBER *TRIP 123;-42,50
24/10/2023;Compra sem valor
25/10/2023;PIX RECEBIDO CLIENTE;1.500,00
26/10/2023;IFOOD *LANCHE;-35,90
";

fn finflow(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("finflow").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn setup() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    let data_dir = home.path().join("data");
    finflow(home.path())
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized finflow"));
    home
}

fn write_file(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn init_creates_settings_and_database() {
    let home = setup();
    assert!(home.path().join(".config/finflow/settings.json").exists());
    assert!(home.path().join("data/finflow.db").exists());
}

#[test]
fn import_reports_counts() {
    let home = setup();
    let file = write_file(home.path(), "extrato.csv", STATEMENT);
    finflow(home.path())
        .args(["import", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 transações importadas."))
        .stdout(predicate::str::contains("1 lançamentos de Uber identificados."));

    finflow(home.path())
        .args(["transactions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uber Trip 123"))
        .stdout(predicate::str::contains("Transporte"));

    finflow(home.path())
        .args(["logistics", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uber Importado: 2023-10-24"));
}

#[test]
fn personal_import_derives_no_logistics() {
    let home = setup();
    let file = write_file(home.path(), "extrato.csv", STATEMENT);
    finflow(home.path())
        .args(["import", &file, "--scope", "personal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 transações importadas."))
        .stdout(predicate::str::contains("Uber identificados").not());
}

#[test]
fn reimport_warns_about_duplicate() {
    let home = setup();
    let file = write_file(home.path(), "extrato.csv", STATEMENT);
    finflow(home.path()).args(["import", &file]).assert().success();
    finflow(home.path())
        .args(["import", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("already imported"));
}

#[test]
fn undo_removes_last_batch() {
    let home = setup();
    let file = write_file(home.path(), "extrato.csv", STATEMENT);
    finflow(home.path()).args(["import", &file]).assert().success();
    finflow(home.path())
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 transactions, 1 logistics records"));
    finflow(home.path())
        .arg("undo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No imports to undo"));
}

#[test]
fn pdf_is_rejected() {
    let home = setup();
    let file = write_file(home.path(), "extrato.pdf", "%PDF-1.4");
    finflow(home.path())
        .args(["import", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type: pdf"));
}

#[test]
fn no_valid_rows_is_an_error() {
    let home = setup();
    let file = write_file(
        home.path(),
        "vazio.csv",
        "Data;Valor;Descrição\n24/10/2023;Compra sem valor\n",
    );
    finflow(home.path())
        .args(["import", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not identify valid transactions"));
}

#[test]
fn report_filters_by_type() {
    let home = setup();
    let file = write_file(home.path(), "extrato.csv", STATEMENT);
    finflow(home.path()).args(["import", &file]).assert().success();
    finflow(home.path())
        .args(["report", "--type", "income"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pix Recebido Cliente"))
        .stdout(predicate::str::contains("Ifood Lanche").not());
}

#[test]
fn rules_apply_to_later_imports() {
    let home = setup();
    finflow(home.path())
        .args(["rules", "add", "IFOOD", "--category", "Alimentação Equipe"])
        .assert()
        .success();
    let file = write_file(home.path(), "extrato.csv", STATEMENT);
    finflow(home.path()).args(["import", &file]).assert().success();
    finflow(home.path())
        .args(["transactions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alimentação Equipe"));
}

#[test]
fn logistics_add_records_shipping() {
    let home = setup();
    finflow(home.path())
        .args([
            "logistics",
            "add",
            "Motoboy Locadora",
            "35.50",
            "--type",
            "shipping",
            "--date",
            "2024-03-09",
            "--attachment",
            "recibo.pdf",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added logistics record"));
    finflow(home.path())
        .args(["logistics", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Motoboy Locadora"))
        .stdout(predicate::str::contains("09/03/2024"))
        .stdout(predicate::str::contains("Shipping R$ 35,50 (1, 100%)"));
}

#[test]
fn logistics_add_rejects_unknown_type() {
    let home = setup();
    finflow(home.path())
        .args(["logistics", "add", "Taxi", "20", "--type", "taxi"])
        .assert()
        .failure();
}

#[test]
fn costs_edit_changes_fields() {
    let home = setup();
    let output = finflow(home.path())
        .args(["costs", "add", "Aluguel", "2500", "--category", "Infraestrutura", "--day", "5"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    let id = stdout
        .split_whitespace()
        .nth(2)
        .unwrap()
        .trim_end_matches(':')
        .to_string();

    finflow(home.path())
        .args(["costs", "edit", &id, "--amount", "2750", "--day", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R$ 2.750,00 on day 10"));
    finflow(home.path())
        .args(["costs", "edit", &id, "--day", "40"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("day of month must be between 1 and 31"));
    finflow(home.path())
        .args(["costs", "edit", "cost-missing", "--day", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown cost: cost-missing"));
}

#[test]
fn transactions_clear_empties_ledger() {
    let home = setup();
    let file = write_file(home.path(), "extrato.csv", STATEMENT);
    finflow(home.path()).args(["import", &file]).assert().success();
    finflow(home.path())
        .args(["transactions", "add", "Venda Câmera", "800", "--type", "income"])
        .args(["--category", "Equipamento"])
        .assert()
        .success();
    finflow(home.path())
        .args(["transactions", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 4 transactions."));
    finflow(home.path())
        .args(["transactions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Venda Câmera").not())
        .stdout(predicate::str::contains("Uber Trip 123").not());
}

#[test]
fn manual_dates_reject_trailing_text() {
    let home = setup();
    finflow(home.path())
        .args(["transactions", "add", "Lanche", "12", "--type", "expense"])
        .args(["--category", "Alimentação", "--date", "2024-03-09garbage"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date: 2024-03-09garbage"));
}
