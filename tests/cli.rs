use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const RAW: &str = "\u{feff}Date;Type;Value;Category;Note\n\
15/01/2024;entrada;-1.000,50;salario;janeiro\n\
20/01/2024;saída;R$ 400,00;aluguel;\n\
03/02/2024;saida;-100,00;;\n\
99/99/2024;saida;10,00;mercado;bad date\n\
10/03/2024;Saida;;mercado;no value\n";

fn finclean(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("finclean").unwrap();
    cmd.current_dir(dir).env("HOME", dir).env_remove("RUST_LOG");
    cmd
}

fn write_raw(dir: &Path, content: &str) {
    let raw_dir = dir.join("data").join("raw");
    std::fs::create_dir_all(&raw_dir).unwrap();
    std::fs::write(raw_dir.join("transactions_raw.csv"), content).unwrap();
}

#[test]
fn clean_writes_canonical_file_and_log() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(dir.path(), RAW);

    finclean(dir.path())
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Clean CSV written to"));

    let clean = std::fs::read_to_string(dir.path().join("data/processed/transactions_clean.csv")).unwrap();
    assert_eq!(
        clean,
        "date,type,value,category,note\n\
         2024-01-15,entrada,1000.50,salario,janeiro\n\
         2024-01-20,saida,-400.00,aluguel,\n\
         2024-02-03,saida,-100.00,outros,\n"
    );

    let log = std::fs::read_to_string(dir.path().join("logs/cleaning.log")).unwrap();
    assert!(log.contains("invalid dates found"));
    assert!(log.contains("rows removed for missing critical data"));
}

#[test]
fn report_prints_summary_from_clean_file() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(dir.path(), RAW);
    finclean(dir.path()).arg("clean").assert().success();

    finclean(dir.path())
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("R$ 1.000,50"))
        .stdout(predicate::str::contains("-R$ 500,00"))
        .stdout(predicate::str::contains("R$ 500,50"))
        .stdout(predicate::str::contains("Monthly average expense: R$ 250,00"));
}

#[test]
fn report_fails_cleanly_when_totals_overflow() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(
        dir.path(),
        "date,type,value\n01/01/2024,entrada,5e28\n02/01/2024,entrada,5e28\n",
    );
    finclean(dir.path()).arg("clean").assert().success();

    finclean(dir.path())
        .arg("report")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Amount overflow"));
}

#[test]
fn fill_empty_months_changes_the_average() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(
        dir.path(),
        "date,type,value\n01/01/2024,saida,300\n01/03/2024,saida,300\n",
    );
    finclean(dir.path()).arg("clean").assert().success();

    finclean(dir.path())
        .args(["report", "--fill-empty-months"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Monthly average expense: R$ 200,00"));
}

#[cfg(feature = "charts")]
#[test]
fn default_run_cleans_reports_and_charts() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(dir.path(), RAW);

    finclean(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Financial Report"))
        .stdout(predicate::str::contains("Pipeline finished."));

    let charts = dir.path().join("reports/charts");
    for name in ["expenses_by_category.pdf", "monthly_expenses.pdf"] {
        let bytes = std::fs::read(charts.join(name)).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "{name} is not a PDF");
    }
}

#[test]
fn missing_type_column_fails_with_column_name() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(dir.path(), "date,value\n01/01/2024,10\n");

    finclean(dir.path())
        .arg("clean")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Column 'type' not found"));
    assert!(!dir.path().join("data/processed/transactions_clean.csv").exists());
}

#[test]
fn reject_policy_aborts_on_unknown_type() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(dir.path(), "date,type,value\n01/01/2024,pix,10\n");

    finclean(dir.path())
        .args(["clean", "--unknown-types", "reject"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown transaction type 'pix' on row 1"));
}

#[test]
fn explicit_paths_and_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("in.csv"), "date,type,value\n05/05/2024,entrada,10\n").unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{"default_category": "misc", "log_dir": "custom-logs"}"#,
    )
    .unwrap();

    finclean(dir.path())
        .args(["clean", "--config", "settings.json", "--input", "in.csv", "--output", "out/clean.csv"])
        .assert()
        .success();

    let clean = std::fs::read_to_string(dir.path().join("out/clean.csv")).unwrap();
    assert_eq!(clean, "date,type,value,category\n2024-05-05,entrada,10,misc\n");
    assert!(dir.path().join("custom-logs/cleaning.log").exists());
}

#[test]
fn config_prints_effective_settings() {
    let dir = tempfile::tempdir().unwrap();
    finclean(dir.path())
        .args(["config", "--unknown-types", "drop"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""unknown_type_policy": "drop""#))
        .stdout(predicate::str::contains(r#""default_category": "outros""#));
}
