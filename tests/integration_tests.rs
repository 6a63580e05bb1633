//! Integration tests for the fieldtrack CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a fieldtrack command
fn fieldtrack() -> Command {
    Command::cargo_bin("fieldtrack").unwrap()
}

/// Helper to create a workspace in a temp directory
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fieldtrack()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

fn register_store(tmp: &TempDir, name: &str, category: &str) {
    fieldtrack()
        .current_dir(tmp.path())
        .args(["store", "new", "--name", name, "--category", category])
        .assert()
        .success();
}

// ============================================================================
// Basics
// ============================================================================

#[test]
fn test_help_displays() {
    // --help prints the long description
    fieldtrack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tracking store registrations"));

    // -h prints the one-line summary
    fieldtrack()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("visit tracking"));
}

#[test]
fn test_init_creates_structure() {
    let tmp = setup_workspace();

    assert!(tmp.path().join(".fieldtrack/config.yaml").exists());
    assert!(tmp.path().join("stores").is_dir());
    assert!(tmp.path().join("visits").is_dir());
    assert!(tmp.path().join("team").is_dir());
    assert!(tmp.path().join("lists/products.yaml").exists());
    assert!(tmp.path().join("lists/salespersons.yaml").exists());
}

#[test]
fn test_init_twice_reports_existing() {
    let tmp = setup_workspace();
    fieldtrack()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_outside_workspace_fail() {
    let tmp = TempDir::new().unwrap();
    fieldtrack()
        .current_dir(tmp.path())
        .args(["store", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a fieldtrack workspace"));
}

// ============================================================================
// Stores
// ============================================================================

#[test]
fn test_store_new_and_list() {
    let tmp = setup_workspace();
    register_store(&tmp, "Pet Paradise", "vet");

    fieldtrack()
        .current_dir(tmp.path())
        .args(["store", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pet Paradise"));

    fieldtrack()
        .current_dir(tmp.path())
        .args(["store", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

#[test]
fn test_store_list_category_filter() {
    let tmp = setup_workspace();
    register_store(&tmp, "City Vets", "vet");
    register_store(&tmp, "Happy Tails", "pet_store");

    fieldtrack()
        .current_dir(tmp.path())
        .args(["store", "list", "--category", "vet", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_store_show_by_name_fragment() {
    let tmp = setup_workspace();
    register_store(&tmp, "Pet Paradise", "pet_store");

    fieldtrack()
        .current_dir(tmp.path())
        .args(["store", "show", "paradise"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pet Paradise"));
}

#[test]
fn test_store_rm_force() {
    let tmp = setup_workspace();
    register_store(&tmp, "Doomed Pets", "pet_store");

    fieldtrack()
        .current_dir(tmp.path())
        .args(["store", "rm", "doomed", "--force"])
        .assert()
        .success();

    fieldtrack()
        .current_dir(tmp.path())
        .args(["store", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No stores found"));
}

// ============================================================================
// Visits and the opened-account rule
// ============================================================================

#[test]
fn test_visit_new_and_list() {
    let tmp = setup_workspace();
    register_store(&tmp, "Pet Paradise", "vet");

    fieldtrack()
        .current_dir(tmp.path())
        .args([
            "visit",
            "new",
            "--store",
            "paradise",
            "--status",
            "visited",
            "--product",
            "EVFA PRO",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged visit"));

    fieldtrack()
        .current_dir(tmp.path())
        .args(["visit", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pet Paradise"));
}

#[test]
fn test_unsessioned_visit_stamps_configured_author() {
    let tmp = setup_workspace();
    register_store(&tmp, "Pet Paradise", "vet");

    // No login session: the configured author is recorded instead
    fieldtrack()
        .current_dir(tmp.path())
        .env("FIELDTRACK_AUTHOR", "Jane Rep")
        .args(["visit", "new", "--store", "paradise", "--status", "visited"])
        .assert()
        .success();

    fieldtrack()
        .current_dir(tmp.path())
        .args(["visit", "show", "@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane Rep"));
}

#[test]
fn test_opened_account_is_one_time() {
    let tmp = setup_workspace();
    register_store(&tmp, "City Vets", "vet");

    fieldtrack()
        .current_dir(tmp.path())
        .args([
            "visit", "new", "--store", "city", "--status", "opened_account",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Account opened"));

    // A second opened_account for the same store is rejected
    fieldtrack()
        .current_dir(tmp.path())
        .args([
            "visit", "new", "--store", "city", "--status", "opened_account",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available"));

    // ex_customer is now offered instead
    fieldtrack()
        .current_dir(tmp.path())
        .args(["visit", "statuses", "city"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ex_customer"))
        .stdout(predicate::str::contains("opened_account").not());
}

// ============================================================================
// Import
// ============================================================================

#[test]
fn test_import_stores_twice_is_idempotent() {
    let tmp = setup_workspace();
    let csv_path = tmp.path().join("stores.csv");
    fs::write(
        &csv_path,
        "name,category,state\nPet Paradise,VET_CLINIC,Selangor\nCity Pets,PET_STORE,Penang\n",
    )
    .unwrap();

    fieldtrack()
        .current_dir(tmp.path())
        .args(["import", "stores", "stores.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stores added:   2"));

    fieldtrack()
        .current_dir(tmp.path())
        .args(["import", "stores", "stores.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stores added:   0"))
        .stdout(predicate::str::contains("Stores updated: 2"));

    fieldtrack()
        .current_dir(tmp.path())
        .args(["store", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_import_store_visits_creates_both() {
    let tmp = setup_workspace();
    let csv_path = tmp.path().join("visits.csv");
    fs::write(
        &csv_path,
        "name,category,date,visitStatus,productsPromoted\n\
         Pet Paradise,VET,2024-04-20,visited;opened_account,EVFA PRO;EVFA Cap\n",
    )
    .unwrap();

    fieldtrack()
        .current_dir(tmp.path())
        .args(["import", "store-visits", "visits.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stores added:   1"))
        .stdout(predicate::str::contains("Visits logged:  1"));

    fieldtrack()
        .current_dir(tmp.path())
        .args(["visit", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_import_dry_run_writes_nothing() {
    let tmp = setup_workspace();
    let csv_path = tmp.path().join("stores.csv");
    fs::write(&csv_path, "name,category\nGhost Pets,PET_STORE\n").unwrap();

    fieldtrack()
        .current_dir(tmp.path())
        .args(["import", "stores", "stores.csv", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run complete"));

    fieldtrack()
        .current_dir(tmp.path())
        .args(["store", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_import_template() {
    fieldtrack()
        .args(["import", "stores", "--template"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name,category"));
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_stores() {
    let tmp = setup_workspace();
    register_store(&tmp, "Pet, Paradise", "vet");

    fieldtrack()
        .current_dir(tmp.path())
        .args(["export", "stores"])
        .assert()
        .success();

    let content = fs::read_to_string(tmp.path().join("stores.csv")).unwrap();
    assert!(content.starts_with("id,name,category"));
    // Comma in the name gets quote-wrapped
    assert!(content.contains("\"Pet, Paradise\""));
}

#[test]
fn test_export_empty_collection_writes_no_file() {
    let tmp = setup_workspace();

    fieldtrack()
        .current_dir(tmp.path())
        .args(["export", "visits"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to export"));
    assert!(!tmp.path().join("visits.csv").exists());
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_report_summary_fixed_date_json() {
    let tmp = setup_workspace();
    register_store(&tmp, "Pet Paradise", "vet");
    fieldtrack()
        .current_dir(tmp.path())
        .args([
            "visit",
            "new",
            "--store",
            "paradise",
            "--date",
            "2024-05-07",
            "--status",
            "opened_account",
        ])
        .assert()
        .success();

    // 2024-05-08 falls in the same Monday-to-Sunday week as the visit
    fieldtrack()
        .current_dir(tmp.path())
        .args([
            "report", "summary", "--at", "2024-05-08", "-f", "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_visits\": 1"))
        .stdout(predicate::str::contains("\"conversion_rate\": 1.0"));

    // The week after sees nothing
    fieldtrack()
        .current_dir(tmp.path())
        .args([
            "report", "summary", "--at", "2024-05-15", "-f", "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_visits\": 0"));
}

#[test]
fn test_report_universe_coverage() {
    let tmp = setup_workspace();
    register_store(&tmp, "Visited Vet", "vet");
    register_store(&tmp, "Untouched Pets", "pet_store");
    fieldtrack()
        .current_dir(tmp.path())
        .args(["visit", "new", "--store", "visited", "--status", "visited"])
        .assert()
        .success();

    fieldtrack()
        .current_dir(tmp.path())
        .args(["report", "universe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Universe Tracking"))
        .stdout(predicate::str::contains("50.00%"));
}

// ============================================================================
// Registries and team
// ============================================================================

#[test]
fn test_product_registry_seeded_and_editable() {
    let tmp = setup_workspace();

    fieldtrack()
        .current_dir(tmp.path())
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EVFA PRO"));

    fieldtrack()
        .current_dir(tmp.path())
        .args(["product", "add", "New Line"])
        .assert()
        .success();

    fieldtrack()
        .current_dir(tmp.path())
        .args(["product", "add", "New Line"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_user_login_logout_flow() {
    let tmp = setup_workspace();

    fieldtrack()
        .current_dir(tmp.path())
        .args([
            "user",
            "add",
            "--name",
            "Demo Admin",
            "--email",
            "admin@demo.com",
            "--role",
            "admin",
            "--password",
            "admin123",
        ])
        .assert()
        .success();

    // Duplicate email is rejected
    fieldtrack()
        .current_dir(tmp.path())
        .args([
            "user",
            "add",
            "--name",
            "Other",
            "--email",
            "Admin@Demo.com",
            "--role",
            "sales",
            "--password",
            "x",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    fieldtrack()
        .current_dir(tmp.path())
        .args(["user", "login", "admin@demo.com", "--password", "wrong"])
        .assert()
        .failure();

    fieldtrack()
        .current_dir(tmp.path())
        .args(["user", "login", "admin@demo.com", "--password", "admin123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as"));

    fieldtrack()
        .current_dir(tmp.path())
        .args(["user", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo Admin"));

    fieldtrack()
        .current_dir(tmp.path())
        .args(["user", "logout"])
        .assert()
        .success();

    fieldtrack()
        .current_dir(tmp.path())
        .args(["user", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}
