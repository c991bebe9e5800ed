//! CLI integration tests for the library binary
//!
//! Each test runs against a fresh library in a temp directory with its own
//! global config directory, so nothing leaks in from the host.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    config_home: TempDir,
}

impl Fixture {
    /// Initializes a library with the default config
    fn new() -> Self {
        let fixture = Self {
            dir: TempDir::new().unwrap(),
            config_home: TempDir::new().unwrap(),
        };
        fixture
            .cmd()
            .arg("init")
            .arg(fixture.dir.path())
            .assert()
            .success();
        fixture
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A command run inside the library with a clean environment
    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("library"));
        cmd.current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env_remove("LIBRARY_BORROWER")
            .env_remove("LIBRARY_ADMIN_USER")
            .env_remove("LIBRARY_ADMIN_PASSWORD");
        cmd
    }

    fn add_book(&self, id: &str, title: &str, author: &str, copies: &str, category: &str) {
        self.cmd()
            .args(["book", "add", "--id", id, "--title", title, "--author", author])
            .args(["--copies", copies, "--category", category])
            .args(["--admin-user", "admin", "--admin-password", "password"])
            .assert()
            .success();
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .cmd()
            .args(args)
            .args(["--format", "json"])
            .assert()
            .success();
        serde_json::from_slice(&output.get_output().stdout).unwrap()
    }
}

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let fixture = Fixture::new();

    assert!(fixture.path().join(".library").is_dir());
    assert!(fixture.path().join(".library/config.toml").is_file());
    assert!(fixture.path().join(".library/.gitignore").is_file());
}

#[test]
fn test_init_prints_location_and_is_idempotent() {
    let fixture = Fixture::new();

    fixture
        .cmd()
        .arg("init")
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized library"));
}

#[test]
fn test_commands_outside_library_fail() {
    let dir = TempDir::new().unwrap();
    let config_home = TempDir::new().unwrap();

    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("library"))
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["book", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a library"));
}

// =============================================================================
// Catalog
// =============================================================================

#[test]
fn test_add_book_requires_admin() {
    let fixture = Fixture::new();

    fixture
        .cmd()
        .args(["book", "add", "--id", "B1", "--title", "Dune", "--author", "Herbert"])
        .args(["--copies", "2", "--category", "SF"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Admin access required"));

    fixture
        .cmd()
        .args(["book", "add", "--id", "B1", "--title", "Dune", "--author", "Herbert"])
        .args(["--copies", "2", "--category", "SF"])
        .args(["--admin-user", "admin", "--admin-password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));

    fixture
        .cmd()
        .args(["book", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No books in library."));
}

#[test]
fn test_add_book_with_env_credentials() {
    let fixture = Fixture::new();

    fixture
        .cmd()
        .env("LIBRARY_ADMIN_USER", "admin")
        .env("LIBRARY_ADMIN_PASSWORD", "password")
        .args(["book", "add", "--id", "B1", "--title", "Dune", "--author", "Herbert"])
        .args(["--copies", "2", "--category", "SF"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Book added successfully"));
}

#[test]
fn test_add_book_rejects_bad_quantity_and_duplicates() {
    let fixture = Fixture::new();

    fixture
        .cmd()
        .args(["book", "add", "--id", "B1", "--title", "Dune", "--author", "Herbert"])
        .args(["--copies", "0", "--category", "SF"])
        .args(["--admin-user", "admin", "--admin-password", "password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Total copies must be positive"));

    fixture.add_book("B1", "Dune", "Herbert", "2", "SF");

    fixture
        .cmd()
        .args(["book", "add", "--id", "B1", "--title", "Other", "--author", "X"])
        .args(["--copies", "5", "--category", "Misc"])
        .args(["--admin-user", "admin", "--admin-password", "password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Book ID already exists: B1"));

    let book = fixture.json(&["book", "show", "B1"]);
    assert_eq!(book["book"]["title"], "Dune");
    assert_eq!(book["book"]["total_copies"], 2);
}

#[test]
fn test_search_is_case_insensitive() {
    let fixture = Fixture::new();
    fixture.add_book("B1", "Dune", "Frank Herbert", "1", "Science Fiction");
    fixture.add_book("B2", "Emma", "Jane Austen", "1", "Classics");

    fixture
        .cmd()
        .args(["search", "author", "AUSTEN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Emma"))
        .stdout(predicate::str::contains("Dune").not());

    let results = fixture.json(&["search", "category", "fiction"]);
    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["id"], "B1");

    fixture
        .cmd()
        .args(["search", "title", "zzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No books found."));
}

// =============================================================================
// Lending
// =============================================================================

#[test]
fn test_lending_scenario() {
    let fixture = Fixture::new();
    fixture.add_book("B1", "Dune", "Frank Herbert", "2", "Science Fiction");

    fixture
        .cmd()
        .args(["borrow", "B1", "--borrower", "Alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Book borrowed successfully by Alice"));
    fixture
        .cmd()
        .args(["borrow", "B1", "--borrower", "Bob"])
        .assert()
        .success();
    fixture
        .cmd()
        .args(["borrow", "B1", "--borrower", "Carol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No copies available: B1"));

    fixture
        .cmd()
        .args(["return", "B1", "--borrower", "Alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No fine."));

    let loans = fixture.json(&["loans"]);
    let loans = loans.as_array().unwrap();
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0]["borrower"], "Bob");
    assert_eq!(loans[0]["title"], "Dune");

    let book = fixture.json(&["book", "show", "B1"]);
    assert_eq!(book["book"]["available_copies"], 1);

    fixture
        .cmd()
        .args(["book", "show", "B1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Available: 1/2"))
        .stdout(predicate::str::contains("On loan: 1"))
        .stdout(predicate::str::contains("No copies on the shelf.").not());

    fixture
        .cmd()
        .args(["borrow", "B1", "--borrower", "Carol"])
        .assert()
        .success();
    fixture
        .cmd()
        .args(["book", "show", "B1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("On loan: 2"))
        .stdout(predicate::str::contains("No copies on the shelf."));
}

#[test]
fn test_return_without_loan_fails() {
    let fixture = Fixture::new();
    fixture.add_book("B1", "Dune", "Herbert", "1", "SF");

    fixture
        .cmd()
        .args(["return", "B1", "--borrower", "Alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No record of Alice borrowing B1"));

    fixture
        .cmd()
        .args(["borrow", "B9", "--borrower", "Alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Book not found: B9"));
}

#[test]
fn test_borrower_comes_from_env() {
    let fixture = Fixture::new();
    fixture.add_book("B1", "Dune", "Herbert", "1", "SF");

    fixture
        .cmd()
        .args(["borrow", "B1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Borrower name required"));

    fixture
        .cmd()
        .env("LIBRARY_BORROWER", "Dana")
        .args(["borrow", "B1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("by Dana"));
}

#[test]
fn test_late_return_is_fined() {
    let fixture = Fixture::new();
    fixture.add_book("B1", "Dune", "Herbert", "1", "SF");

    // A loan that fell due ten days and a few hours ago
    let borrowed = chrono::Utc::now() - chrono::Duration::days(24) - chrono::Duration::hours(3);
    let due = borrowed + chrono::Duration::days(14);
    let loans = serde_json::json!({
        "B1": [{
            "borrower_name": "Alice",
            "borrow_timestamp": borrowed.to_rfc3339(),
            "due_timestamp": due.to_rfc3339(),
        }]
    });
    fs::write(
        fixture.path().join(".library/borrowed.json"),
        serde_json::to_string_pretty(&loans).unwrap(),
    )
    .unwrap();
    let mut books: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(fixture.path().join(".library/books.json")).unwrap(),
    )
    .unwrap();
    books["B1"]["available_copies"] = serde_json::json!(0);
    fs::write(
        fixture.path().join(".library/books.json"),
        serde_json::to_string_pretty(&books).unwrap(),
    )
    .unwrap();

    let overdue = fixture.json(&["loans", "--overdue"]);
    assert_eq!(overdue.as_array().unwrap().len(), 1);

    let receipt = fixture.json(&["return", "B1", "--borrower", "Alice"]);
    assert_eq!(receipt["overdue_days"], 10);
    assert_eq!(receipt["fine"], 10);
}

#[test]
fn test_inconsistent_store_is_rejected() {
    let fixture = Fixture::new();
    fixture.add_book("B1", "Dune", "Herbert", "1", "SF");

    let mut books: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(fixture.path().join(".library/books.json")).unwrap(),
    )
    .unwrap();
    books["B1"]["available_copies"] = serde_json::json!(5);
    fs::write(
        fixture.path().join(".library/books.json"),
        serde_json::to_string(&books).unwrap(),
    )
    .unwrap();

    fixture
        .cmd()
        .args(["book", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("inconsistent"));
}

// =============================================================================
// Interactive menu
// =============================================================================

#[test]
fn test_menu_over_stdin() {
    let fixture = Fixture::new();

    fixture
        .cmd()
        .arg("menu")
        .write_stdin("0\nadmin\npassword\n1\nDune\nFrank Herbert\nB1\n2\nScience Fiction\n5\nB1\nAlice\n8\n9\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Admin login successful."))
        .stdout(predicate::str::contains("Book added successfully."))
        .stdout(predicate::str::contains("Borrowed by: Alice"))
        .stdout(predicate::str::contains("Exiting..."));

    let book = fixture.json(&["book", "show", "B1"]);
    assert_eq!(book["book"]["available_copies"], 1);
    assert_eq!(book["loans"][0]["borrower"], "Alice");
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn test_loan_period_from_config() {
    let fixture = Fixture::new();
    fs::write(
        fixture.path().join(".library/config.toml"),
        "loan_period_days = 7\nfine_per_day = 2\n",
    )
    .unwrap();
    fixture.add_book("B1", "Dune", "Herbert", "1", "SF");

    let receipt = fixture.json(&["borrow", "B1", "--borrower", "Alice"]);
    let borrowed = chrono::DateTime::parse_from_rfc3339(receipt["borrowed_at"].as_str().unwrap()).unwrap();
    let due = chrono::DateTime::parse_from_rfc3339(receipt["due_at"].as_str().unwrap()).unwrap();
    assert_eq!((due - borrowed).num_days(), 7);
}

#[test]
fn test_zero_loan_period_is_rejected() {
    let fixture = Fixture::new();
    fs::write(
        fixture.path().join(".library/config.toml"),
        "loan_period_days = 0\n",
    )
    .unwrap();

    fixture.cmd().args(["book", "list"]).assert().failure();
}

#[test]
fn test_global_default_format() {
    let fixture = Fixture::new();
    let config_dir = fixture.config_home.path().join("library-ledger");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "default_format = \"json\"\n").unwrap();

    let output = fixture.cmd().args(["book", "list"]).assert().success();
    let books: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert!(books.as_array().unwrap().is_empty());
}
