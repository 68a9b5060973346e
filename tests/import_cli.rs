mod support;

use predicates::str::contains;
use serde_json::Value;

use support::{prio_cmd, TestHome};

#[test]
fn import_prepends_a_block_in_input_order() {
    let home = TestHome::new();
    home.seed_active(&["existing"]);

    prio_cmd(&home)
        .arg("import")
        .write_stdin("first\nsecond\n")
        .assert()
        .success()
        .stdout(contains("Imported 2 tasks"))
        .stdout(contains("placement: top"));

    prio_cmd(&home)
        .arg("list")
        .assert()
        .success()
        .stdout("first\nsecond\nexisting\n");
}

#[test]
fn append_places_the_block_at_the_bottom() {
    let home = TestHome::new();
    home.seed_active(&["existing"]);

    prio_cmd(&home)
        .args(["import", "--append"])
        .write_stdin("first\nsecond\n")
        .assert()
        .success()
        .stdout(contains("placement: bottom"));

    prio_cmd(&home)
        .arg("list")
        .assert()
        .success()
        .stdout("existing\nfirst\nsecond\n");
}

#[test]
fn blank_lines_are_skipped() {
    let home = TestHome::new();

    prio_cmd(&home)
        .arg("import")
        .write_stdin("\n  one  \n\n\ntwo\n")
        .assert()
        .success()
        .stdout(contains("Imported 2 tasks"));

    prio_cmd(&home)
        .arg("list")
        .assert()
        .success()
        .stdout("one\ntwo\n");
}

#[test]
fn overlong_lines_are_cut_with_a_warning() {
    let home = TestHome::new();
    let long = "y".repeat(400);

    prio_cmd(&home)
        .arg("import")
        .write_stdin(format!("{long}\nshort\n"))
        .assert()
        .success()
        .stdout(contains("Warnings:"))
        .stdout(contains("1 summary was longer than 300 characters"));
}

#[test]
fn empty_input_is_a_user_error() {
    let home = TestHome::new();

    prio_cmd(&home)
        .arg("import")
        .write_stdin("\n   \n")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("nothing to import"));
}

#[test]
fn import_respects_capacity() {
    let home = TestHome::new();
    home.write_config("capacity = 3\n");
    home.seed_active(&["a", "b"]);

    prio_cmd(&home)
        .arg("import")
        .write_stdin("c\nd\n")
        .assert()
        .failure()
        .code(3)
        .stderr(contains("Task limit reached (3 active tasks)"));

    // Nothing was written.
    prio_cmd(&home)
        .arg("list")
        .assert()
        .success()
        .stdout("a\nb\n");
}

#[test]
fn import_emits_json_envelope() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();

    let output = prio_cmd(&home)
        .args(["import", "--json"])
        .write_stdin("alpha\nbeta\n")
        .output()?;
    assert!(output.status.success());

    let payload: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(payload["command"], "import");
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["data"]["imported"], 2);
    assert_eq!(payload["data"]["truncated"], 0);
    assert_eq!(payload["data"]["placement"], "top");
    assert_eq!(payload["data"]["ids"].as_array().map(Vec::len), Some(2));
    Ok(())
}
