mod support;

use serde_json::Value;

use support::{prio_cmd, TestHome};

#[test]
fn list_prints_summaries_in_priority_order() {
    let home = TestHome::new();
    let ids = home.seed_active(&["a", "b", "c"]);

    // The persisted sequence is the order of record, not insertion order.
    let store = home.open_store();
    store
        .write_sequence(&[ids[2], ids[0], ids[1]])
        .expect("write sequence");
    drop(store);

    prio_cmd(&home)
        .arg("list")
        .assert()
        .success()
        .stdout("c\na\nb\n");
}

#[test]
fn limit_caps_output() {
    let home = TestHome::new();
    home.seed_active(&["a", "b", "c"]);

    prio_cmd(&home)
        .args(["list", "-n", "2"])
        .assert()
        .success()
        .stdout("a\nb\n");
}

#[test]
fn empty_list_prints_nothing() {
    let home = TestHome::new();

    prio_cmd(&home).arg("list").assert().success().stdout("");
}

#[test]
fn quiet_prints_nothing() {
    let home = TestHome::new();
    home.seed_active(&["a"]);

    prio_cmd(&home)
        .args(["list", "--quiet"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn json_envelope_reports_count_and_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    home.seed_active(&["first", "second"]);

    let output = prio_cmd(&home).args(["list", "--json"]).output()?;
    assert!(output.status.success());

    let payload: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(payload["command"], "list");
    assert_eq!(payload["data"]["count"], 2);
    assert_eq!(payload["data"]["tasks"][0]["summary"], "first");
    assert_eq!(payload["data"]["tasks"][0]["active"], true);
    assert_eq!(payload["data"]["tasks"][1]["summary"], "second");
    Ok(())
}
