use chrono::{Duration, Utc};
use prio::store::Store;
use tempfile::TempDir;

fn open_at(dir: &TempDir) -> Store {
    Store::open(&dir.path().join("tasks.db")).expect("open store")
}

#[test]
fn order_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    {
        let mut store = open_at(&dir);
        store.insert_task("bottom", now, now, false).expect("insert");
        store.insert_task("top", now, now, true).expect("insert");
    }

    let store = open_at(&dir);
    let summaries: Vec<String> = store
        .fetch_active(10)
        .expect("fetch")
        .into_iter()
        .map(|t| t.summary)
        .collect();
    assert_eq!(summaries, vec!["top", "bottom"]);
}

#[test]
fn snapshot_rewrite_is_the_order_of_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let ids = {
        let mut store = open_at(&dir);
        store
            .insert_batch(
                &["a".to_string(), "b".to_string(), "c".to_string()],
                now,
                false,
            )
            .expect("insert")
    };

    let store = open_at(&dir);
    store
        .write_sequence(&[ids[2], ids[0], ids[1]])
        .expect("write sequence");
    let summaries: Vec<String> = store
        .fetch_active(10)
        .expect("fetch")
        .into_iter()
        .map(|t| t.summary)
        .collect();
    assert_eq!(summaries, vec!["c", "a", "b"]);
    assert_eq!(store.read_sequence().expect("read"), vec![ids[2], ids[0], ids[1]]);
}

#[test]
fn dangling_ids_are_skipped_but_counted_until_the_next_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let mut store = open_at(&dir);
    let ids = store
        .insert_batch(
            &["a".to_string(), "b".to_string(), "c".to_string()],
            now,
            false,
        )
        .expect("insert");

    store.delete_task(ids[1]).expect("delete");

    // The row is gone; the stale sequence entry hides from fetches but
    // still counts until a snapshot replaces it.
    assert_eq!(store.fetch_active(10).expect("fetch").len(), 2);
    assert_eq!(store.num_active().expect("count"), 3);

    store
        .write_sequence(&[ids[0], ids[2]])
        .expect("write sequence");
    assert_eq!(store.num_active().expect("count"), 2);
}

#[test]
fn archived_rows_drop_out_of_active_fetches() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let mut store = open_at(&dir);
    let ids = store
        .insert_batch(&["a".to_string(), "b".to_string()], now, false)
        .expect("insert");

    store.set_active(ids[0], false, now).expect("archive");

    let summaries: Vec<String> = store
        .fetch_active(10)
        .expect("fetch")
        .into_iter()
        .map(|t| t.summary)
        .collect();
    assert_eq!(summaries, vec!["b"]);
    assert!(store.fetch_active_at(1).expect("fetch").is_none());

    let archived = store.fetch_archived(10).expect("fetch");
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].summary, "a");
    assert!(!archived[0].active);
}

#[test]
fn archived_order_is_most_recently_touched_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let mut store = open_at(&dir);
    let ids = store
        .insert_batch(&["a".to_string(), "b".to_string()], now, false)
        .expect("insert");

    store.set_active(ids[0], false, now).expect("archive");
    store
        .set_active(ids[1], false, now + Duration::seconds(5))
        .expect("archive");

    let summaries: Vec<String> = store
        .fetch_archived(10)
        .expect("fetch")
        .into_iter()
        .map(|t| t.summary)
        .collect();
    assert_eq!(summaries, vec!["b", "a"]);
}
