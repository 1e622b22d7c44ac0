//! Action log file persistence.

use std::io::Read;

use gachapon::store::action_log::{ActionLog, FileWriter};
use gachapon::store::documents::{ActionEntry, ActionPayload};

fn temp_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "gachapon_test_{tag}_{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn entry(seq: u64) -> ActionEntry {
    ActionEntry {
        seq,
        action_type: "CurrencyEarned".to_string(),
        payload: ActionPayload::CurrencyEarned {
            user_id: 7,
            coins: seq as i64,
            gems: 0,
            reason: "test".to_string(),
        },
        timestamp: format!("{seq}"),
        actor: Some("7".to_string()),
    }
}

#[test]
fn file_writer_writes_and_flushes() {
    let dir = temp_dir("writer");
    let path = dir.join("actions.jsonl");

    let writer = FileWriter::new(path.clone()).expect("create writer");
    for i in 0..3 {
        writer.send(entry(i));
    }
    writer.close();

    let mut contents = String::new();
    std::fs::File::open(&path)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in &lines {
        let _: ActionEntry = serde_json::from_str(line).expect("valid JSON line");
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn file_writer_close_is_idempotent() {
    let dir = temp_dir("close");
    let path = dir.join("actions.jsonl");

    let writer = FileWriter::new(path).expect("create writer");
    writer.close();
    writer.close();
    // A send after close must not panic.
    writer.send(entry(0));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn log_round_trips_through_a_file() {
    let dir = temp_dir("roundtrip");
    let path = dir.join("actions.jsonl");

    let log = ActionLog::new();
    log.set_writer(Some(FileWriter::new(path.clone()).unwrap()));
    for seed in [3u64, 5, 8] {
        log.append("SetSeed", ActionPayload::SetSeed { seed }, None);
    }
    log.shutdown();

    let loaded = ActionLog::load_from_file(&path.to_string_lossy()).expect("load log");
    assert_eq!(loaded.entries().len(), 3);
    assert_eq!(loaded.current_seq(), 3);
    // Appends continue after the highest loaded seq.
    let next = loaded.append("SetSeed", ActionPayload::SetSeed { seed: 13 }, None);
    assert_eq!(next.seq, 4);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn load_skips_blank_lines() {
    let dir = temp_dir("blank");
    let path = dir.join("actions.jsonl");
    let line = serde_json::to_string(&entry(1)).unwrap();
    std::fs::write(&path, format!("{line}\n\n\n")).unwrap();

    let loaded = ActionLog::load_from_file(&path.to_string_lossy()).expect("load log");
    assert_eq!(loaded.entries().len(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn load_rejects_corrupt_lines() {
    let dir = temp_dir("corrupt");
    let path = dir.join("actions.jsonl");
    std::fs::write(&path, "not json\n").unwrap();
    assert!(ActionLog::load_from_file(&path.to_string_lossy()).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
