use caravan::memory_log::{MemoryKind, MemoryLog};
use std::fs;

#[test]
fn entries_round_trip_across_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut log = MemoryLog::open(dir.path(), "demo_user").unwrap();
        log.append(MemoryKind::Preference, "Prefers beach destinations")
            .unwrap();
        log.append(MemoryKind::Fact, "Travels from London").unwrap();
        assert_eq!(log.entries().len(), 2);
    }

    let log = MemoryLog::open(dir.path(), "demo_user").unwrap();
    assert_eq!(log.entries().len(), 2);
    assert_eq!(log.entries()[0].index, 0);
    assert_eq!(log.entries()[0].content, "Prefers beach destinations");
    assert_eq!(log.entries()[1].kind, MemoryKind::Fact);
    assert!(log.verify_integrity());
}

#[test]
fn logs_are_scoped_per_user() {
    let dir = tempfile::tempdir().unwrap();

    let mut alice = MemoryLog::open(dir.path(), "alice").unwrap();
    alice.append(MemoryKind::Fact, "Lives in Tunis").unwrap();

    let bob = MemoryLog::open(dir.path(), "bob").unwrap();
    assert!(bob.entries().is_empty());
    assert!(dir.path().join("alice.jsonl").exists());
}

#[test]
fn hash_chain_links_consecutive_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = MemoryLog::open(dir.path(), "u").unwrap();
    log.append(MemoryKind::Fact, "one").unwrap();
    log.append(MemoryKind::Fact, "two").unwrap();
    log.append(MemoryKind::Fact, "three").unwrap();

    let entries = log.entries();
    assert_eq!(entries[0].prev_hash, "");
    assert_eq!(entries[1].prev_hash, entries[0].hash);
    assert_eq!(entries[2].prev_hash, entries[1].hash);
}

#[test]
fn tampering_is_detected_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = {
        let mut log = MemoryLog::open(dir.path(), "victim").unwrap();
        log.append(MemoryKind::Fact, "original content").unwrap();
        log.append(MemoryKind::Fact, "second entry").unwrap();
        assert!(log.verify_integrity());
        log.file_path().to_path_buf()
    };

    // Rewrite the first line's content without recomputing hashes
    let tampered = fs::read_to_string(&path)
        .unwrap()
        .replace("original content", "forged content");
    fs::write(&path, tampered).unwrap();

    let log = MemoryLog::open(dir.path(), "victim").unwrap();
    assert!(!log.verify_integrity());
}

#[test]
fn recall_prompt_contains_every_memory() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = MemoryLog::open(dir.path(), "demo_user").unwrap();

    assert_eq!(log.recall_prompt(), "");

    log.append(MemoryKind::Preference, "Prefers beach destinations")
        .unwrap();
    log.append(MemoryKind::Fact, "Budget around £2000").unwrap();
    log.append(MemoryKind::SessionSummary, "Booked Djerba last spring")
        .unwrap();

    let prompt = log.recall_prompt();
    assert!(prompt.contains("demo_user"));
    assert!(prompt.contains("(preference) Prefers beach destinations"));
    assert!(prompt.contains("(fact) Budget around £2000"));
    assert!(prompt.contains("(session summary) Booked Djerba last spring"));
}
