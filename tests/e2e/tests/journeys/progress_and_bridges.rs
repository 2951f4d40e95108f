//! End-to-end journey: the per-project Progress scratchpad and the
//! nil-safe pipeline bridges that write observations on the assistant's
//! behalf (spec.md §4.5, §4.6, §8).

use sdd_memory_core::bridges::{adr, change, sdd};
use sdd_memory_core::{session::progress, Scope, Storage, StoreConfig};

fn storage() -> (Storage, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().unwrap();
    (Storage::open_at(dir.path().join("t.db"), StoreConfig::default()).unwrap(), dir)
}

#[test]
fn progress_dual_behavior_reads_then_upserts() {
    let (storage, _dir) = storage();

    let written = progress(&storage, "p", Some(r#"{"goal":"g"}"#), None).unwrap().unwrap();
    assert_eq!(written.content, r#"{"goal":"g"}"#);
    assert_eq!(written.revision_count, 1);

    let read = progress(&storage, "p", None, None).unwrap().unwrap();
    assert_eq!(read.id, written.id);
    assert_eq!(read.content, r#"{"goal":"g"}"#);

    let overwritten = progress(&storage, "p", Some(r#"{"goal":"g2"}"#), None).unwrap().unwrap();
    assert_eq!(overwritten.id, written.id);
    assert_eq!(overwritten.content, r#"{"goal":"g2"}"#);
    assert_eq!(overwritten.revision_count, 2);
}

#[test]
fn sdd_bridge_upserts_one_observation_per_project_and_stage() {
    let (storage, _dir) = storage();

    sdd::on_stage_complete(Some(&storage), "Widget", "design", "draft one");
    let topic_key = "sdd/widget/design";
    let first = storage.find_by_topic_key(topic_key, Some("Widget"), Scope::Project).unwrap().unwrap();
    assert_eq!(first.revision_count, 1);

    sdd::on_stage_complete(Some(&storage), "Widget", "design", "draft two");
    sdd::on_stage_complete(Some(&storage), "Widget", "design", "draft three");
    let third = storage.find_by_topic_key(topic_key, Some("Widget"), Scope::Project).unwrap().unwrap();
    assert_eq!(third.id, first.id);
    assert_eq!(third.revision_count, 3);
    assert!(third.content.contains("draft three"));
}

#[test]
fn change_bridge_keys_on_project_change_id_and_stage() {
    let (storage, _dir) = storage();

    change::on_stage_complete(Some(&storage), "Widget", "CH-1", "review", "first pass");
    change::on_stage_complete(Some(&storage), "Widget", "CH-2", "review", "other change");

    let ch1 = storage.find_by_topic_key("change/widget/CH-1/review", Some("Widget"), Scope::Project).unwrap();
    let ch2 = storage.find_by_topic_key("change/widget/CH-2/review", Some("Widget"), Scope::Project).unwrap();
    assert!(ch1.is_some());
    assert!(ch2.is_some());
    assert_ne!(ch1.unwrap().id, ch2.unwrap().id);
}

#[test]
fn adr_bridge_overwrites_on_rerender() {
    let (storage, _dir) = storage();

    adr::on_adr_rendered(Some(&storage), "0007", "# Use SQLite\n\nfirst cut");
    adr::on_adr_rendered(Some(&storage), "0007", "# Use SQLite (amended)\n\nsecond cut");

    let record = storage.find_by_topic_key("adr/0007", None, Scope::Project).unwrap().unwrap();
    assert_eq!(record.revision_count, 2);
    assert!(record.content.contains("amended") || record.content.contains("second cut"));
}

#[test]
fn bridges_are_nil_safe_when_storage_is_absent() {
    sdd::on_stage_complete(None, "proj", "design", "artifact");
    change::on_stage_complete(None, "proj", "CH-1", "review", "artifact");
    adr::on_adr_rendered(None, "0001", "# markdown");
}
