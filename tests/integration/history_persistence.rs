//! History cache backed by sled on disk

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use quill::history::{
    HistoryBackend, HistoryCache, HistoryItem, SledHistoryBackend, HISTORY_CAPACITY,
};
use quill::types::GenerationRequest;

use crate::integration::test_utils::sample_result;

fn item(topic: &str, minute: i64) -> HistoryItem {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minute);
    HistoryItem::new(
        GenerationRequest::new(topic, "linkedin", "professional"),
        sample_result(topic),
        at,
    )
}

fn open_cache(dir: &TempDir) -> HistoryCache<SledHistoryBackend> {
    HistoryCache::open(SledHistoryBackend::open(dir.path().join("history")).unwrap())
}

#[test]
fn test_history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let ids: Vec<String> = {
        let mut cache = open_cache(&dir);
        let first = item("first topic", 0);
        let second = item("second topic", 1);
        let ids = vec![second.id.clone(), first.id.clone()];
        cache.add(first);
        cache.add(second);
        ids
    };

    let cache = open_cache(&dir);
    let reopened: Vec<&str> = cache.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(reopened, ids);
    assert_eq!(cache.items()[0].request.topic, "second topic");
    assert_eq!(cache.items()[0].timestamp, "2024-03-01T09:01:00.000Z");
}

#[test]
fn test_capacity_is_enforced_on_disk() {
    let dir = TempDir::new().unwrap();
    let oldest_id;
    {
        let mut cache = open_cache(&dir);
        let oldest = item("topic 0", 0);
        oldest_id = oldest.id.clone();
        cache.add(oldest);
        for n in 1..=HISTORY_CAPACITY as i64 {
            cache.add(item(&format!("topic {}", n), n));
        }
        assert_eq!(cache.len(), HISTORY_CAPACITY);
    }

    let cache = open_cache(&dir);
    assert_eq!(cache.len(), HISTORY_CAPACITY);
    assert!(cache.get(&oldest_id).is_none());
    assert_eq!(
        cache.items()[0].request.topic,
        format!("topic {}", HISTORY_CAPACITY)
    );
}

#[test]
fn test_remove_and_clear_persist() {
    let dir = TempDir::new().unwrap();
    let kept_id;
    {
        let mut cache = open_cache(&dir);
        let keep = item("keep me", 0);
        let gone = item("drop me", 1);
        kept_id = keep.id.clone();
        let gone_id = gone.id.clone();
        cache.add(keep);
        cache.add(gone);
        assert!(cache.remove(&gone_id));
        assert!(!cache.remove("gen-does-not-exist"));
    }

    {
        let mut cache = open_cache(&dir);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&kept_id).is_some());
        cache.clear();
        assert!(cache.backend().read().unwrap().is_none());
    }

    assert!(open_cache(&dir).is_empty());
}

#[test]
fn test_corrupt_store_loads_empty_and_recovers() {
    let dir = TempDir::new().unwrap();
    {
        let backend = SledHistoryBackend::open(dir.path().join("history")).unwrap();
        backend.write(b"{ definitely not a history list").unwrap();
    }

    let mut cache = open_cache(&dir);
    assert!(cache.is_empty());

    cache.add(item("fresh start", 0));
    drop(cache);

    let cache = open_cache(&dir);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_exported_report_matches_item() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir);
    cache.add(item("export me", 0));

    let stored = &cache.items()[0];
    let text = stored.export_text();
    assert!(text.contains("Topic: export me"));
    assert!(text.contains("Here is what we learned about export me."));
    assert!(text.contains("Image: /images/generated.png"));

    let filename = stored.export_filename();
    assert!(filename.starts_with("content_export_me_"), "got {}", filename);
    assert!(filename.ends_with(".txt"));
}
