//! Merge, persistence and discovery behaviour of on-disk topic stores.

use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use docket_core::{CorruptStorePolicy, Document, DocumentBody, Error, ProductInfo};
use docket_store::{find_by_id, list_topics, load_collection, LoadOutcome, TopicStore};

const FILE: &str = "fda_info.json";

fn recall(id: &str, title: &str) -> Document {
    Document {
        id: id.into(),
        title: title.into(),
        summary: String::new(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        retrieved_date: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        url: None,
        key_points: Vec::new(),
        tables: Vec::new(),
        body: DocumentBody::Recall {
            product_info: ProductInfo {
                product_name: title.into(),
                ..Default::default()
            },
        },
    }
}

fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn test_first_merge_creates_topic() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);

    let ids = store
        .merge("Recalls", vec![recall("r1", "Widget"), recall("r2", "Gadget")])
        .unwrap();

    assert_eq!(ids, vec!["r1", "r2"]);
    let path = dir.path().join("recalls").join(FILE);
    assert!(path.is_file());
    assert!(!dir.path().join("recalls").join("fda_info.json.tmp").exists());

    let LoadOutcome::Loaded(collection) = load_collection(&path).unwrap() else {
        panic!("collection should load");
    };
    assert_eq!(collection.len(), 2);
}

#[test]
fn test_merge_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);
    let batch = vec![recall("r1", "Widget"), recall("r2", "Gadget")];

    store.merge("recalls", batch.clone()).unwrap();
    let once = read_file(&store.collection_path("recalls").unwrap());

    store.merge("recalls", batch).unwrap();
    let twice = read_file(&store.collection_path("recalls").unwrap());

    assert_eq!(once, twice);
}

#[test]
fn test_later_batch_replaces_whole_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);

    let mut first = recall("recall_1_20240101", "Widget");
    if let DocumentBody::Recall { product_info } = &mut first.body {
        product_info.recall_number = "F-0001-2024".into();
    }
    store.merge("recalls", vec![first]).unwrap();
    store
        .merge("recalls", vec![recall("recall_1_20240101", "Widget v2")])
        .unwrap();

    let LoadOutcome::Loaded(collection) = store.load("recalls").unwrap() else {
        panic!("collection should load");
    };
    assert_eq!(collection.len(), 1);
    let doc = &collection["recall_1_20240101"];
    assert_eq!(doc.title, "Widget v2");
    // No field-level merge: the old recall number is gone.
    assert_eq!(doc.product_info().unwrap().recall_number, "");
}

#[test]
fn test_duplicate_ids_in_batch_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);

    let ids = store
        .merge("recalls", vec![recall("r1", "A"), recall("r1", "B")])
        .unwrap();

    assert_eq!(ids, vec!["r1"]);
    let LoadOutcome::Loaded(collection) = store.load("recalls").unwrap() else {
        panic!("collection should load");
    };
    assert_eq!(collection["r1"].title, "B");
}

#[test]
fn test_corrupt_store_is_reset() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);
    let path = store.collection_path("recalls").unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{\"r0\": {\"truncated").unwrap();

    let ids = store.merge("recalls", vec![recall("r1", "Widget")]).unwrap();

    assert_eq!(ids, vec!["r1"]);
    let LoadOutcome::Loaded(collection) = store.load("recalls").unwrap() else {
        panic!("collection should load");
    };
    assert_eq!(collection.keys().collect::<Vec<_>>(), vec!["r1"]);
}

#[test]
fn test_corrupt_store_refused_under_fail_policy() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE).with_corrupt_policy(CorruptStorePolicy::Fail);
    let path = store.collection_path("recalls").unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "not json at all").unwrap();

    let result = store.merge("recalls", vec![recall("r1", "Widget")]);

    assert!(matches!(result, Err(Error::CorruptStore { .. })));
    assert_eq!(read_file(&path), "not json at all");
}

#[test]
fn test_failed_persist_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);
    store.merge("recalls", vec![recall("r1", "Widget")]).unwrap();
    let path = store.collection_path("recalls").unwrap();
    let before = read_file(&path);

    // A directory squatting on the temp path makes the write fail.
    let tmp = path.with_file_name("fda_info.json.tmp");
    std::fs::create_dir(&tmp).unwrap();

    let result = store.merge("recalls", vec![recall("r2", "Gadget")]);
    assert!(result.is_err());
    assert_eq!(read_file(&path), before);

    std::fs::remove_dir(&tmp).unwrap();
    let ids = store.merge("recalls", vec![recall("r2", "Gadget")]).unwrap();
    assert_eq!(ids, vec!["r2"]);
    assert!(!tmp.exists());
}

#[test]
fn test_stale_temp_file_does_not_survive_next_merge() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);
    store.merge("recalls", vec![recall("r1", "Widget")]).unwrap();
    let path = store.collection_path("recalls").unwrap();
    let before = read_file(&path);

    // Simulate a crash after the temp file was written but before rename.
    let tmp = path.with_file_name("fda_info.json.tmp");
    std::fs::write(&tmp, "{\"half\": ").unwrap();
    assert_eq!(read_file(&path), before);

    store.merge("recalls", vec![recall("r2", "Gadget")]).unwrap();
    assert!(!tmp.exists());
    let LoadOutcome::Loaded(collection) = store.load("recalls").unwrap() else {
        panic!("collection should load");
    };
    assert_eq!(collection.len(), 2);
}

#[test]
fn test_empty_batch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);

    let ids = store.merge("drugs", Vec::new()).unwrap();

    assert!(ids.is_empty());
    assert!(dir.path().join("drugs").is_dir());
    assert!(!dir.path().join("drugs").join(FILE).exists());
    assert!(list_topics(dir.path(), FILE).is_empty());
}

#[test]
fn test_invalid_topic_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);
    assert!(matches!(
        store.merge("  ", vec![recall("r1", "Widget")]),
        Err(Error::InvalidTopic(_))
    ));
}

#[test]
fn test_concurrent_merges_on_one_topic_keep_every_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);

    std::thread::scope(|s| {
        for worker in 0..4 {
            let store = &store;
            s.spawn(move || {
                for n in 0..5 {
                    let id = format!("w{}_{}", worker, n);
                    store.merge("recalls", vec![recall(&id, "Widget")]).unwrap();
                }
            });
        }
    });

    let LoadOutcome::Loaded(collection) = store.load("recalls").unwrap() else {
        panic!("collection should load");
    };
    assert_eq!(collection.len(), 20);
}

#[test]
fn test_catalog_and_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);
    store.merge("recalls", vec![recall("r1", "Widget")]).unwrap();
    store.merge("food", vec![recall("f1", "Cheese")]).unwrap();
    store.merge("peanut allergy", vec![recall("g1", "Cookies")]).unwrap();

    let mut topics = store.list_topics();
    topics.sort();
    assert_eq!(topics, vec!["food", "peanut_allergy", "recalls"]);

    let found = store.find_by_id("f1").unwrap();
    assert_eq!(found.topic, "food");
    assert_eq!(found.document.title, "Cheese");

    assert!(find_by_id(dir.path(), FILE, "nonexistent").is_none());
}

#[test]
fn test_lookup_skips_unreadable_topics() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);
    store.merge("recalls", vec![recall("r1", "Widget")]).unwrap();
    std::fs::create_dir_all(dir.path().join("broken")).unwrap();
    std::fs::write(dir.path().join("broken").join(FILE), "[[[").unwrap();

    assert_eq!(store.find_by_id("r1").unwrap().topic, "recalls");
    assert!(store.find_by_id("missing").is_none());
}

#[test]
fn test_non_ascii_topics_get_separate_stores() {
    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path(), FILE);

    store.merge("日本", vec![recall("jp1", "Widget")]).unwrap();
    store.merge("中国", vec![recall("cn1", "Gadget")]).unwrap();

    let LoadOutcome::Loaded(japan) = store.load("日本").unwrap() else {
        panic!("collection should load");
    };
    assert_eq!(japan.keys().collect::<Vec<_>>(), vec!["jp1"]);
    let mut topics = store.list_topics();
    topics.sort();
    assert_eq!(topics, vec!["中国".to_string(), "日本".to_string()]);
}
