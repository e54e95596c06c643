use super::*;

fn memory_tokens() -> (Arc<MemoryStore>, TokenStore) {
    let store = Arc::new(MemoryStore::new());
    let tokens = TokenStore::new(store.clone());
    (store, tokens)
}

// =============================================================================
// MemoryStore / TokenStore
// =============================================================================

#[test]
fn token_absent_by_default() {
    let (_, tokens) = memory_tokens();
    assert_eq!(tokens.get(), None);
    assert!(!tokens.has_token());
}

#[test]
fn token_set_get_clear() {
    let (store, tokens) = memory_tokens();
    tokens.set("abc.def").unwrap();
    assert_eq!(tokens.get().as_deref(), Some("abc.def"));
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc.def"));

    tokens.clear();
    assert_eq!(tokens.get(), None);
    tokens.clear();
    assert_eq!(tokens.get(), None);
}

#[test]
fn empty_token_reads_as_absent() {
    let (store, tokens) = memory_tokens();
    store.set(ACCESS_TOKEN_KEY, "").unwrap();
    assert_eq!(tokens.get(), None);
}

#[test]
fn restore_puts_back_previous_state() {
    let (_, tokens) = memory_tokens();
    tokens.set("new").unwrap();
    tokens.restore(Some("old"));
    assert_eq!(tokens.get().as_deref(), Some("old"));
    tokens.restore(None);
    assert_eq!(tokens.get(), None);
}

#[test]
fn token_store_debug_hides_token() {
    let (_, tokens) = memory_tokens();
    tokens.set("super-secret").unwrap();
    let dbg = format!("{tokens:?}");
    assert!(!dbg.contains("super-secret"));
    assert!(dbg.contains("has_token: true"));
}

// =============================================================================
// FileStore
// =============================================================================

#[test]
fn file_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.json");
    let store = FileStore::new(&path);
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    store.remove(ACCESS_TOKEN_KEY).unwrap();
    assert!(!path.exists());
}

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    FileStore::new(&path).set(ACCESS_TOKEN_KEY, "tok").unwrap();
    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("tok"));

    reopened.remove(ACCESS_TOKEN_KEY).unwrap();
    assert_eq!(FileStore::new(&path).get(ACCESS_TOKEN_KEY).unwrap(), None);
}

#[test]
fn file_store_keeps_unrelated_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("s.json"));
    store.set("theme", "dark").unwrap();
    store.set(ACCESS_TOKEN_KEY, "tok").unwrap();
    store.remove(ACCESS_TOKEN_KEY).unwrap();
    assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
}

#[test]
fn file_store_corrupt_file_is_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{not json").unwrap();
    let store = FileStore::new(&path);
    assert!(matches!(store.get(ACCESS_TOKEN_KEY), Err(ClientError::Storage(_))));

    let tokens = TokenStore::new(Arc::new(store));
    assert_eq!(tokens.get(), None);
}
