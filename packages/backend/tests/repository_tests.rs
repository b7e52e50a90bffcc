use marble_backend::{
    BackendError, DocumentStore, FileDocumentStore, FileObjectStore, ImageUploader, MemoryBackend,
    ObjectStore, PageRepository, StoredPage,
};
use marble_model::element::COLUMN_INDEX_KEY;
use marble_model::{ElementKind, PageElement};
use serde_json::json;
use std::sync::Arc;

fn first_payload() -> Vec<PageElement> {
    vec![
        PageElement::new("a", ElementKind::Hero).with_content("title", "Marble"),
        PageElement::new("b", ElementKind::Text).with_content("text", "<p>one</p>"),
    ]
}

fn second_payload() -> Vec<PageElement> {
    vec![PageElement::new("s", ElementKind::Section)
        .with_content("columns", 2)
        .with_child(PageElement::new("q", ElementKind::Quote).with_content(COLUMN_INDEX_KEY, 1))]
}

#[tokio::test]
async fn test_second_save_replaces_first() {
    let backend = Arc::new(MemoryBackend::new());
    let repo = PageRepository::new(backend.clone());

    repo.save_draft("home", "Home", &first_payload()).await.unwrap();
    repo.publish("home", "Home", &second_payload()).await.unwrap();

    let stored = backend.select("home").await.unwrap().unwrap();
    assert_eq!(stored.content, serde_json::to_value(second_payload()).unwrap());

    let loaded = repo.load("home").await.unwrap().unwrap();
    assert_eq!(loaded.content, second_payload());
}

#[tokio::test]
async fn test_load_missing_page() {
    let repo = PageRepository::new(Arc::new(MemoryBackend::new()));
    assert!(repo.load("home").await.unwrap().is_none());
}

#[tokio::test]
async fn test_malformed_content_loads_empty() {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .upsert(StoredPage {
            slug: "home".into(),
            title: "Home".into(),
            content: json!({ "oops": true }),
            updated_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let loaded = PageRepository::new(backend).load("home").await.unwrap().unwrap();
    assert!(loaded.content.is_empty());
}

#[tokio::test]
async fn test_unknown_kinds_survive_load() {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .upsert(StoredPage {
            slug: "home".into(),
            title: "Home".into(),
            content: json!([{ "id": "x", "type": "carousel", "content": { "speed": 3 } }]),
            updated_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let loaded = PageRepository::new(backend).load("home").await.unwrap().unwrap();
    assert_eq!(loaded.content[0].kind, ElementKind::Unknown("carousel".into()));
}

#[tokio::test]
async fn test_save_failure_is_reported() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_save_failure(true);
    let repo = PageRepository::new(backend.clone());

    let result = repo.save_draft("home", "Home", &first_payload()).await;
    assert!(matches!(result, Err(BackendError::SaveFailure(_))));
    assert!(backend.select("home").await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileDocumentStore::new(dir.path()));
    let repo = PageRepository::new(store.clone());

    repo.save_draft("home", "Home", &first_payload()).await.unwrap();
    repo.save_draft("about", "About", &second_payload()).await.unwrap();

    assert_eq!(store.list_slugs().await.unwrap(), vec!["about", "home"]);
    let loaded = repo.load("home").await.unwrap().unwrap();
    assert_eq!(loaded.title, "Home");
    assert_eq!(loaded.content, first_payload());
}

#[tokio::test]
async fn test_file_store_rejects_bad_slug() {
    let dir = tempfile::tempdir().unwrap();
    let repo = PageRepository::new(Arc::new(FileDocumentStore::new(dir.path())));
    let result = repo.save_draft("../escape", "x", &[]).await;
    assert!(matches!(result, Err(BackendError::SaveFailure(_))));
}

#[tokio::test]
async fn test_uploader_returns_public_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileObjectStore::new(dir.path(), "/uploads/"));
    let uploader = ImageUploader::new(store.clone());

    let url = uploader.upload("slab.webp", vec![1, 2, 3], Some("image/webp")).await.unwrap();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".webp"));

    let name = url.trim_start_matches("/uploads/");
    let bytes = std::fs::read(store.dir().join(name)).unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);
    assert_eq!(store.public_url(name), url);
}

#[tokio::test]
async fn test_uploader_failure() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_upload_failure(true);
    let result = ImageUploader::new(backend).upload("a.png", vec![0], None).await;
    assert!(matches!(result, Err(BackendError::UploadFailure(_))));
}
