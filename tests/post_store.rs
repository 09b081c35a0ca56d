use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use twinmark::post::{
    DirectoryStore, PostError, PostStore, SaveRequest, create_post, save_post,
};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap()
}

fn store(temp: &TempDir) -> DirectoryStore {
    DirectoryStore::new(temp.path(), "src/content/blog")
}

#[test]
fn test_create_then_save_on_disk() {
    let temp = TempDir::new().unwrap();
    let mut store = store(&temp);

    let filename = create_post(&mut store, "Hello, Disk!", now()).unwrap();
    assert_eq!(filename, "hello-disk.md");
    assert_eq!(create_post(&mut store, "Hello, Disk!", now()).unwrap(), "hello-disk-1.md");

    let request = SaveRequest {
        path: Some("src/content/blog/hello-disk.md".to_string()),
        title: Some("Hello, Disk!".to_string()),
        description: Some("saved".to_string()),
        pub_date: Some("2025-01-01T00:00:00.000Z".to_string()),
        draft: Some(false),
        tags: Some(vec!["io".to_string()]),
        content_markdown: "New **body**".to_string(),
        ..SaveRequest::default()
    };
    let response = save_post(&mut store, &filename, &request, now()).unwrap();
    assert!(!response.renamed);
    assert_eq!(response.path, "src/content/blog/hello-disk.md");
    assert_eq!(response.meta.description, "saved");
    assert_eq!(response.meta.tags, ["io"]);
    assert_eq!(response.meta.pub_date.as_deref(), Some("2025-01-01T00:00:00.000Z"));
    assert_eq!(response.meta.updated_date.as_deref(), Some("2025-02-03T04:05:06.000Z"));

    let saved = std::fs::read_to_string(store.dir().join(&filename)).unwrap();
    assert_eq!(
        saved,
        "---\ntitle: \"Hello, Disk!\"\ndescription: \"saved\"\npubDate: 2025-01-01T00:00:00.000Z\ndraft: false\ntags: [\"io\"]\nupdatedDate: 2025-02-03T04:05:06.000Z\ncoverUrl: \"\"\n---\n\nNew **body**"
    );
}

#[test]
fn test_save_rename_and_conflict_on_disk() {
    let temp = TempDir::new().unwrap();
    let mut store = store(&temp);
    create_post(&mut store, "first", now()).unwrap();
    create_post(&mut store, "second", now()).unwrap();

    let mut request = SaveRequest {
        path: Some("second".to_string()),
        content_markdown: "x".to_string(),
        ..SaveRequest::default()
    };
    let err = save_post(&mut store, "first.md", &request, now()).unwrap_err();
    assert!(matches!(err, PostError::Conflict(_)));

    request.path = Some("third".to_string());
    let response = save_post(&mut store, "first.md", &request, now()).unwrap();
    assert!(response.renamed);
    assert_eq!(response.filename, "third.md");
    assert!(store.exists("third.md"));
    assert!(!store.exists("first.md"));
}

#[test]
fn test_save_rejects_traversal_and_missing_files() {
    let temp = TempDir::new().unwrap();
    let mut store = store(&temp);
    let request = SaveRequest {
        content_markdown: "x".to_string(),
        ..SaveRequest::default()
    };
    assert!(matches!(
        save_post(&mut store, "missing.md", &request, now()),
        Err(PostError::NotFound(_))
    ));
    assert!(matches!(
        save_post(&mut store, "notes.txt", &request, now()),
        Err(PostError::InvalidFilename(_))
    ));
    assert!(matches!(store.read(".."), Err(PostError::InvalidPath(_))));
}
