//! Web API Archive Tests
//!
//! Integration tests for the upload, listing and download endpoints.

use axum::http::{header, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use locara::config::UserConfig;
use locara::web::create_router;
use locara::web::router::create_static_router;
use locara::web::AppState;
use locara::{Archive, ArchiveStore, Config, NewArchive};
use std::sync::Arc;
use tempfile::TempDir;

const AUTH_CODE: &str = "s3cret-code";

/// Create a test configuration with a single uploader.
fn create_test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.use_directory = dir.path().to_string_lossy().into_owned();
    config.users = vec![UserConfig {
        name: "alice".to_string(),
        auth: AUTH_CODE.to_string(),
    }];
    config
}

/// Create a test server backed by a temporary archive directory.
fn create_test_server() -> (TestServer, ArchiveStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&dir);
    let store = ArchiveStore::new(dir.path()).expect("Failed to open store");

    let app_state = Arc::new(AppState::new(store.clone(), config));
    let router = create_router(app_state);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, store, dir)
}

/// Build a complete upload form.
fn upload_form(auth: &str, file_name: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new()
        .add_text("ar_auth_code", auth)
        .add_text("ar_name", "Board Minutes")
        .add_text("ar_dated", "2023-05-01")
        .add_text("ar_type", "minutes")
        .add_text("ar_author", "Bob")
        .add_part(
            "ar_file",
            Part::bytes(content.to_vec())
                .file_name(file_name)
                .mime_type("text/plain"),
        )
}

/// Put an archive straight into the store.
fn seed_archive(store: &ArchiveStore, name: &str, dated_on: &str, content: &[u8]) -> Archive {
    let new_archive = NewArchive::new("alice", "notes.txt", content.len() as u64)
        .with_name(name)
        .with_dated_on(dated_on)
        .with_kind("notes")
        .with_author("Bob");
    store.create(&mut &content[..], &new_archive).unwrap()
}

#[tokio::test]
async fn test_upload_redirects_home() {
    let (server, store, _dir) = create_test_server();

    let response = server
        .post("/api/archive/create")
        .multipart(upload_form(AUTH_CODE, "minutes.txt", b"hello"))
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), "/");

    let archive = store.get(1).unwrap();
    assert_eq!(archive.uploader, "alice");
    assert_eq!(archive.file_name, "minutes.txt");
    assert_eq!(archive.size_bytes, 5);
    assert_eq!(archive.name, "Board Minutes");
    assert_eq!(archive.dated_on, "2023-05-01");
    assert_eq!(archive.kind, "minutes");
    assert_eq!(archive.author, "Bob");
    assert_eq!(
        std::fs::read(store.content_path(1).unwrap()).unwrap(),
        b"hello"
    );
}

#[tokio::test]
async fn test_upload_strips_client_directories() {
    let (server, store, _dir) = create_test_server();

    let response = server
        .post("/api/archive/create")
        .multipart(upload_form(AUTH_CODE, "C:\\Users\\bob\\minutes.txt", b"hi"))
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(store.get(1).unwrap().file_name, "minutes.txt");
}

#[tokio::test]
async fn test_upload_invalid_auth_redirects_to_error() {
    let (server, store, _dir) = create_test_server();

    let response = server
        .post("/api/archive/create")
        .multipart(upload_form("wrong", "minutes.txt", b"hello"))
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), "/error");
    assert!(store.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_missing_auth_redirects_home() {
    let (server, store, _dir) = create_test_server();

    let form = MultipartForm::new().add_text("ar_name", "Board Minutes").add_part(
        "ar_file",
        Part::bytes(b"hello".to_vec()).file_name("minutes.txt"),
    );
    let response = server.post("/api/archive/create").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), "/");
    assert_eq!(store.next_id(), 1);
}

#[tokio::test]
async fn test_upload_missing_metadata_rejected() {
    let (server, store, _dir) = create_test_server();

    let form = MultipartForm::new()
        .add_text("ar_auth_code", AUTH_CODE)
        .add_text("ar_name", "Board Minutes")
        .add_part(
            "ar_file",
            Part::bytes(b"hello".to_vec()).file_name("minutes.txt"),
        );
    let response = server.post("/api/archive/create").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("dated_on"));
    assert_eq!(store.next_id(), 1);
}

#[tokio::test]
async fn test_upload_without_file_rejected() {
    let (server, _store, _dir) = create_test_server();

    let form = MultipartForm::new()
        .add_text("ar_auth_code", AUTH_CODE)
        .add_text("ar_name", "Board Minutes")
        .add_text("ar_dated", "2023-05-01")
        .add_text("ar_type", "minutes")
        .add_text("ar_author", "Bob");
    let response = server.post("/api/archive/create").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_reserved_file_name_rejected() {
    let (server, store, _dir) = create_test_server();

    let response = server
        .post("/api/archive/create")
        .multipart(upload_form(AUTH_CODE, "info.json", b"{}"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(store.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_archives_newest_first() {
    let (server, store, _dir) = create_test_server();
    seed_archive(&store, "First", "2021-01-01", b"one");
    seed_archive(&store, "Second", "2022-01-01", b"two");

    let response = server.get("/api/archives").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let archives: Vec<Archive> = response.json();
    assert_eq!(archives.len(), 2);
    assert_eq!(archives[0].id, 2);
    assert_eq!(archives[0].name, "Second");
    assert_eq!(archives[1].id, 1);
}

#[tokio::test]
async fn test_list_archives_uses_on_disk_keys() {
    let (server, store, _dir) = create_test_server();
    seed_archive(&store, "First", "2021-01-01", b"one");

    let body: serde_json::Value = server.get("/api/archives").await.json();

    assert_eq!(body[0]["type"], "notes");
    assert_eq!(body[0]["size_bytes"], 3);
    assert!(body[0].get("kind").is_none());
}

#[tokio::test]
async fn test_list_archives_empty() {
    let (server, _store, _dir) = create_test_server();

    let response = server.get("/api/archives").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let archives: Vec<Archive> = response.json();
    assert!(archives.is_empty());
}

#[tokio::test]
async fn test_download_archive() {
    let (server, store, _dir) = create_test_server();
    let archive = seed_archive(&store, "First", "2021-01-01", b"hello world");

    let response = server.get(&format!("/api/archive/{}", archive.id)).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), b"hello world");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"notes.txt\""
    );
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn test_download_includes_recorded_md5() {
    let (server, store, _dir) = create_test_server();
    let new_archive = NewArchive::new("alice", "notes.txt", 5)
        .with_name("Checked")
        .with_dated_on("2023-05-01")
        .with_kind("notes")
        .with_author("Bob")
        .with_md5_sum("XUFAKrxLKna5cZ2REBfFkg==");
    let archive = store.create(&mut &b"hello"[..], &new_archive).unwrap();

    let response = server.get(&format!("/api/archive/{}", archive.id)).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("content-md5"), "XUFAKrxLKna5cZ2REBfFkg==");
}

#[tokio::test]
async fn test_download_without_md5() {
    let (server, store, _dir) = create_test_server();
    let archive = seed_archive(&store, "First", "2021-01-01", b"hello");

    let response = server.get(&format!("/api/archive/{}", archive.id)).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.headers().get("content-md5").is_none());
}

#[tokio::test]
async fn test_download_invalid_id() {
    let (server, _store, _dir) = create_test_server();

    for raw in ["abc", "0", "007", "-1"] {
        let response = server.get(&format!("/api/archive/{raw}")).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "id {raw}");
    }
}

#[tokio::test]
async fn test_download_unknown_id() {
    let (server, _store, _dir) = create_test_server();

    let response = server.get("/api/archive/42").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_download_missing_content() {
    let (server, store, _dir) = create_test_server();
    let archive = seed_archive(&store, "First", "2021-01-01", b"hello");
    std::fs::remove_file(store.content_path(archive.id).unwrap()).unwrap();

    let response = server.get(&format!("/api/archive/{}", archive.id)).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_corrupt_metadata() {
    let (server, store, _dir) = create_test_server();
    let archive = seed_archive(&store, "First", "2021-01-01", b"hello");
    std::fs::write(store.archive_dir(archive.id).join("info.json"), "{broken").unwrap();

    let response = server.get(&format!("/api/archive/{}", archive.id)).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_api_responses_are_not_cached() {
    let (server, _store, _dir) = create_test_server();

    let response = server.get("/api/archives").await;

    assert_eq!(
        response.header(header::CACHE_CONTROL),
        "no-store, max-age=0"
    );
    assert_eq!(response.header("x-content-type-options"), "nosniff");
}

#[tokio::test]
async fn test_index_groups_by_year() {
    let (server, store, _dir) = create_test_server();
    seed_archive(&store, "Old Minutes", "2019-03-04", b"old");
    seed_archive(&store, "New Minutes", "2023-05-01", b"new");

    let response = server.get("/").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    let newer = html.find("<h2>2023</h2>").unwrap();
    let older = html.find("<h2>2019</h2>").unwrap();
    assert!(newer < older);
    assert!(html.contains("Old Minutes"));
    assert!(html.contains("/api/archive/2"));
}

#[tokio::test]
async fn test_index_empty() {
    let (server, _store, _dir) = create_test_server();

    let html = server.get("/").await.text();

    assert!(html.contains("No archives yet."));
}

#[tokio::test]
async fn test_upload_and_error_pages() {
    let (server, _store, _dir) = create_test_server();

    let upload = server.get("/upload").await;
    assert_eq!(upload.status_code(), StatusCode::OK);
    assert!(upload.text().contains("ar_auth_code"));

    let error = server.get("/error").await;
    assert_eq!(error.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_static_theme_script_served() {
    let static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static");
    let router = create_static_router(static_dir).expect("static directory ships with the crate");
    let server = TestServer::new(router).unwrap();

    let response = server.get("/static/js/app.js").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let script = response.text();
    assert!(script.contains("theme="));
    assert!(script.contains("ayu_mirage"));
}
