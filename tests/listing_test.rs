use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use filedrop::config::AppConfig;
use filedrop::{AppState, create_app};
use http_body_util::BodyExt;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

fn test_state(dir: &tempfile::TempDir) -> AppState {
    AppState::new(AppConfig {
        uploads_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    })
}

async fn upload(app: &axum::Router, folder: &str, filename: &str) -> String {
    let mut body = String::new();
    if !folder.is_empty() {
        body.push_str(&format!(
            "--{BOUNDARY}\r\n\
            Content-Disposition: form-data; name=\"folder\"\r\n\r\n\
            {folder}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
        Content-Type: text/plain\r\n\r\n\
        content of {filename}\r\n\
        --{BOUNDARY}--\r\n"
    ));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    json["filename"].as_str().unwrap().to_string()
}

async fn get_json(app: &axum::Router, uri: &str) -> Value {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_listing_is_sorted_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(&dir));

    let first = upload(&app, "", "one.txt").await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    let second = upload(&app, "archive", "two.txt").await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    let third = upload(&app, "", "three.txt").await;

    let listing = get_json(&app, "/api/files").await;
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["filename"], third);
    assert_eq!(entries[1]["filename"], second);
    assert_eq!(entries[1]["folder"], "archive");
    assert_eq!(entries[2]["filename"], first);
    assert!(entries.iter().all(|e| e["uploadedAt"].is_string()));
}

#[tokio::test]
async fn test_listing_reflects_deletions() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(&dir));

    let mut names = Vec::new();
    for i in 0..4 {
        names.push(upload(&app, "", &format!("file-{i}.txt")).await);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/delete/{}?token=secret", names[1]))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listing = get_json(&app, "/api/files").await;
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(
        entries
            .iter()
            .all(|e| e["filename"].as_str().unwrap() != names[1])
    );
}

#[tokio::test]
async fn test_recent_returns_trailing_ten_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(&dir));

    let mut names = Vec::new();
    for i in 0..12 {
        names.push(upload(&app, "", &format!("burst-{i}.txt")).await);
    }

    let recent = get_json(&app, "/api/recent").await;
    let entries = recent.as_array().unwrap();
    assert_eq!(entries.len(), 10);

    // Last ten uploads, original chronological order within the slice
    for (entry, name) in entries.iter().zip(&names[2..]) {
        assert_eq!(entry["filename"].as_str().unwrap(), name.as_str());
    }
}

#[tokio::test]
async fn test_recent_is_not_the_inventory() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(&dir));

    let filename = upload(&app, "", "kept.txt").await;

    // Deleting the object does not rewrite the activity feed
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/delete/{}?token=secret", filename))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let recent = get_json(&app, "/api/recent").await;
    assert_eq!(recent.as_array().unwrap().len(), 1);
    let listing = get_json(&app, "/api/files").await;
    assert_eq!(listing.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_listing_walks_nested_folders() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_state(&dir));

    upload(&app, "a/b/c", "deep.txt").await;
    upload(&app, "", "shallow.txt").await;

    let listing = get_json(&app, "/api/files").await;
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let folders: Vec<&str> = entries
        .iter()
        .map(|e| e["folder"].as_str().unwrap())
        .collect();
    assert!(folders.contains(&"a/b/c"));
    assert!(folders.contains(&""));

    let deep = entries
        .iter()
        .find(|e| e["folder"] == "a/b/c")
        .unwrap();
    assert!(
        deep["url"]
            .as_str()
            .unwrap()
            .contains("/uploads/a/b/c/")
    );
}
