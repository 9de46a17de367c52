//! Web API Listing Tests
//!
//! Integration tests for /info, /files and /folders.

mod common;

use axum::http::StatusCode;
use serde_json::Value;

use common::{create_test_app, make_folder, write_file};

fn names(files: &Value) -> Vec<String> {
    files
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|f| f["value"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_info() {
    let app = create_test_app();
    write_file(&app.drive, "/", "a.txt", b"12345").await;

    let response = app.server.get("/info").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let stats = &body["stats"];
    assert!(stats["used"].as_u64().unwrap() >= 5);
    assert_eq!(
        stats["total"].as_u64().unwrap(),
        stats["free"].as_u64().unwrap() + stats["used"].as_u64().unwrap()
    );
    assert_eq!(body["features"]["preview"], serde_json::json!({}));
    assert_eq!(body["features"]["meta"], serde_json::json!({}));
}

#[tokio::test]
async fn test_list_root_direct_children_only() {
    let app = create_test_app();
    let docs = make_folder(&app.drive, "/", "docs").await;
    write_file(&app.drive, &docs, "nested.txt", b"x").await;
    write_file(&app.drive, "/", "top.txt", b"hello").await;

    let response = app.server.get("/files").add_query_param("id", "/").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(names(&body), vec!["docs", "top.txt"]);

    let top = &body[1];
    assert_eq!(top["id"], "/top.txt");
    assert_eq!(top["type"], "text");
    assert_eq!(top["size"], 5);
    assert_eq!(top["isFolder"], false);
    assert!(top["date"].as_i64().unwrap() > 0);
    assert_eq!(body[0]["type"], "folder");
    assert_eq!(body[0]["isFolder"], true);
}

#[tokio::test]
async fn test_list_excludes_hidden_entries() {
    let app = create_test_app();
    write_file(&app.drive, "/", ".env", b"SECRET=1").await;
    let git = make_folder(&app.drive, "/", ".git").await;
    write_file(&app.drive, &git, "config", b"x").await;
    write_file(&app.drive, "/", "visible.txt", b"x").await;

    let plain: Value = app.server.get("/files").await.json();
    assert_eq!(names(&plain), vec!["visible.txt"]);

    let searched: Value = app
        .server
        .get("/files")
        .add_query_param("search", "i")
        .await
        .json();
    assert_eq!(names(&searched), vec!["visible.txt"]);
}

#[tokio::test]
async fn test_search_is_recursive() {
    let app = create_test_app();
    let docs = make_folder(&app.drive, "/", "docs").await;
    let deep = make_folder(&app.drive, &docs, "deep").await;
    write_file(&app.drive, &deep, "report-2024.pdf", b"pdf").await;
    write_file(&app.drive, "/", "report.txt", b"txt").await;
    write_file(&app.drive, "/", "notes.txt", b"txt").await;

    let response = app
        .server
        .get("/files")
        .add_query_param("search", "report")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let mut ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["/docs/deep/report-2024.pdf", "/report.txt"]);
}

#[tokio::test]
async fn test_type_and_size_filter() {
    let app = create_test_app();
    write_file(&app.drive, "/", "small.txt", b"tiny").await;
    write_file(&app.drive, "/", "large.txt", &vec![b'x'; 2048]).await;
    write_file(&app.drive, "/", "photo.png", &vec![0u8; 2048]).await;

    let filter = r#"{"type": ["text"], "size": [{"start": 1024, "end": 0}]}"#;
    let response = app
        .server
        .get("/files")
        .add_query_param("filter", filter)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(names(&body), vec!["large.txt"]);
}

#[tokio::test]
async fn test_date_filter_excludes_outside_range() {
    let app = create_test_app();
    write_file(&app.drive, "/", "today.txt", b"x").await;

    let past = r#"{"date": {"start": "2000-01-01", "end": "2000-01-02"}}"#;
    let body: Value = app
        .server
        .get("/files")
        .add_query_param("filter", past)
        .await
        .json();
    assert!(body.as_array().unwrap().is_empty());

    let wide = r#"{"date": {"start": "2000-01-01T00:00:00Z", "end": "2999-01-01T00:00:00Z"}}"#;
    let body: Value = app
        .server
        .get("/files")
        .add_query_param("filter", wide)
        .await
        .json();
    assert_eq!(names(&body), vec!["today.txt"]);
}

#[tokio::test]
async fn test_malformed_filter_is_bad_request() {
    let app = create_test_app();

    for filter in ["{not json", r#"{"type": "text"}"#, r#"{"size": "big"}"#] {
        let response = app
            .server
            .get("/files")
            .add_query_param("filter", filter)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn test_limit_truncates_with_total() {
    let app = create_test_app();
    for name in ["a.txt", "b.txt", "c.txt"] {
        write_file(&app.drive, "/", name, b"x").await;
    }

    let body: Value = app
        .server
        .get("/files")
        .add_query_param("limit", "2")
        .await
        .json();

    assert_eq!(body["total"], 3);
    assert_eq!(names(&body["files"]), vec!["a.txt", "b.txt"]);

    // zero behaves as no limit
    let body: Value = app
        .server
        .get("/files")
        .add_query_param("limit", "0")
        .await
        .json();
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_invalid_limit_is_bad_request() {
    let app = create_test_app();

    let response = app
        .server
        .get("/files")
        .add_query_param("limit", "lots")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_missing_folder_is_not_found() {
    let app = create_test_app();

    let response = app
        .server
        .get("/files")
        .add_query_param("id", "/nope")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_traversal_is_bad_request() {
    let app = create_test_app();

    let response = app
        .server
        .get("/files")
        .add_query_param("id", "/../..")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_folders_tree() {
    let app = create_test_app();
    let a = make_folder(&app.drive, "/", "a").await;
    make_folder(&app.drive, &a, "x").await;
    make_folder(&app.drive, "/", "b").await;
    make_folder(&app.drive, "/", ".hidden").await;
    write_file(&app.drive, &a, "file.txt", b"x").await;

    let response = app.server.get("/folders").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(names(&body), vec!["a", "b"]);
    assert_eq!(body[0]["data"][0]["id"], "/a/x");
    assert_eq!(body[0]["data"].as_array().unwrap().len(), 1);
    assert!(body[1]["data"].as_array().unwrap().is_empty());
}
