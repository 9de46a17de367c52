//! Web API Icon Tests
//!
//! Integration tests for the icon routes.

mod common;

use axum::http::StatusCode;

use common::{create_test_app, write_icon};

#[tokio::test]
async fn test_icon_by_name() {
    let app = create_test_app();
    write_icon(app.assets.path(), "icons/default/32/report.pdf", "by-name");
    write_icon(app.assets.path(), "icons/default/32/types/pdf.svg", "<svg>type</svg>");

    let response = app.server.get("/icons/32/pdf/report.pdf").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "by-name");
}

#[tokio::test]
async fn test_icon_by_type() {
    let app = create_test_app();
    write_icon(app.assets.path(), "icons/default/32/types/pdf.svg", "<svg>type</svg>");

    let response = app.server.get("/icons/32/pdf/other.pdf").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "<svg>type</svg>");
    assert_eq!(response.header("content-type"), "image/svg+xml");
}

#[tokio::test]
async fn test_skin_icon_precedence() {
    let app = create_test_app();
    write_icon(app.assets.path(), "icons/dark/32/types/pdf.svg", "<svg>dark</svg>");
    write_icon(app.assets.path(), "icons/default/32/types/pdf.svg", "<svg>default</svg>");

    let response = app.server.get("/icons/dark/32/pdf/report.pdf").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "<svg>dark</svg>");

    // the name icon still wins over the skin
    write_icon(app.assets.path(), "icons/default/32/report.pdf", "by-name");
    let response = app.server.get("/icons/dark/32/pdf/report.pdf").await;
    assert_eq!(response.text(), "by-name");

    // unknown skin falls back to the default type icon
    let response = app.server.get("/icons/light/32/pdf/report2.pdf").await;
    assert_eq!(response.text(), "<svg>default</svg>");
}

#[tokio::test]
async fn test_missing_fallback_is_not_found() {
    let app = create_test_app();

    let response = app.server.get("/icons/32/zip/archive.zip").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_icon_traversal_is_neutralized() {
    let app = create_test_app();
    // a file next to the icons tree that traversal would reach
    write_icon(app.assets.path(), "secret.svg", "secret");
    write_icon(app.assets.path(), "icons/default/16/types/svg.svg", "<svg>ok</svg>");

    let response = app.server.get("/icons/16/svg/..%2F..%2F..%2Fsecret.svg").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "<svg>ok</svg>");
}
