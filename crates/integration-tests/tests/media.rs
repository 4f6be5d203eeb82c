//! Media uploads and deletion over HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use atelier_core::MediaKind;
use atelier_integration_tests::{FAKE_CLOUD_NAME, MultipartBody, TestApp};

#[tokio::test]
async fn test_upload_shop_item_media() {
    let app = TestApp::new();
    let body = MultipartBody::new()
        .file("files", "front.png", "image/png", b"png")
        .file("files", "back.jpg", "image/jpeg", b"jpg")
        .file("files", "spin.mov", "video/quicktime", b"mov");

    let response = app.post_multipart("/media/shop-items/PROD-001/upload", body).await;

    assert_eq!(response.status, StatusCode::OK);
    let results = response.json();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["publicId"], "shopItems/images/PROD-001/PROD-001_1");
    assert_eq!(results[0]["type"], "image");
    assert_eq!(results[0]["originalName"], "front.png");
    assert_eq!(
        results[0]["url"],
        format!(
            "https://res.cloudinary.com/{FAKE_CLOUD_NAME}/image/upload/shopItems/images/PROD-001/PROD-001_1"
        )
    );
    assert_eq!(results[2]["publicId"], "shopItems/videos/PROD-001/PROD-001_3");
    assert_eq!(results[2]["type"], "video");

    let uploaded = app.media.uploaded().await;
    assert_eq!(uploaded.len(), 3);
    assert_eq!(uploaded[2].kind, MediaKind::Video);
    assert_eq!(uploaded[1].bytes, b"jpg");
}

#[tokio::test]
async fn test_upload_without_files_is_rejected() {
    let app = TestApp::new();
    let body = MultipartBody::new().text("note", "nothing attached");

    let response = app.post_multipart("/media/shop-items/PROD-001/upload", body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "No files uploaded");
}

#[tokio::test]
async fn test_upload_more_than_ten_files_is_rejected() {
    let app = TestApp::new();
    let body = (0..11).fold(MultipartBody::new(), |body, i| {
        body.file("files", &format!("{i}.jpg"), "image/jpeg", b"jpg")
    });

    let response = app.post_multipart("/media/shop-items/PROD-001/upload", body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.media.uploaded().await.is_empty());
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let app = TestApp::new();
    let body = MultipartBody::new()
        .file("files", "front.jpg", "image/jpeg", b"jpg")
        .file("files", "size.txt", "text/plain", b"txt");

    let response = app.post_multipart("/media/shop-items/PROD-001/upload", body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "Invalid file type: text/plain");
    assert!(app.media.uploaded().await.is_empty());
}

#[tokio::test]
async fn test_upload_banner() {
    let app = TestApp::new();
    let body = MultipartBody::new().file("file", "hero.mp4", "video/mp4", b"mp4");

    let response = app.post_multipart("/media/banners/upload/hero", body).await;

    assert_eq!(response.status, StatusCode::OK);
    let result = response.json();
    assert_eq!(result["type"], "video");
    assert!(
        result["publicId"]
            .as_str()
            .unwrap()
            .starts_with("banners/videos/hero_")
    );
}

#[tokio::test]
async fn test_upload_banner_requires_file() {
    let app = TestApp::new();
    let body = MultipartBody::new().file("files", "hero.jpg", "image/jpeg", b"jpg");

    let response = app.post_multipart("/media/banners/upload/hero", body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "No file uploaded");
}

#[tokio::test]
async fn test_delete_media_by_nested_public_id() {
    let app = TestApp::new();

    let response = app
        .delete("/media/shopItems/images/PROD-001/PROD-001_1")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Media deleted successfully");
    assert_eq!(
        app.media.destroyed().await,
        ["shopItems/images/PROD-001/PROD-001_1"]
    );
}
