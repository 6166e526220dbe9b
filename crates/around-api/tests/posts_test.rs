//! Create-post API integration tests.
//!
//! Run with: `cargo test -p around-api --test posts_test`

mod helpers;

use axum_test::multipart::MultipartForm;
use helpers::auth::{bearer, expired_token, make_token, token_with_wrong_secret};
use helpers::fixtures::{jpeg_bytes, png_bytes, post_form};
use helpers::{api_path, setup_test_app, setup_test_app_with_face, setup_test_app_with_index};
use helpers::{FailingIndex, TEST_BASE_URL, TEST_BUCKET};
use serde_json::Value;
use std::sync::Arc;

#[tokio::test]
async fn test_create_png_post_then_find_it() {
    let app = setup_test_app().await;
    let client = app.client();
    let token = make_token("alice");

    let response = client
        .post(&api_path("/post"))
        .add_header("Authorization", bearer(&token))
        .multipart(post_form("hi", 37.7749, -122.4194, "photo.png", png_bytes()))
        .await;

    assert_eq!(response.status_code(), 201);
    let created: Value = response.json();
    let id = created["id"].as_str().expect("Expected 'id' in response");
    assert_eq!(
        created["url"].as_str().unwrap(),
        format!("{}/{}/{}", TEST_BASE_URL, TEST_BUCKET, id)
    );
    assert_eq!(app.blob_count(), 1);
    assert_eq!(app.annotator.calls(), 0);

    let response = client
        .get(&api_path("/search"))
        .add_query_param("lat", 37.7749)
        .add_query_param("lon", -122.4194)
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), 200);
    let posts: Vec<Value> = response.json();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["user"], "alice");
    assert_eq!(posts[0]["message"], "hi");
    assert_eq!(posts[0]["type"], "image");
    assert_eq!(posts[0]["face"].as_f64(), Some(0.0));
    assert_eq!(posts[0]["url"], created["url"]);
}

#[tokio::test]
async fn test_user_comes_from_token() {
    let app = setup_test_app().await;
    let client = app.client();

    let form = post_form("hi", 10.0, 10.0, "photo.png", png_bytes()).add_text("user", "mallory");
    let response = client
        .post(&api_path("/post"))
        .add_header("Authorization", bearer(&make_token("alice")))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 201);

    let response = client
        .get(&api_path("/search"))
        .add_query_param("lat", 10.0)
        .add_query_param("lon", 10.0)
        .add_header("Authorization", bearer(&make_token("alice")))
        .await;
    let posts: Vec<Value> = response.json();
    assert_eq!(posts[0]["user"], "alice");
}

#[tokio::test]
async fn test_jpeg_post_is_annotated_and_clusters() {
    let app = setup_test_app_with_face(0.82).await;
    let client = app.client();
    let token = make_token("bob");

    let response = client
        .post(&api_path("/post"))
        .add_header("Authorization", bearer(&token))
        .multipart(post_form("selfie", 0.0, 0.0, "me.jpeg", jpeg_bytes()))
        .await;
    assert_eq!(response.status_code(), 201);
    assert_eq!(app.annotator.calls(), 1);

    let response = client
        .get(&api_path("/cluster"))
        .add_query_param("term", "face")
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 200);
    let posts: Vec<Value> = response.json();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["face"].as_f64(), Some(0.82));
}

#[tokio::test]
async fn test_video_post_is_classified() {
    let app = setup_test_app().await;
    let client = app.client();
    let token = make_token("carol");

    let response = client
        .post(&api_path("/post"))
        .add_header("Authorization", bearer(&token))
        .multipart(post_form("clip", 0.0, 0.0, "clip.mp4", vec![0u8; 64]))
        .await;
    assert_eq!(response.status_code(), 201);
    assert_eq!(app.annotator.calls(), 0);

    let response = client
        .get(&api_path("/search"))
        .add_query_param("lat", 0.0)
        .add_query_param("lon", 0.0)
        .add_header("Authorization", bearer(&token))
        .await;
    let posts: Vec<Value> = response.json();
    assert_eq!(posts[0]["type"], "video");
}

#[tokio::test]
async fn test_missing_image_is_bad_request() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .add_text("message", "no picture")
        .add_text("lat", "1.0")
        .add_text("lon", "2.0");

    let response = app
        .client()
        .post(&api_path("/post"))
        .add_header("Authorization", bearer(&make_token("alice")))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "IMAGE_MISSING");
    assert_eq!(app.blob_count(), 0);
    assert!(app.index.is_empty().await);
}

#[tokio::test]
async fn test_missing_lat_is_bad_request() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .add_text("message", "somewhere")
        .add_text("lon", "2.0");

    let response = app
        .client()
        .post(&api_path("/post"))
        .add_header("Authorization", bearer(&make_token("alice")))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].as_str().unwrap().contains("lat"));
}

#[tokio::test]
async fn test_non_numeric_lon_is_bad_request() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .add_text("lat", "1.0")
        .add_text("lon", "east");

    let response = app
        .client()
        .post(&api_path("/post"))
        .add_header("Authorization", bearer(&make_token("alice")))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_index_failure_is_bad_gateway() {
    let app = setup_test_app_with_index(Arc::new(FailingIndex)).await;

    let response = app
        .client()
        .post(&api_path("/post"))
        .add_header("Authorization", bearer(&make_token("alice")))
        .multipart(post_form("hi", 0.0, 0.0, "photo.png", png_bytes()))
        .await;

    assert_eq!(response.status_code(), 502);
    let body: Value = response.json();
    assert_eq!(body["code"], "INDEX_WRITE_FAILED");
    assert!(body.get("details").is_none());
    // The blob is already uploaded when indexing fails.
    assert_eq!(app.blob_count(), 1);
}

#[tokio::test]
async fn test_out_of_range_location_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/post"))
        .add_header("Authorization", bearer(&make_token("alice")))
        .multipart(post_form("hi", 95.0, 0.0, "photo.png", png_bytes()))
        .await;

    assert_eq!(response.status_code(), 502);
    assert!(app.index.is_empty().await);
}

#[tokio::test]
async fn test_create_requires_token() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post(&api_path("/post"))
        .multipart(post_form("hi", 0.0, 0.0, "photo.png", png_bytes()))
        .await;
    assert_eq!(response.status_code(), 401);

    let response = client
        .post(&api_path("/post"))
        .add_header("Authorization", bearer(&expired_token("alice")))
        .multipart(post_form("hi", 0.0, 0.0, "photo.png", png_bytes()))
        .await;
    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("expired"));

    let response = client
        .post(&api_path("/post"))
        .add_header("Authorization", bearer(&token_with_wrong_secret("alice")))
        .multipart(post_form("hi", 0.0, 0.0, "photo.png", png_bytes()))
        .await;
    assert_eq!(response.status_code(), 401);

    assert_eq!(app.blob_count(), 0);
}
