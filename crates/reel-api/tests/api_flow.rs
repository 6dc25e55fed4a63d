//! API flow tests against the real router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use reel_api::{create_router, ApiConfig, AppState};

const BOUNDARY: &str = "reel-test-boundary";

async fn test_app() -> Router {
    let config = ApiConfig::default();
    let state = AppState::new(config).await.unwrap();
    create_router(state, None)
}

fn png_bytes(shade: u8) -> Vec<u8> {
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, image::Rgb([shade, 10, 10])));
    let mut buf = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut buf),
        ImageOutputFormat::Png,
    )
    .unwrap();
    buf
}

fn multipart_body(parts: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn json_response(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_session(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_response(response).await["id"].as_str().unwrap().to_string()
}

async fn upload(app: &Router, session_id: &str, parts: &[(&str, &[u8])]) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/sessions/{}/images", session_id))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, json_response(response).await)
}

#[tokio::test]
async fn test_upload_filters_invalid_files() {
    let app = test_app().await;
    let session_id = create_session(&app).await;

    let good1 = png_bytes(10);
    let good2 = png_bytes(20);
    let good3 = png_bytes(30);
    let (status, body) = upload(
        &app,
        &session_id,
        &[
            ("one.png", &good1),
            ("corrupt.png", b"this is not an image"),
            ("two.png", &good2),
            ("three.png", &good3),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let accepted: Vec<&str> = body["accepted"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(accepted, vec!["one.png", "two.png", "three.png"]);

    let warnings = body["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["filename"], "corrupt.png");
}

#[tokio::test]
async fn test_order_replacement_and_rejection() {
    let app = test_app().await;
    let session_id = create_session(&app).await;

    let a = png_bytes(1);
    let b = png_bytes(2);
    upload(&app, &session_id, &[("a.png", &a), ("b.png", &b)]).await;

    // Valid permutation
    let response = app
        .clone()
        .oneshot(
            Request::put(format!("/api/sessions/{}/order", session_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"order":["b.png","a.png"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_response(response).await;
    assert_eq!(body["order"][0], "b.png");

    // Not a permutation: duplicate name
    let response = app
        .clone()
        .oneshot(
            Request::put(format!("/api/sessions/{}/order", session_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"order":["a.png","a.png"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Stored order unchanged
    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/sessions/{}", session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_response(response).await;
    assert_eq!(body["order"][0], "b.png");
}

#[tokio::test]
async fn test_export_without_images_is_fatal() {
    let app = test_app().await;
    let session_id = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/sessions/{}/export", session_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"preset":"short_reel"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_response(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("No valid images"));
}

#[tokio::test]
async fn test_export_rejects_invalid_settings() {
    let app = test_app().await;
    let session_id = create_session(&app).await;
    let a = png_bytes(1);
    upload(&app, &session_id, &[("a.png", &a)]).await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/sessions/{}/export", session_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"preset":"custom","duration_secs":9.5}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/sessions/no-such-session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_response(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore = "requires FFmpeg"]
async fn test_full_export_and_download_flow() {
    let app = test_app().await;
    let session_id = create_session(&app).await;

    let a = png_bytes(1);
    let b = png_bytes(2);
    upload(&app, &session_id, &[("a.png", &a), ("b.png", &b)]).await;

    // Custom preset: 0.5s per frame, no watermark, repeat, 1s fade
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/sessions/{}/export", session_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"preset":"custom","duration_secs":0.5,"watermark":false,"repeat":true,"fade_duration_secs":1.0}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_response(response).await;

    // 2 images x 2 playthroughs = 4 encoded frames at 2 fps
    assert_eq!(body["frame_count"], 4);
    assert!((body["fps"].as_f64().unwrap() - 2.0).abs() < 1e-9);
    assert!(body["filename"]
        .as_str()
        .unwrap()
        .starts_with("twnty_two_hat_"));
    assert!(body["skipped"].as_array().unwrap().is_empty());

    let artifact_id = body["id"].as_str().unwrap();

    // Full download
    let response = app
        .clone()
        .oneshot(
            Request::get(format!(
                "/api/sessions/{}/artifacts/{}/download",
                session_id, artifact_id
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "video/mp4"
    );

    // Range request
    let response = app
        .clone()
        .oneshot(
            Request::get(format!(
                "/api/sessions/{}/artifacts/{}/download",
                session_id, artifact_id
            ))
            .header(header::RANGE, "bytes=0-99")
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.len(), 100);
}
