use http::Request;
use http_body_util::BodyExt;
use tower::ServiceExt;
use vellum_core::http::routing::get;
use vellum_core::http::{Body, Router, StatusCode};
use vellum_core::{catch_panic_layer, default_trace, init_tracing};

async fn boom() -> &'static str {
    panic!("handler bug")
}

async fn ok() -> &'static str {
    "ok"
}

fn app() -> Router {
    Router::new()
        .route("/boom", get(boom))
        .route("/ok", get(ok))
        .layer(catch_panic_layer())
        .layer(default_trace())
}

async fn call(uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

#[tokio::test]
async fn panics_become_json_500() {
    init_tracing();

    let (status, body) = call("/boom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Internal server error");

    let (status, body) = call("/ok").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}
