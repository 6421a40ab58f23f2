mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use smith_gateway::{cli, server};
use tower::ServiceExt;

use common::{harness, weather};

async fn post_ask(router: axum::Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/agentsmith")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_current_base() {
    let h = harness(vec![]).await;
    let router = server::create_router(h.state.clone());

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["base"], "system");
}

#[tokio::test]
async fn web_session_carries_authoring_state() {
    let h = harness(vec![weather()]).await;
    let router = server::create_router(h.state.clone());

    let (status, body) = post_ask(router.clone(), json!({ "question": "raddfact pizza" })).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["sessionId"].as_str().unwrap().to_string();
    assert!(!session_id.is_empty());
    assert_eq!(
        body["answers"][0]["text"],
        "adding new fact PIZZA, please state a question for this fact!"
    );

    let (_, body) = post_ask(
        router.clone(),
        json!({ "sessionId": session_id, "question": "best pizza?" }),
    )
    .await;
    assert_eq!(body["sessionId"], session_id.as_str());
    assert_eq!(
        body["answers"][0]["text"],
        "please provide an answer to this question!"
    );

    // A fresh session is still answering questions.
    h.provider.script(&["no"]);
    let (_, body) = post_ask(router, json!({ "question": "hi" })).await;
    assert_ne!(body["sessionId"], session_id.as_str());
    assert_eq!(body["answers"][0]["text"], "Hello WebUser");
}

#[tokio::test]
async fn web_errors_map_to_status_codes() {
    let h = harness(vec![weather()]).await;
    let router = server::create_router(h.state.clone());

    let (status, body) = post_ask(router.clone(), json!({ "question": "rgetfact snow" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "lookup");
    assert!(body["error"].as_str().unwrap().contains("SNOW"));

    let (status, body) = post_ask(router, json!({ "question": "raddfact weather" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn cli_prints_answers_and_errors() {
    let h = harness(vec![weather()]).await;
    let input: &[u8] = b"rnumfacts\n\n   \nrgetfact snow\nhow is the weather?\nbye\n";
    let mut output = Vec::new();
    h.provider.script(&["yes"]);
    h.provider.script(&["no"]);

    cli::run_with(h.state.clone(), input, &mut output).await.unwrap();

    let output = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "enter a question!");
    assert_eq!(lines[1], "1");
    assert!(lines[2].starts_with("error: "));
    assert_eq!(lines[3], "sunny with a chance of rain");
    assert_eq!(lines[4], "https://weather.test");
    assert_eq!(lines[5], "Good bye CliUser");
    assert_eq!(lines.len(), 6);
}
