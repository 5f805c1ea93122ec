//! Integration tests for the OpenAI client against a local mock server.

mod common;

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use delta_core::requests::ImageGenerateParams;
use delta_providers::config::ProviderConfig;
use delta_providers::openai::OpenAIApi;
use delta_providers::{ImageGenerator, PromptCleaner, ProviderError};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Vec<String>>>,
}

fn record(rec: &Recorded, headers: &HeaderMap, body: Value) {
    rec.bodies.lock().unwrap().push(body);
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    rec.auth.lock().unwrap().push(auth);
}

async fn chat(
    State(rec): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&rec, &headers, body);
    Json(json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "{\"cleaned_prompt\":\"A small house\",\"dalle_prompt\":\"A small wooden house, isolated, neutral background\"}"
            }
        }]
    }))
}

async fn images(
    State(rec): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&rec, &headers, body);
    let n = rec.bodies.lock().unwrap().len();
    Json(json!({
        "data": [{ "url": format!("https://img.example/{n}.png"), "revised_prompt": format!("revised {n}") }]
    }))
}

async fn mock_config(router: Router) -> ProviderConfig {
    let base = common::spawn_mock(router).await;
    ProviderConfig {
        openai_api_key: Some("sk-test".into()),
        openai_api_base: base,
        ..ProviderConfig::default()
    }
}

#[tokio::test]
async fn clean_prompt_sends_chat_request_and_parses_reply() {
    let rec = Recorded::default();
    let router = Router::new()
        .route("/chat/completions", post(chat))
        .with_state(rec.clone());
    let api = OpenAIApi::new(&mock_config(router).await);

    let result = api
        .clean_prompt("a smal house", Some("scandinavian"))
        .await
        .unwrap();

    assert_eq!(result.cleaned_prompt, "A small house");
    assert!(result.dalle_prompt.contains("isolated"));

    let bodies = rec.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["model"], "gpt-4o");
    assert_eq!(bodies[0]["response_format"]["type"], "json_object");
    let user = bodies[0]["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("scandinavian"));
    assert!(user.contains("a smal house"));
    assert_eq!(rec.auth.lock().unwrap()[0], "Bearer sk-test");
}

#[tokio::test]
async fn generate_images_issues_one_request_per_image_in_order() {
    let rec = Recorded::default();
    let router = Router::new()
        .route("/images/generations", post(images))
        .with_state(rec.clone());
    let api = OpenAIApi::new(&mock_config(router).await);

    let params = ImageGenerateParams::for_pipeline("a tower", 3, true);
    let result = api.generate_images(&params).await.unwrap();

    assert_eq!(
        result.images,
        vec![
            "https://img.example/1.png",
            "https://img.example/2.png",
            "https://img.example/3.png",
        ]
    );
    assert_eq!(result.revised_prompts.len(), 3);

    let bodies = rec.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 3);
    for body in bodies.iter() {
        assert_eq!(body["n"], 1);
        assert_eq!(body["quality"], "hd");
        assert_eq!(body["model"], "dall-e-3");
    }
}

#[tokio::test]
async fn provider_error_status_is_reported_with_body() {
    let router = Router::new().route(
        "/chat/completions",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": { "message": "Rate limit reached" } })),
            )
        }),
    );
    let api = OpenAIApi::new(&mock_config(router).await);

    let err = api.clean_prompt("a small house", None).await.unwrap_err();
    assert_matches!(
        &err,
        ProviderError::ApiError { status: 429, body, .. } if body.contains("Rate limit reached")
    );
}

#[tokio::test]
async fn empty_image_data_is_invalid_response() {
    let router = Router::new().route(
        "/images/generations",
        post(|| async { Json(json!({ "data": [] })) }),
    );
    let api = OpenAIApi::new(&mock_config(router).await);

    let params = ImageGenerateParams::for_pipeline("a tower", 1, false);
    let err = api.generate_images(&params).await.unwrap_err();
    assert_matches!(err, ProviderError::InvalidResponse { .. });
}

#[tokio::test]
async fn non_json_reply_is_invalid_response() {
    let router = Router::new().route(
        "/chat/completions",
        post(|| async {
            Json(json!({ "choices": [{ "message": { "content": "Sure! Here is your prompt." } }] }))
        }),
    );
    let api = OpenAIApi::new(&mock_config(router).await);

    let err = api.clean_prompt("a small house", None).await.unwrap_err();
    assert_matches!(err, ProviderError::InvalidResponse { .. });
}
