mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use itinerary_backend::message::{ErrorResponse, GenerateResponse, ItineraryResponse, StatusResponse};
use itinerary_backend::routes::create_router;
use itinerary_backend::state::SharedState;
use serde::de::DeserializeOwned;
use tower::util::ServiceExt;

use common::{SAMPLE_ITINERARY, StubGenerator, loaded_state, unloaded_state};

fn app(state: SharedState) -> Router {
    create_router().with_state(state)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_generate_response_endpoint() {
    let generator = StubGenerator::replying(SAMPLE_ITINERARY);
    let app = app(loaded_state(generator.clone()));

    let response = app
        .oneshot(post_json("/generate_response", r#"{"user_input": "2 dias em Lisboa"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: GenerateResponse = read_json(response).await;
    assert!(body.response.starts_with("**Dia 1"));
    assert_eq!(body.response, SAMPLE_ITINERARY.trim());

    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("2 dias em Lisboa"));
}

#[tokio::test]
async fn test_missing_user_input_is_rejected() {
    let generator = StubGenerator::replying("unused");
    let app = app(loaded_state(generator.clone()));

    for body in [r#"{}"#, r#"{"message": "Paris"}"#, r#"{"user_input": 42}"#, "not json"] {
        let response = app
            .clone()
            .oneshot(post_json("/generate_response", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);

        let err: ErrorResponse = read_json(response).await;
        assert_eq!(err.error, "Invalid input. 'user_input' is required.");
    }
    assert!(generator.last_prompt().is_none());
}

#[tokio::test]
async fn test_missing_content_type_is_rejected() {
    let app = app(loaded_state(StubGenerator::replying("unused")));
    let req = Request::builder()
        .method("POST")
        .uri("/generate_response")
        .body(Body::from(r#"{"user_input": "Roma"}"#))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unloaded_model_fails_every_request() {
    let app = app(unloaded_state());

    for body in [r#"{"user_input": "Roma"}"#, r#"{}"#] {
        let response = app
            .clone()
            .oneshot(post_json("/generate_response", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err: ErrorResponse = read_json(response).await;
        assert_eq!(err.error, "Model not loaded. Please check server logs.");
    }

    let response = app
        .oneshot(post_json("/generate_itinerary", r#"{"user_input": "Roma"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_status_reflects_model_state() {
    let response = app(loaded_state(StubGenerator::replying("")))
        .oneshot(get("/status"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status: StatusResponse = read_json(response).await;
    assert!(status.status.starts_with("Model loaded"));

    let response = app(unloaded_state()).oneshot(get("/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let status: StatusResponse = read_json(response).await;
    assert!(status.status.starts_with("Model not loaded"));
}

#[tokio::test]
async fn test_generation_error_is_reported() {
    let app = app(loaded_state(StubGenerator::failing("CUDA out of memory")));

    let response = app
        .oneshot(post_json("/generate_response", r#"{"user_input": "Tóquio"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let err: ErrorResponse = read_json(response).await;
    assert!(err.error.contains("CUDA out of memory"), "got: {}", err.error);
}

#[tokio::test]
async fn test_generate_itinerary_endpoint() {
    let app = app(loaded_state(StubGenerator::replying(SAMPLE_ITINERARY)));

    let response = app
        .oneshot(post_json("/generate_itinerary", r#"{"user_input": "Lisboa"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ItineraryResponse = read_json(response).await;
    let itinerary = body.itinerary.expect("itinerary should parse");
    assert_eq!(itinerary.days.len(), 2);
    assert_eq!(itinerary.days[0].day_title, "Dia 1: Chegada em Lisboa");
    assert_eq!(itinerary.days[0].activities.len(), 3);
    assert_eq!(itinerary.days[1].activities[1].activity, "Pastéis de Belém");
}

#[tokio::test]
async fn test_generate_itinerary_without_tables() {
    let app = app(loaded_state(StubGenerator::replying("Desculpe, não sei.")));

    let response = app
        .oneshot(post_json("/generate_itinerary", r#"{"user_input": "Marte"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = read_json(response).await;
    assert_eq!(body["response"], "Desculpe, não sei.");
    assert!(body["itinerary"].is_null());
}

#[tokio::test]
async fn test_metrics_count_outcomes() {
    let state = loaded_state(StubGenerator::replying(SAMPLE_ITINERARY));
    let app = app(state.clone());

    app.clone()
        .oneshot(post_json("/generate_response", r#"{"user_input": "Lisboa"}"#))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_json("/generate_response", r#"{}"#))
        .await
        .unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let metrics: serde_json::Value = read_json(response).await;
    assert_eq!(metrics["outcomes"]["completed"], 1);
    assert_eq!(metrics["outcomes"]["rejected"], 1);
    assert!(metrics["outcomes"].get("failed").is_none());
}
