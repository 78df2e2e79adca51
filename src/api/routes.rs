use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use crate::config::Config;
use crate::tts::TtsService;
use crate::workflow::WorkflowService;

pub struct AppState {
    pub config: Config,
    pub workflow: WorkflowService,
    pub tts: TtsService,
}

/// Answers every `OPTIONS` request itself; only the configured origins are echoed back.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let api_routes = Router::new()
        .route("/workflow", post(handlers::workflow))
        .route("/generate_workflow", post(handlers::generate_workflow))
        .route("/ask", post(handlers::ask))
        .route("/tts", post(handlers::tts));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .nest_service("/audio", ServeDir::new(&state.config.audio_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{gemini::classify_failure, GeminiClient, LlmError, TextGenerator};
    use crate::tts::PLACEHOLDER_AUDIO_URL;
    use crate::workflow::select_fallback;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use httpmock::MockServer;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    struct FakeGenerator {
        reply: Result<String, String>,
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(msg) => Err(classify_failure(None, msg)),
            }
        }
    }

    const AUDIO_FIXTURES: &str = "tests/fixtures/audio";

    fn test_config(gemini_key: Option<&str>, murf_key: Option<&str>) -> Config {
        config_with(gemini_key, murf_key, None)
    }

    fn config_with(
        gemini_key: Option<&str>,
        murf_key: Option<&str>,
        cors_origins: Option<&str>,
    ) -> Config {
        Config::from_lookup(|key| match key {
            "GEMINI_API_KEY" => gemini_key.map(String::from),
            "MURF_API_KEY" => murf_key.map(String::from),
            "CORS_ORIGINS" => cors_origins.map(String::from),
            "AUDIO_DIR" => Some(AUDIO_FIXTURES.to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn router_for(config: Config, generator: Option<Arc<dyn TextGenerator>>) -> Router {
        create_router(Arc::new(AppState {
            config,
            workflow: WorkflowService::new(generator),
            tts: TtsService::new(None),
        }))
    }

    fn router_with(reply: Option<Result<&str, &str>>) -> Router {
        let generator: Option<Arc<dyn TextGenerator>> = reply.map(|r| {
            Arc::new(FakeGenerator {
                reply: r.map(String::from).map_err(String::from),
            }) as Arc<dyn TextGenerator>
        });
        let config = test_config(generator.as_ref().map(|_| "test-key"), None);
        router_for(config, generator)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = send(router, request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn workflow_returns_model_text() {
        let router = router_with(Some(Ok("1. Book lessons")));
        let (status, body) =
            post_json(router, "/api/workflow", json!({"goal": "learn Spanish"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"workflow": "1. Book lessons"}));
    }

    #[tokio::test]
    async fn workflow_quota_error_returns_fallback_template() {
        let router = router_with(Some(Err("429 Too Many Requests")));
        let (status, body) =
            post_json(router, "/api/workflow", json!({"goal": "learn Spanish"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["workflow"], json!(select_fallback("learn Spanish")));
        assert!(body["workflow"]
            .as_str()
            .unwrap()
            .starts_with("# Learning Workflow: learn Spanish"));
    }

    #[tokio::test]
    async fn workflow_without_goal_is_bad_request() {
        let router = router_with(Some(Ok("unused")));
        let (status, body) = post_json(router, "/api/workflow", json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No user goal provided"}));
    }

    #[tokio::test]
    async fn workflow_with_invalid_json_is_bad_request() {
        let router = router_with(Some(Ok("unused")));
        let request = Request::builder()
            .method("POST")
            .uri("/api/workflow")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, bytes) = send(router, request).await;
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No JSON data provided"}));
    }

    #[tokio::test]
    async fn workflow_upstream_failure_is_server_error() {
        let router = router_with(Some(Err("model overloaded")));
        let (status, body) =
            post_json(router, "/api/workflow", json!({"goal": "learn Spanish"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "model overloaded"}));
    }

    #[tokio::test]
    async fn workflow_blocked_by_gemini_is_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST)
                    .path("/v1beta/models/gemini-1.5-flash:generateContent");
                then.status(200)
                    .json_body(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
            })
            .await;
        let client = GeminiClient::new(
            "test-key".into(),
            server.base_url(),
            "gemini-1.5-flash".into(),
            Duration::from_secs(5),
        )
        .unwrap();
        let router = router_for(
            test_config(Some("test-key"), None),
            Some(Arc::new(client) as Arc<dyn TextGenerator>),
        );

        let (status, body) =
            post_json(router, "/api/workflow", json!({"goal": "learn Spanish"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Gemini returned no text (blockReason: SAFETY)"})
        );
    }

    #[tokio::test]
    async fn workflow_without_credential_is_server_error() {
        let router = router_with(None);
        let (status, body) =
            post_json(router, "/api/workflow", json!({"goal": "learn Spanish"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "GEMINI_API_KEY not configured"}));
    }

    #[tokio::test]
    async fn generate_workflow_uses_steps_key() {
        let router = router_with(Some(Ok("1. Sketch")));
        let (status, body) =
            post_json(router, "/api/generate_workflow", json!({"goal": "draw a cat"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"steps": "1. Sketch"}));
    }

    #[tokio::test]
    async fn ask_returns_answer() {
        let router = router_with(Some(Ok(" Begin with step one. ")));
        let (status, body) = post_json(
            router,
            "/api/ask",
            json!({
                "question": "Where do I start?",
                "workflow_steps": ["1. Plan", "2. Do"],
                "conversation_history": [
                    {"type": "user", "content": "hi"},
                    {"type": "assistant", "content": "hello"}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"answer": "Begin with step one."}));
    }

    #[tokio::test]
    async fn ask_without_question_is_bad_request() {
        let router = router_with(Some(Ok("unused")));
        let (status, body) =
            post_json(router, "/api/ask", json!({"workflow_steps": ["1. Plan"]})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No question provided"}));
    }

    #[tokio::test]
    async fn tts_returns_placeholder_regardless_of_text() {
        for text in ["hello", "a much longer sentence to read aloud"] {
            let router = router_with(None);
            let (status, body) = post_json(router, "/api/tts", json!({"text": text})).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["audio_url"], body["audio_urls"][0]);
            assert_eq!(body["audio_url"], json!(PLACEHOLDER_AUDIO_URL));
        }
    }

    #[tokio::test]
    async fn tts_without_text_is_bad_request() {
        let router = router_with(None);
        let (status, body) = post_json(router, "/api/tts", json!({"voice_id": "x"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No text provided"}));
    }

    fn preflight_request(uri: &str, origin: &str) -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri(uri)
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn preflight_allows_configured_origin() {
        for uri in ["/api/workflow", "/api/tts", "/api/ask"] {
            let response = router_with(None)
                .oneshot(preflight_request(uri, "http://localhost:3000"))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let headers = response.headers();
            assert_eq!(
                headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
                "http://localhost:3000"
            );
            let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
            assert!(methods.contains("POST"));
        }
    }

    #[tokio::test]
    async fn preflight_from_unknown_origin_gets_no_allow_origin() {
        let response = router_with(None)
            .oneshot(preflight_request("/api/workflow", "http://evil.example"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn wildcard_origin_setting_allows_any_origin() {
        let router = router_for(config_with(None, None, Some("*")), None);
        let response = router
            .oneshot(preflight_request("/api/workflow", "https://anywhere.example"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn health_reports_credentials_without_calling_upstream() {
        let state = Arc::new(AppState {
            config: test_config(None, Some("murf-key")),
            workflow: WorkflowService::new(None),
            tts: TtsService::new(Some("murf-key".into())),
        });
        let (status, bytes) = send(create_router(state), get_request("/health")).await;
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["gemini_configured"], false);
        assert_eq!(body["murf_configured"], true);
    }

    #[tokio::test]
    async fn index_is_plain_text() {
        let (status, bytes) = send(router_with(None), get_request("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(bytes).unwrap().contains("/api/workflow"));
    }

    #[tokio::test]
    async fn audio_serves_files_from_audio_dir() {
        let (status, bytes) = send(router_with(None), get_request("/audio/sample.wav")).await;

        assert_eq!(status, StatusCode::OK);
        let expected = std::fs::read(format!("{}/sample.wav", AUDIO_FIXTURES)).unwrap();
        assert_eq!(bytes, expected);
    }

    #[tokio::test]
    async fn audio_rejects_parent_traversal() {
        let (status, _) = send(router_with(None), get_request("/audio/../../../Cargo.toml")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn audio_missing_file_is_not_found() {
        let (status, _) = send(router_with(None), get_request("/audio/nope.mp3")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
