use crate::cli::Args;
use crate::llm::{ self, CompletionError };
use crate::llm::completion::{ CompletionClient, CompletionConfig };
use crate::models::chat::{ ChatTurn, RelayReply };

use std::error::Error;
use std::net::SocketAddr;

use axum::{
    extract::{ DefaultBodyLimit, State },
    http::StatusCode,
    response::{ IntoResponse, Response },
    routing::{ get, post },
    Json,
    Router,
};
use log::{ error, info };
use serde_json::{ json, Value };
use tower_http::cors::{ Any, CorsLayer };
use tower_http::services::ServeDir;

// JSON bodies are capped at 1 MiB.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
struct AppState {
    args: Args,
    http: reqwest::Client,
}

pub fn router(args: Args) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        args: args.clone(),
        http: reqwest::Client::new(),
    };

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .fallback_service(ServeDir::new(&args.static_dir))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

pub async fn serve(addr: &str, args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr: SocketAddr = addr.parse()?;
    let app = router(args);

    info!("Server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn chat_handler(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let turns = match parse_turns(&body) {
        Some(turns) => turns,
        None => {
            return error_response(
                StatusCode::BAD_REQUEST,
                json!({ "error": "messages must be a non-empty array" })
            );
        }
    };

    let (api_key, folder_id) = match credentials(&state.args) {
        Some(credentials) => credentials,
        None => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Server misconfiguration: missing YANDEX_API_KEY or YANDEX_FOLDER_ID"
                })
            );
        }
    };

    let temperature = llm::resolve_temperature(body.get("temperature"));
    let max_tokens = llm::resolve_max_tokens(body.get("maxTokens"));

    let client = CompletionClient::new(state.http.clone(), CompletionConfig {
        api_key,
        folder_id,
        model: state.args.model.clone(),
        endpoint: state.args.completion_url.clone(),
    });
    let request = client.build_request(&turns, temperature, max_tokens);

    // Outbound parameters are logged in full; credentials never are.
    info!("[LLM Request] modelUri: {}", request.model_uri);
    info!(
        "[LLM Request] req temperature: {} => used: {}",
        body.get("temperature").unwrap_or(&Value::Null),
        temperature
    );
    info!("[LLM Request] completionOptions: {:?}", request.completion_options);
    info!("[LLM Request] messages: {:?}", request.messages);

    match client.complete(&request).await {
        Ok(raw) => {
            let reply = llm::completion::reply_text(&raw);
            Json(RelayReply {
                reply,
                used_temperature: temperature,
                raw,
            }).into_response()
        }
        Err(CompletionError::Upstream { status, body }) => {
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Yandex API error", "status": status, "details": body })
            )
        }
        Err(err) => {
            error!("Chat error: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal error" }))
        }
    }
}

/// The turn list must be present, well-formed, and non-empty; anything else
/// is a client error before any outbound traffic.
fn parse_turns(body: &Value) -> Option<Vec<ChatTurn>> {
    let messages = body.get("messages")?;
    let turns: Vec<ChatTurn> = serde_json::from_value(messages.clone()).ok()?;
    if turns.is_empty() {
        None
    } else {
        Some(turns)
    }
}

fn credentials(args: &Args) -> Option<(String, String)> {
    match (&args.api_key, &args.folder_id) {
        (Some(key), Some(folder)) if !key.is_empty() && !folder.is_empty() => {
            Some((key.clone(), folder.clone()))
        }
        _ => None,
    }
}

fn error_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_args(api_key: Option<&str>, folder_id: Option<&str>) -> Args {
        Args {
            port: 0,
            static_dir: "public".to_string(),
            api_key: api_key.map(str::to_string),
            folder_id: folder_id.map(str::to_string),
            model: "yandexgpt/latest".to_string(),
            // port 9 is never listening; these tests must fail before any
            // outbound call
            completion_url: "http://127.0.0.1:9/completion".to_string(),
        }
    }

    async fn post_chat(app: Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap()
            ).await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = router(test_args(Some("key"), Some("folder")));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn missing_message_list_is_rejected() {
        let app = router(test_args(Some("key"), Some("folder")));
        let (status, body) = post_chat(app, json!({ "temperature": 0.5 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "messages must be a non-empty array");
    }

    #[tokio::test]
    async fn empty_message_list_is_rejected() {
        let app = router(test_args(Some("key"), Some("folder")));
        let (status, _) = post_chat(app, json!({ "messages": [] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_list_messages_are_rejected() {
        let app = router(test_args(Some("key"), Some("folder")));
        let (status, _) = post_chat(app, json!({ "messages": "hello" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_turns_are_rejected() {
        let app = router(test_args(Some("key"), Some("folder")));
        let (status, _) = post_chat(
            app,
            json!({ "messages": [{ "role": "tool", "content": "x" }] })
        ).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_credentials_is_a_configuration_error() {
        let app = router(test_args(None, None));
        let (status, body) = post_chat(
            app,
            json!({ "messages": [{ "role": "user", "content": "Hi" }] })
        ).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("misconfiguration"));
    }

    #[tokio::test]
    async fn blank_credentials_are_treated_as_missing() {
        let app = router(test_args(Some(""), Some("folder")));
        let (status, _) = post_chat(
            app,
            json!({ "messages": [{ "role": "user", "content": "Hi" }] })
        ).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
