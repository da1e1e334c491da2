use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use shipwreck_agent::llm::{ChatMessage, ChatModel, LlmError, OpenAiChatModel};
use shipwreck_agent::tools;
use shipwreck_config::LlmConfig;

#[derive(Clone, Default)]
struct Captured {
    auth: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<Value>>>,
}

async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Captured) {
    let captured = Captured::default();

    let app = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        *captured.auth.lock().unwrap() = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        *captured.body.lock().unwrap() = Some(body);
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1"), captured)
}

fn client(base_url: String) -> OpenAiChatModel {
    let mut config = LlmConfig::new("sk-test");
    config.base_url = base_url;
    config.model = "gpt-4o-mini".to_string();
    config.temperature = 0.0;
    OpenAiChatModel::new(config).unwrap()
}

#[tokio::test]
async fn test_tool_call_reply_is_parsed() {
    let (base_url, captured) = spawn_stub(
        StatusCode::OK,
        json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "sql_db_query",
                            "arguments": "{\"query\":\"SELECT code FROM Term\"}"
                        }
                    }]
                }
            }]
        }),
    )
    .await;
    let model = client(base_url.clone());
    assert_eq!(model.endpoint(), format!("{base_url}/chat/completions"));

    let reply = model
        .complete(
            &[ChatMessage::system("rules"), ChatMessage::user("terms?")],
            &tools::definitions(false),
        )
        .await
        .unwrap();

    assert_eq!(reply.content, None);
    assert_eq!(reply.tool_calls.len(), 1);
    assert_eq!(reply.tool_calls[0].id, "call_abc");
    assert_eq!(reply.tool_calls[0].function.name, "sql_db_query");

    assert_eq!(
        captured.auth.lock().unwrap().as_deref(),
        Some("Bearer sk-test")
    );
    let body = captured.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], json!("gpt-4o-mini"));
    assert_eq!(body["temperature"], json!(0.0));
    assert_eq!(body["tool_choice"], json!("auto"));
    assert_eq!(body["tools"][0]["function"]["name"], json!("sql_db_query"));
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": "rules"},
            {"role": "user", "content": "terms?"}
        ])
    );
}

#[tokio::test]
async fn test_no_tools_omits_tool_choice() {
    let (base_url, captured) = spawn_stub(
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": "hello"}}]}),
    )
    .await;

    let reply = client(base_url)
        .complete(&[ChatMessage::user("hi")], &[])
        .await
        .unwrap();

    assert_eq!(reply.content.as_deref(), Some("hello"));
    assert!(reply.tool_calls.is_empty());
    let body = captured.body.lock().unwrap().clone().unwrap();
    assert!(body.get("tools").is_none());
    assert!(body.get("tool_choice").is_none());
}

#[tokio::test]
async fn test_error_status_maps_to_api_error() {
    let (base_url, _) = spawn_stub(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"message": "Incorrect API key provided"}}),
    )
    .await;

    let err = client(base_url)
        .complete(&[ChatMessage::user("hi")], &[])
        .await
        .unwrap_err();

    match err {
        LlmError::Api { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Incorrect API key provided"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_choices() {
    let (base_url, _) = spawn_stub(StatusCode::OK, json!({"choices": []})).await;

    let err = client(base_url)
        .complete(&[ChatMessage::user("hi")], &[])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}/v1"))
        .complete(&[ChatMessage::user("hi")], &[])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Transport(_)));
}
