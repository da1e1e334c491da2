mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    UNDERGRAD_TUITION_BY_TERM, post_json, send, setup_test_app, setup_test_app_with,
};
use serde_json::json;
use shipwreck_agent::executor::ITERATION_LIMIT_MESSAGE;
use shipwreck_agent::llm::{ChatMessage, LlmError};
use shipwreck_agent::testing::{ScriptedChatModel, answer, query_call, tool_call};
use shipwreck_config::AgentConfig;

#[tokio::test]
async fn test_root_greeting() {
    let app = setup_test_app(Vec::new()).await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Hello": "World"}));
}

#[tokio::test]
async fn test_query_returns_rows_sql_and_answer() {
    let app = setup_test_app(vec![
        query_call("call_1", UNDERGRAD_TUITION_BY_TERM),
        answer("Undergraduate tuition revenue was 14,250 in 2019FA and 12,480 in 2020SP."),
    ])
    .await;

    let (status, body) = post_json(
        app.router,
        "/query",
        r#"{"query": "Undergrad tuition revenue by term"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "output": [
                {"term_code": "2019FA", "total_revenue": 14250.0},
                {"term_code": "2020SP", "total_revenue": 12480.0}
            ],
            "query": UNDERGRAD_TUITION_BY_TERM,
            "content": "Undergraduate tuition revenue was 14,250 in 2019FA and 12,480 in 2020SP."
        })
    );

    let requests = app.model.requests();
    assert_eq!(requests.len(), 2);
    assert!(matches!(
        &requests[0][0],
        ChatMessage::System { content } if content.contains("User question:\nUndergrad tuition revenue by term")
    ));
}

#[tokio::test]
async fn test_output_is_not_limited_by_top_k() {
    let config = AgentConfig {
        top_k: 2,
        ..AgentConfig::default()
    };
    let model = ScriptedChatModel::new([
        query_call("call_1", "SELECT charge_id FROM Charge ORDER BY charge_id"),
        answer("There are eight charges."),
    ]);
    let app = setup_test_app_with(model, config).await;

    let (status, body) = post_json(app.router, "/query", r#"{"query": "list charges"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"].as_array().unwrap().len(), 8);

    let requests = app.model.requests();
    let ChatMessage::Tool { content, .. } = &requests[1][3] else {
        panic!("expected tool observation");
    };
    assert!(content.ends_with("(showing the first 2 rows; more rows were returned)"));
}

#[tokio::test]
async fn test_history_reaches_the_prompt() {
    let app = setup_test_app(vec![
        query_call("call_1", "SELECT code FROM Term WHERE code = '2020SP'"),
        answer("2020SP."),
    ])
    .await;

    let (status, _) = post_json(
        app.router,
        "/query",
        r#"{"query": "and the spring one?", "history": [
            {"role": "human", "content": "what was the fall 2019 term code?"},
            {"role": "ai", "content": "2019FA"}
        ]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let requests = app.model.requests();
    let ChatMessage::System { content } = &requests[0][0] else {
        panic!("expected system prompt");
    };
    assert!(content.contains("Human: what was the fall 2019 term code?\nAI: 2019FA"));
}

#[tokio::test]
async fn test_unsafe_sql_is_corrected_by_the_model() {
    let app = setup_test_app(vec![
        query_call("call_1", "SELECT 1; DROP TABLE Charge"),
        query_call("call_2", "SELECT COUNT(*) AS charge_count FROM Charge"),
        answer("There are 8 charges."),
    ])
    .await;

    let (status, body) = post_json(app.router, "/query", r#"{"query": "how many charges?"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"], json!([{"charge_count": 8}]));
    assert_eq!(body["query"], json!("SELECT COUNT(*) AS charge_count FROM Charge"));
}

#[tokio::test]
async fn test_blank_query_is_unprocessable() {
    let app = setup_test_app(Vec::new()).await;

    let (status, body) = post_json(app.router, "/query", r#"{"query": "   "}"#).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"error": "query must not be blank"}));
    assert!(app.model.requests().is_empty());
}

#[tokio::test]
async fn test_missing_query_field_is_bad_request() {
    let app = setup_test_app(Vec::new()).await;

    let (status, body) = post_json(app.router, "/query", r#"{"question": "hi"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "query is required"}));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup_test_app(Vec::new()).await;

    let (status, body) = post_json(app.router, "/query", r#"{"query": "#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid request body"}));
}

#[tokio::test]
async fn test_no_tool_call_is_unprocessable() {
    let config = AgentConfig {
        handle_parsing_errors: false,
        ..AgentConfig::default()
    };
    let model = ScriptedChatModel::new([answer("SELECT * FROM Charge")]);
    let app = setup_test_app_with(model, config).await;

    let (status, body) = post_json(app.router, "/query", r#"{"query": "all charges"}"#).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({"error": "the model answered without calling the SQL tool"})
    );
}

#[tokio::test]
async fn test_iteration_limit_keeps_last_successful_query() {
    let config = AgentConfig {
        max_iterations: 2,
        ..AgentConfig::default()
    };
    let model = ScriptedChatModel::new([
        query_call("call_1", "SELECT code FROM Term WHERE term_id = 1"),
        tool_call("call_2", "sql_db_query", r#"{"query": "SELECT broken FROM Term"}"#),
    ]);
    let app = setup_test_app_with(model, config).await;

    let (status, body) = post_json(app.router, "/query", r#"{"query": "first term"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], json!("SELECT code FROM Term WHERE term_id = 1"));
    assert_eq!(body["output"], json!([{"code": "2019FA"}]));
    assert_eq!(body["content"], json!(ITERATION_LIMIT_MESSAGE));
}

#[tokio::test]
async fn test_model_failure_is_bad_gateway() {
    let model = ScriptedChatModel::with_results([Err(LlmError::Api {
        status: 429,
        body: "rate limited".to_string(),
    })]);
    let app = setup_test_app_with(model, AgentConfig::default()).await;

    let (status, body) = post_json(app.router, "/query", r#"{"query": "anything"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({"error": "language model API returned 429: rate limited"})
    );
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let app = setup_test_app(Vec::new()).await;
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/query")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router, request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app(Vec::new()).await;
    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/query"]["post"].is_object());
}
