use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use shipwreck::router::init_router;
use shipwreck::state::AppState;
use shipwreck_agent::llm::AssistantReply;
use shipwreck_agent::testing::ScriptedChatModel;
use shipwreck_config::{AgentConfig, CorsConfig};
use shipwreck_db::{Database, demo};
use tower::ServiceExt;

/// Undergraduate active tuition by term, written the way the model is
/// told to write it.
#[allow(dead_code)]
pub const UNDERGRAD_TUITION_BY_TERM: &str = "SELECT t.code AS term_code, \
    SUM(CAST(c.quantity AS REAL)*CAST(c.unit_amount AS REAL)) AS total_revenue \
    FROM Charge c \
    JOIN StudentAccountTerm sat ON sat.student_account_term_id=c.student_account_term_id \
    JOIN Term t ON t.term_id=sat.term_id \
    JOIN Student s ON s.student_id=sat.student_id \
    WHERE c.charge_type='Tuition' AND s.active=TRUE \
      AND s.standing IN ('Freshman','Sophomore','Junior','Senior') \
    GROUP BY t.code ORDER BY t.code";

pub struct TestApp {
    pub router: Router,
    pub model: Arc<ScriptedChatModel>,
}

/// Router over the in-memory demo database, answering with `replies`.
#[allow(dead_code)]
pub async fn setup_test_app(replies: Vec<AssistantReply>) -> TestApp {
    setup_test_app_with(ScriptedChatModel::new(replies), AgentConfig::default()).await
}

pub async fn setup_test_app_with(model: ScriptedChatModel, config: AgentConfig) -> TestApp {
    let pool = demo::in_memory().await.unwrap();
    let model = Arc::new(model);
    let state = AppState::new(
        Database::from_sqlite_pool(pool),
        model.clone(),
        config,
        CorsConfig::default(),
    );

    TestApp {
        router: init_router(state),
        model,
    }
}

#[allow(dead_code)]
pub async fn post_json(router: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
