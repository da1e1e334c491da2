use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct GreetingResponse {
    #[serde(rename = "Hello")]
    #[schema(example = "World")]
    pub hello: String,
}

/// Liveness greeting
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = GreetingResponse)
    ),
    tag = "Root"
)]
pub async fn greeting() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        hello: "World".to_string(),
    })
}
