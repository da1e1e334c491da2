use axum::{Json, extract::State};
use shipwreck_agent::ConversationTurn;
use shipwreck_core::AppError;
use tracing::instrument;

use crate::modules::query::model::{ErrorResponse, QueryRequest, QueryResponse};
use crate::modules::query::service::QueryService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Answer a natural-language question with SQL
///
/// The model writes one read-only SELECT against the billing database. The
/// statement, its rows and the model's answer are returned together.
#[utoipa::path(
    post,
    path = "/query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Generated SQL, its rows and the model's answer", body = QueryResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 422, description = "Blank question, or the model never produced a usable query", body = ErrorResponse),
        (status = 500, description = "The database rejected the final query", body = ErrorResponse),
        (status = 502, description = "The language model request failed", body = ErrorResponse)
    ),
    tag = "Query"
)]
#[instrument(skip(state, request))]
pub async fn run_query(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let history: Vec<ConversationTurn> = request.history.into_iter().map(Into::into).collect();

    let response = QueryService::answer(&state.agent, &state.db, &request.query, &history).await?;

    Ok(Json(response))
}
