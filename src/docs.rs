use utoipa::OpenApi;

use crate::modules::query::model::{
    ErrorResponse, HistoryRole, HistoryTurn, QueryRequest, QueryResponse,
};
use crate::modules::root::controller::GreetingResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::root::controller::greeting,
        crate::modules::query::controller::run_query,
    ),
    components(
        schemas(
            GreetingResponse,
            QueryRequest,
            QueryResponse,
            HistoryTurn,
            HistoryRole,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Root", description = "Service greeting"),
        (name = "Query", description = "Natural-language questions answered with SQL")
    ),
    info(
        title = "Shipwreck API",
        version = "0.1.0",
        description = "Ask questions about student billing data in plain language. A hosted language model writes one read-only SQL query, the service runs it and returns the rows.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;
