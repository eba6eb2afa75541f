//! GraphQL HTTP endpoints
//!
//! - `POST /graphql` - executes an operation
//! - `GET /graphql/playground` - GraphQL Playground UI

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};

use crate::graphql::{prepare_request, CallerIdentity, RiskboardSchema};
use crate::graphql::loaders::BatchConfig;
use crate::repositories::Stores;

/// State shared by the GraphQL handlers
#[derive(Clone)]
pub struct GraphQLState {
    pub schema: RiskboardSchema,
    pub stores: Stores,
    pub batch: BatchConfig,
}

/// Create the GraphQL router
pub fn graphql_router(state: GraphQLState) -> Router {
    Router::new()
        .route("/", post(graphql_handler))
        .route("/playground", get(graphql_playground))
        .with_state(state)
}

/// Caller identity from the raw `Authorization` header
fn extract_identity(headers: &HeaderMap) -> CallerIdentity {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    CallerIdentity::from_header(value)
}

/// Execute a GraphQL operation with fresh per-request loaders
async fn graphql_handler(
    State(state): State<GraphQLState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let caller = extract_identity(&headers);
    if caller.name().is_some() {
        tracing::debug!("GraphQL request with caller identity");
    }

    let request = prepare_request(req.into_inner(), &state.stores, state.batch, caller);
    state.schema.execute(request).await.into()
}

/// GraphQL Playground handler
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}
