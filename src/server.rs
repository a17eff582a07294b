//! The HTTP surface of the gateway.
//!
//! Mirrors the envelope-always semantics of the query executor: every
//! request gets a `200 OK` with a well-formed GraphQL response body, errors
//! in-band.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::extract::State;
use axum::routing::get;
use serde::Deserialize;

use crate::executor::Executor;
use crate::graphql;

/// Query-string shape of a `GET /graphql` request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLParams {
    query: Option<String>,
    operation_name: Option<String>,
}

/// Build the gateway's axum application.
pub fn app(executor: Arc<Executor>) -> Router {
    Router::new()
        .route("/graphql", get(get_graphql).post(post_graphql))
        .with_state(executor)
}

async fn get_graphql(
    State(executor): State<Arc<Executor>>,
    Query(params): Query<GraphQLParams>,
) -> Json<graphql::Response> {
    let request = graphql::Request {
        query: params.query,
        operation_name: params.operation_name,
    };
    Json(executor.execute(request).await)
}

async fn post_graphql(
    State(executor): State<Arc<Executor>>,
    Json(request): Json<graphql::Request>,
) -> Json<graphql::Response> {
    Json(executor.execute(request).await)
}
