use axum::Json;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::pipeline::solve_equation_with;

use super::AppState;
use super::response::{
    ApiError, MISSING_EQUATION, MessageResponse, ROOT_MESSAGE, SolveParams, SolveResponse,
};

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

pub async fn solve(
    State(state): State<AppState>,
    Query(params): Query<SolveParams>,
) -> Result<Json<SolveResponse>, ApiError> {
    let equation = params.equation.as_deref().unwrap_or_default().trim().to_string();
    if equation.is_empty() {
        return Err(ApiError::bad_request(MISSING_EQUATION));
    }
    debug!(%equation, "solve request");

    let engine = state.engine.clone();
    let outcome =
        tokio::task::spawn_blocking(move || solve_equation_with(engine.as_ref(), &equation)).await;

    match outcome {
        Ok(Ok(result)) => Ok(Json(SolveResponse { result })),
        Ok(Err(err)) if err.is_user_error() => Err(ApiError::bad_request(err.to_string())),
        Ok(Err(err)) => {
            warn!(%err, "solver failed unexpectedly");
            Err(ApiError::internal(err))
        }
        Err(join_err) => {
            warn!(%join_err, "solver task did not complete");
            Err(ApiError::internal(join_err))
        }
    }
}

/// CORS preflight: empty 200, headers come from the CORS layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        ApiError::not_found().into_response()
    }
}
