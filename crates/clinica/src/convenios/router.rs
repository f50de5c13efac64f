use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ConvenioId, ConvenioSubmission, ConvenioView};
use super::repository::{ConvenioRepository, RepositoryError};
use super::service::{ConvenioService, ConvenioServiceError};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub(crate) activos: bool,
}

/// Router builder exposing the convenio registry.
pub fn convenio_router<R>(service: Arc<ConvenioService<R>>) -> Router
where
    R: ConvenioRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/convenios",
            get(list_handler::<R>).post(register_handler::<R>),
        )
        .route(
            "/api/v1/convenios/:convenio_id",
            get(fetch_handler::<R>)
                .put(update_handler::<R>)
                .delete(deactivate_handler::<R>),
        )
        .with_state(service)
}

fn error_response(error: ConvenioServiceError) -> Response {
    let status = match &error {
        ConvenioServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ConvenioServiceError::DuplicateRif(_)
        | ConvenioServiceError::Repository(
            RepositoryError::Conflict | RepositoryError::RifTaken(_),
        ) => StatusCode::CONFLICT,
        ConvenioServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ConvenioServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<ConvenioService<R>>>,
    Json(submission): Json<ConvenioSubmission>,
) -> Response
where
    R: ConvenioRepository + 'static,
{
    match service.register(submission) {
        Ok(convenio) => (StatusCode::CREATED, Json(convenio.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<ConvenioService<R>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: ConvenioRepository + 'static,
{
    match service.list(query.activos) {
        Ok(convenios) => {
            let views: Vec<ConvenioView> = convenios.iter().map(|c| c.view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<R>(
    State(service): State<Arc<ConvenioService<R>>>,
    Path(convenio_id): Path<String>,
) -> Response
where
    R: ConvenioRepository + 'static,
{
    match service.get(&ConvenioId(convenio_id)) {
        Ok(convenio) => (StatusCode::OK, Json(convenio.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<ConvenioService<R>>>,
    Path(convenio_id): Path<String>,
    Json(submission): Json<ConvenioSubmission>,
) -> Response
where
    R: ConvenioRepository + 'static,
{
    match service.update(&ConvenioId(convenio_id), submission) {
        Ok(convenio) => (StatusCode::OK, Json(convenio.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn deactivate_handler<R>(
    State(service): State<Arc<ConvenioService<R>>>,
    Path(convenio_id): Path<String>,
) -> Response
where
    R: ConvenioRepository + 'static,
{
    match service.deactivate(&ConvenioId(convenio_id)) {
        Ok(convenio) => (StatusCode::OK, Json(convenio.view())).into_response(),
        Err(error) => error_response(error),
    }
}
