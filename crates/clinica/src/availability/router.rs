use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::AvailableDateSet;
use super::service::{AvailabilityError, AvailabilityService};
use super::source::AvailabilitySource;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AvailabilityQuery {
    /// Only return dates on or after this day (`YYYY-MM-DD`).
    #[serde(default)]
    pub(crate) desde: Option<String>,
}

impl AvailabilityQuery {
    fn lower_bound(&self) -> Result<Option<NaiveDate>, String> {
        match self.desde.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| format!("desde '{raw}' is not a YYYY-MM-DD date")),
        }
    }
}

fn unprocessable(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

/// Payload handed to date pickers.
#[derive(Debug, Serialize)]
pub struct AvailableDatesView {
    pub profesional_id: String,
    pub total: usize,
    pub fechas: AvailableDateSet,
}

/// Router exposing reconciled availability per professional.
pub fn availability_router<S>(service: Arc<AvailabilityService<S>>) -> Router
where
    S: AvailabilitySource + 'static,
{
    Router::new()
        .route(
            "/api/v1/profesionales/:professional_id/fechas-disponibles",
            get(available_dates_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn available_dates_handler<S>(
    State(service): State<Arc<AvailabilityService<S>>>,
    Path(professional_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Response
where
    S: AvailabilitySource + 'static,
{
    let desde = match query.lower_bound() {
        Ok(desde) => desde,
        Err(message) => return unprocessable(message),
    };

    match service.available_dates_for(&professional_id).await {
        Ok(dates) => {
            let fechas = match desde {
                Some(from) => dates.starting_from(from),
                None => dates,
            };
            let view = AvailableDatesView {
                profesional_id: professional_id.trim().to_string(),
                total: fechas.len(),
                fechas,
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(err @ AvailabilityError::InvalidProfessional { .. }) => unprocessable(err.to_string()),
        Err(err @ AvailabilityError::Source(_)) => {
            warn!(error = %err, professional = %professional_id, "availability lookup failed");
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
    }
}
