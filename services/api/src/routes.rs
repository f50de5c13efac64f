use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use clinica::availability::{availability_router, AvailabilityService, AvailabilitySource};
use clinica::convenios::{convenio_router, ConvenioRepository, ConvenioService};
use clinica::error::AppError;
use clinica::rif::{self, TaxId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct RifValidationRequest {
    pub(crate) rif: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RifValidationResponse {
    pub(crate) normalized: String,
    pub(crate) valid: bool,
    pub(crate) formatted: String,
    /// Digit the body calls for, when the first nine characters are well formed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) check_digit: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tipo_contribuyente: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckDigitResponse {
    pub(crate) body: String,
    pub(crate) check_digit: u8,
    pub(crate) rif: String,
    pub(crate) formatted: String,
}

pub(crate) fn with_domain_routes<R, S>(
    convenios: Arc<ConvenioService<R>>,
    availability: Arc<AvailabilityService<S>>,
) -> axum::Router
where
    R: ConvenioRepository + 'static,
    S: AvailabilitySource + 'static,
{
    convenio_router(convenios)
        .merge(availability_router(availability))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/rif/validate",
            axum::routing::post(rif_validate_endpoint),
        )
        .route(
            "/api/v1/rif/check-digit/:body",
            axum::routing::get(rif_check_digit_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Always answers 200: an invalid RIF is a normal outcome for a form being filled in.
pub(crate) async fn rif_validate_endpoint(
    Json(payload): Json<RifValidationRequest>,
) -> Json<RifValidationResponse> {
    let normalized = rif::normalize(&payload.rif);
    let check_digit = normalized
        .get(..rif::BODY_LEN)
        .and_then(rif::compute_check_digit);
    let parsed = TaxId::parse(&normalized).ok();

    Json(RifValidationResponse {
        valid: parsed.is_some(),
        formatted: rif::format(&normalized),
        check_digit,
        tipo_contribuyente: parsed.map(|tax_id| tax_id.kind().label()),
        normalized,
    })
}

pub(crate) async fn rif_check_digit_endpoint(
    Path(body): Path<String>,
) -> Result<Json<CheckDigitResponse>, AppError> {
    let tax_id =
        TaxId::from_body(&body).map_err(|err| AppError::InvalidInput(err.to_string()))?;

    Ok(Json(CheckDigitResponse {
        body: tax_id.body(),
        check_digit: tax_id.check_digit(),
        rif: tax_id.compact(),
        formatted: tax_id.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryConvenioRepository;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    use clinica::availability::{BaseDateRecord, ExceptionRecord, ProfessionalId, SourceError};

    /// Upstream with no recurring schedule and a single manually opened day.
    struct ManualOnlyUpstream;

    #[async_trait::async_trait]
    impl AvailabilitySource for ManualOnlyUpstream {
        async fn base_dates(
            &self,
            _professional: &ProfessionalId,
        ) -> Result<Vec<BaseDateRecord>, SourceError> {
            Ok(Vec::new())
        }

        async fn exceptions(
            &self,
            _professional: &ProfessionalId,
        ) -> Result<Vec<ExceptionRecord>, SourceError> {
            Ok(vec![ExceptionRecord {
                fecha: Some("2025-05-27".to_string()),
                estado: Some("manual".to_string()),
            }])
        }
    }

    #[tokio::test]
    async fn validate_endpoint_reports_expected_digit() {
        let Json(body) = rif_validate_endpoint(Json(RifValidationRequest {
            rif: "v-12345678-9".to_string(),
        }))
        .await;

        assert!(!body.valid);
        assert_eq!(body.normalized, "V123456789");
        assert_eq!(body.formatted, "V-12345678-9");
        assert_eq!(body.check_digit, Some(1));
        assert!(body.tipo_contribuyente.is_none());
    }

    #[tokio::test]
    async fn validate_endpoint_handles_partial_input() {
        let Json(body) = rif_validate_endpoint(Json(RifValidationRequest {
            rif: "J-1234".to_string(),
        }))
        .await;

        assert!(!body.valid);
        assert_eq!(body.formatted, "J1234");
        assert_eq!(body.check_digit, None);
    }

    #[tokio::test]
    async fn check_digit_endpoint_completes_body() {
        let Json(body) = rif_check_digit_endpoint(Path("J12345678".to_string()))
            .await
            .expect("valid body");

        assert_eq!(body.check_digit, 4);
        assert_eq!(body.rif, "J123456784");
        assert_eq!(body.formatted, "J-12345678-4");
    }

    #[tokio::test]
    async fn check_digit_endpoint_rejects_bad_body() {
        let result = rif_check_digit_endpoint(Path("Z123".to_string())).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn composed_router_serves_every_surface() {
        let convenios = Arc::new(ConvenioService::new(Arc::new(
            InMemoryConvenioRepository::default(),
        )));
        let availability = Arc::new(AvailabilityService::new(Arc::new(ManualOnlyUpstream)));
        let metrics = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(metrics),
        };
        let app = with_domain_routes(convenios, availability).layer(Extension(state));

        for (uri, expected) in [
            ("/health", StatusCode::OK),
            ("/ready", StatusCode::OK),
            ("/api/v1/convenios", StatusCode::OK),
            ("/api/v1/profesionales/8/fechas-disponibles", StatusCode::OK),
            ("/api/v1/rif/check-digit/V12345678", StatusCode::OK),
            ("/api/v1/rif/check-digit/V1", StatusCode::UNPROCESSABLE_ENTITY),
        ] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri(uri)
                        .body(Body::empty())
                        .expect("request builds"),
                )
                .await
                .expect("router responds");
            assert_eq!(response.status(), expected, "{uri}");
        }
    }
}
