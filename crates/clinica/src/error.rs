use crate::availability::AvailabilityError;
use crate::config::ConfigError;
use crate::session::SessionStoreError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Availability(AvailabilityError),
    Session(SessionStoreError),
    InvalidInput(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Availability(err) => write!(f, "availability error: {}", err),
            AppError::Session(err) => write!(f, "session error: {}", err),
            AppError::InvalidInput(message) => write!(f, "invalid input: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Availability(err) => Some(err),
            AppError::Session(err) => Some(err),
            AppError::InvalidInput(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_)
            | AppError::Availability(AvailabilityError::InvalidProfessional { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Availability(AvailabilityError::Source(_)) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<AvailabilityError> for AppError {
    fn from(value: AvailabilityError) -> Self {
        Self::Availability(value)
    }
}

impl From<crate::availability::SourceError> for AppError {
    fn from(value: crate::availability::SourceError) -> Self {
        Self::Availability(AvailabilityError::Source(value))
    }
}

impl From<SessionStoreError> for AppError {
    fn from(value: SessionStoreError) -> Self {
        Self::Session(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_unprocessable() {
        let response = AppError::InvalidInput("rif".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn upstream_failure_maps_to_bad_gateway() {
        let err = AppError::from(crate::availability::SourceError::Status {
            resource: crate::availability::UpstreamResource::BaseSchedule,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
