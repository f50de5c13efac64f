use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::domain::{BaseDateRecord, ExceptionRecord, ProfessionalId};
use crate::config::UpstreamConfig;
use crate::session::AuthSessionStore;

/// Which upstream collection a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamResource {
    BaseSchedule,
    Exceptions,
}

impl UpstreamResource {
    pub fn label(self) -> &'static str {
        match self {
            Self::BaseSchedule => "base schedule",
            Self::Exceptions => "availability exceptions",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to reach upstream for {}: {source}", .resource.label())]
    Transport {
        resource: UpstreamResource,
        #[source]
        source: reqwest::Error,
    },
    #[error("upstream answered {status} for {}", .resource.label())]
    Status {
        resource: UpstreamResource,
        status: StatusCode,
    },
    #[error("upstream sent an unreadable {} payload: {source}", .resource.label())]
    Decode {
        resource: UpstreamResource,
        #[source]
        source: reqwest::Error,
    },
    #[error("unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Supplies the two inputs of the reconciliation.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    async fn base_dates(&self, professional: &ProfessionalId)
        -> Result<Vec<BaseDateRecord>, SourceError>;
    async fn exceptions(
        &self,
        professional: &ProfessionalId,
    ) -> Result<Vec<ExceptionRecord>, SourceError>;
}

/// Reads schedules and exceptions from the scheduling REST backend.
#[derive(Clone)]
pub struct HttpAvailabilitySource {
    client: Client,
    base_url: String,
    session: Option<Arc<dyn AuthSessionStore>>,
}

impl HttpAvailabilitySource {
    pub fn new(config: &UpstreamConfig) -> Result<Self, SourceError> {
        Self::with_timeout(&config.base_url, config.timeout)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SourceError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    /// Attaches the signed-in session's token to every request.
    pub fn with_session(mut self, store: Arc<dyn AuthSessionStore>) -> Self {
        self.session = Some(store);
        self
    }

    fn bearer_token(&self) -> Option<String> {
        let store = self.session.as_ref()?;
        match store.get() {
            Ok(session) => session.and_then(|session| session.bearer().map(str::to_string)),
            Err(err) => {
                warn!(error = %err, "continuing without session token");
                None
            }
        }
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        resource: UpstreamResource,
        path: String,
    ) -> Result<Vec<T>, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, resource = resource.label(), "fetching availability input");

        let mut request = self.client.get(&url);
        if let Some(token) = self.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|source| SourceError::Transport { resource, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { resource, status });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| SourceError::Decode { resource, source })
    }
}

#[async_trait]
impl AvailabilitySource for HttpAvailabilitySource {
    async fn base_dates(
        &self,
        professional: &ProfessionalId,
    ) -> Result<Vec<BaseDateRecord>, SourceError> {
        self.fetch_list(
            UpstreamResource::BaseSchedule,
            format!("/api/horarios/fechas/{professional}"),
        )
        .await
    }

    async fn exceptions(
        &self,
        professional: &ProfessionalId,
    ) -> Result<Vec<ExceptionRecord>, SourceError> {
        self.fetch_list(
            UpstreamResource::Exceptions,
            format!("/api/excepciones/profesional/{professional}"),
        )
        .await
    }
}
