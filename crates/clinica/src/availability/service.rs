use std::sync::Arc;

use tracing::{info, instrument};

use super::domain::{AvailableDateSet, ProfessionalId};
use super::reconcile::reconcile;
use super::source::{AvailabilitySource, SourceError};

/// Fetches both inputs for a professional and reconciles them on demand.
pub struct AvailabilityService<S> {
    source: Arc<S>,
}

impl<S> AvailabilityService<S>
where
    S: AvailabilitySource + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Both fetches run concurrently. The first failure aborts the call and no partial
    /// result is produced.
    #[instrument(skip_all, fields(professional = %professional))]
    pub async fn available_dates(
        &self,
        professional: &ProfessionalId,
    ) -> Result<AvailableDateSet, AvailabilityError> {
        let (base, exceptions) = tokio::try_join!(
            self.source.base_dates(professional),
            self.source.exceptions(professional),
        )?;

        let dates = reconcile(&base, &exceptions);
        info!(
            base = base.len(),
            exceptions = exceptions.len(),
            available = dates.len(),
            "reconciled availability"
        );
        Ok(dates)
    }

    /// Same as [`Self::available_dates`] for an unvalidated identifier.
    pub async fn available_dates_for(
        &self,
        raw_id: &str,
    ) -> Result<AvailableDateSet, AvailabilityError> {
        let professional = ProfessionalId::parse(raw_id).ok_or_else(|| {
            AvailabilityError::InvalidProfessional {
                value: raw_id.to_string(),
            }
        })?;
        self.available_dates(&professional).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("'{value}' is not a valid professional identifier")]
    InvalidProfessional { value: String },
    #[error(transparent)]
    Source(#[from] SourceError),
}
