use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{Convenio, ConvenioId, ConvenioSubmission};
use super::repository::{ConvenioRepository, RepositoryError};
use crate::rif::{RifError, TaxId};

/// Registry of partner companies. Every stored RIF has passed check-digit validation.
pub struct ConvenioService<R> {
    repository: Arc<R>,
    sequence: AtomicU64,
}

/// Cleaned fields of a submission, ready to be applied to a record.
struct ValidatedSubmission {
    nombre: String,
    rif: TaxId,
    telefono: Option<String>,
    correo: Option<String>,
    direccion: Option<String>,
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn validate(
    submission: ConvenioSubmission,
) -> Result<ValidatedSubmission, ConvenioValidationError> {
    let nombre = submission.nombre.trim().to_string();
    if nombre.is_empty() {
        return Err(ConvenioValidationError::MissingName);
    }

    let rif = TaxId::parse(&submission.rif)?;

    let correo = optional_text(submission.correo);
    if let Some(address) = &correo {
        let well_formed = address
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or(false);
        if !well_formed {
            return Err(ConvenioValidationError::InvalidEmail(address.clone()));
        }
    }

    Ok(ValidatedSubmission {
        nombre,
        rif,
        telefono: optional_text(submission.telefono),
        correo,
        direccion: optional_text(submission.direccion),
    })
}

fn rif_conflict(error: RepositoryError) -> ConvenioServiceError {
    match error {
        RepositoryError::RifTaken(rif) => ConvenioServiceError::DuplicateRif(rif.to_string()),
        other => other.into(),
    }
}

impl<R> ConvenioService<R>
where
    R: ConvenioRepository + 'static,
{
    /// Identifiers continue after the highest one already stored.
    pub fn new(repository: Arc<R>) -> Self {
        let next = match repository.list() {
            Ok(existing) => existing
                .iter()
                .filter_map(|convenio| convenio.id.sequence())
                .max()
                .map_or(1, |highest| highest + 1),
            Err(err) => {
                warn!(error = %err, "unable to seed convenio ids, starting at 1");
                1
            }
        };

        Self {
            repository,
            sequence: AtomicU64::new(next),
        }
    }

    fn next_id(&self) -> ConvenioId {
        ConvenioId::from_sequence(self.sequence.fetch_add(1, Ordering::Relaxed))
    }

    /// Validate and store a new convenio as active.
    pub fn register(
        &self,
        submission: ConvenioSubmission,
    ) -> Result<Convenio, ConvenioServiceError> {
        let fields = validate(submission)?;

        let convenio = Convenio {
            id: self.next_id(),
            nombre: fields.nombre,
            rif: fields.rif,
            telefono: fields.telefono,
            correo: fields.correo,
            direccion: fields.direccion,
            activo: true,
            registrado_en: Utc::now(),
        };

        let stored = self.repository.insert(convenio).map_err(rif_conflict)?;
        info!(id = %stored.id, rif = %stored.rif, "convenio registered");
        Ok(stored)
    }

    pub fn get(&self, id: &ConvenioId) -> Result<Convenio, ConvenioServiceError> {
        let convenio = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(convenio)
    }

    /// All convenios ordered by name, optionally restricted to active ones.
    pub fn list(&self, only_active: bool) -> Result<Vec<Convenio>, ConvenioServiceError> {
        let mut convenios: Vec<Convenio> = self
            .repository
            .list()?
            .into_iter()
            .filter(|convenio| !only_active || convenio.activo)
            .collect();
        convenios.sort_by(|a, b| {
            a.nombre
                .to_lowercase()
                .cmp(&b.nombre.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(convenios)
    }

    /// Replace the editable fields, re-running every validation.
    pub fn update(
        &self,
        id: &ConvenioId,
        submission: ConvenioSubmission,
    ) -> Result<Convenio, ConvenioServiceError> {
        let mut convenio = self.get(id)?;
        let fields = validate(submission)?;

        convenio.nombre = fields.nombre;
        convenio.rif = fields.rif;
        convenio.telefono = fields.telefono;
        convenio.correo = fields.correo;
        convenio.direccion = fields.direccion;

        self.repository
            .update(convenio.clone())
            .map_err(rif_conflict)?;
        Ok(convenio)
    }

    /// Soft delete: the record stays so past appointments keep their payer.
    pub fn deactivate(&self, id: &ConvenioId) -> Result<Convenio, ConvenioServiceError> {
        let mut convenio = self.get(id)?;
        if convenio.activo {
            convenio.activo = false;
            self.repository.update(convenio.clone())?;
            info!(id = %convenio.id, "convenio deactivated");
        }
        Ok(convenio)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConvenioValidationError {
    #[error("nombre is required")]
    MissingName,
    #[error(transparent)]
    InvalidRif(#[from] RifError),
    #[error("'{0}' is not a valid e-mail address")]
    InvalidEmail(String),
}

/// Error raised by the convenio service.
#[derive(Debug, thiserror::Error)]
pub enum ConvenioServiceError {
    #[error(transparent)]
    Validation(#[from] ConvenioValidationError),
    #[error("a convenio with RIF {0} already exists")]
    DuplicateRif(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
