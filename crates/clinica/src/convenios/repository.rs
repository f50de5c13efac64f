use super::domain::{Convenio, ConvenioId};
use crate::rif::TaxId;

/// Storage abstraction so the service can be exercised in isolation.
///
/// A RIF identifies at most one convenio. `insert` and `update` enforce that atomically
/// with the write and answer [`RepositoryError::RifTaken`] otherwise.
pub trait ConvenioRepository: Send + Sync {
    fn insert(&self, convenio: Convenio) -> Result<Convenio, RepositoryError>;
    fn update(&self, convenio: Convenio) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ConvenioId) -> Result<Option<Convenio>, RepositoryError>;
    fn list(&self) -> Result<Vec<Convenio>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("RIF {0} belongs to another convenio")]
    RifTaken(TaxId),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
