//! Partner companies (convenios) that can act as payer for appointments.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Convenio, ConvenioId, ConvenioSubmission, ConvenioView};
pub use repository::{ConvenioRepository, RepositoryError};
pub use router::convenio_router;
pub use service::{ConvenioService, ConvenioServiceError, ConvenioValidationError};
