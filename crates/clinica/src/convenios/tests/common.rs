use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::convenios::domain::{Convenio, ConvenioId, ConvenioSubmission};
use crate::convenios::repository::{ConvenioRepository, RepositoryError};
use crate::convenios::{convenio_router, ConvenioService};

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<HashMap<ConvenioId, Convenio>>,
}

impl ConvenioRepository for MemoryRepository {
    fn insert(&self, convenio: Convenio) -> Result<Convenio, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&convenio.id) {
            return Err(RepositoryError::Conflict);
        }
        if guard.values().any(|existing| existing.rif == convenio.rif) {
            return Err(RepositoryError::RifTaken(convenio.rif));
        }
        guard.insert(convenio.id.clone(), convenio.clone());
        Ok(convenio)
    }

    fn update(&self, convenio: Convenio) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let taken = guard
            .values()
            .any(|existing| existing.id != convenio.id && existing.rif == convenio.rif);
        if taken {
            return Err(RepositoryError::RifTaken(convenio.rif));
        }
        match guard.get_mut(&convenio.id) {
            Some(slot) => {
                *slot = convenio;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ConvenioId) -> Result<Option<Convenio>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Convenio>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl ConvenioRepository for UnavailableRepository {
    fn insert(&self, _convenio: Convenio) -> Result<Convenio, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _convenio: Convenio) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ConvenioId) -> Result<Option<Convenio>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Convenio>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn submission() -> ConvenioSubmission {
    ConvenioSubmission {
        nombre: "Seguros La Previsora".to_string(),
        rif: "j-12345678-4".to_string(),
        telefono: Some(" 0212-5550000 ".to_string()),
        correo: Some("convenios@previsora.test".to_string()),
        direccion: None,
    }
}

pub(super) fn submission_named(nombre: &str, rif: &str) -> ConvenioSubmission {
    ConvenioSubmission {
        nombre: nombre.to_string(),
        rif: rif.to_string(),
        telefono: None,
        correo: None,
        direccion: None,
    }
}

pub(super) fn service() -> ConvenioService<MemoryRepository> {
    ConvenioService::new(Arc::new(MemoryRepository::default()))
}

pub(super) fn router() -> axum::Router {
    convenio_router(Arc::new(service()))
}

pub(super) async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}
