use chrono::NaiveDate;
use clinica::convenios::{Convenio, ConvenioId, ConvenioRepository, RepositoryError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local convenio storage; the REST backend owns persistence.
#[derive(Default, Clone)]
pub(crate) struct InMemoryConvenioRepository {
    records: Arc<Mutex<BTreeMap<ConvenioId, Convenio>>>,
}

impl InMemoryConvenioRepository {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<ConvenioId, Convenio>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

/// Runs under the same lock as the write it guards.
fn ensure_rif_unclaimed(
    records: &BTreeMap<ConvenioId, Convenio>,
    candidate: &Convenio,
) -> Result<(), RepositoryError> {
    let claimed = records
        .values()
        .any(|existing| existing.id != candidate.id && existing.rif == candidate.rif);
    if claimed {
        Err(RepositoryError::RifTaken(candidate.rif.clone()))
    } else {
        Ok(())
    }
}

impl ConvenioRepository for InMemoryConvenioRepository {
    fn insert(&self, convenio: Convenio) -> Result<Convenio, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&convenio.id) {
            return Err(RepositoryError::Conflict);
        }
        ensure_rif_unclaimed(&guard, &convenio)?;
        guard.insert(convenio.id.clone(), convenio.clone());
        Ok(convenio)
    }

    fn update(&self, convenio: Convenio) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&convenio.id) {
            ensure_rif_unclaimed(&guard, &convenio)?;
            guard.insert(convenio.id.clone(), convenio);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ConvenioId) -> Result<Option<Convenio>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Convenio>, RepositoryError> {
        Ok(self.lock()?.values().cloned().collect())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
