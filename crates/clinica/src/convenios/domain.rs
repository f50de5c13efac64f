use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rif::TaxId;

/// Identifier wrapper for registered partner companies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConvenioId(pub String);

impl ConvenioId {
    const PREFIX: &'static str = "conv-";

    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("{}{sequence:05}", Self::PREFIX))
    }

    /// Numeric part of identifiers minted by [`Self::from_sequence`].
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(Self::PREFIX)?.parse().ok()
    }
}

impl fmt::Display for ConvenioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Form payload for registering or editing a convenio. The RIF is raw user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvenioSubmission {
    pub nombre: String,
    pub rif: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub correo: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
}

/// Partner company that can be billed instead of the patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Convenio {
    pub id: ConvenioId,
    pub nombre: String,
    pub rif: TaxId,
    pub telefono: Option<String>,
    pub correo: Option<String>,
    pub direccion: Option<String>,
    pub activo: bool,
    pub registrado_en: DateTime<Utc>,
}

impl Convenio {
    pub fn view(&self) -> ConvenioView {
        ConvenioView {
            id: self.id.clone(),
            nombre: self.nombre.clone(),
            rif: self.rif.compact(),
            rif_formateado: self.rif.to_string(),
            tipo_contribuyente: self.rif.kind().label(),
            telefono: self.telefono.clone(),
            correo: self.correo.clone(),
            direccion: self.direccion.clone(),
            activo: self.activo,
        }
    }
}

/// Shape returned by the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct ConvenioView {
    pub id: ConvenioId,
    pub nombre: String,
    pub rif: String,
    pub rif_formateado: String,
    pub tipo_contribuyente: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    pub activo: bool,
}
