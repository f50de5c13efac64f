//! RIF (Registro de Información Fiscal) check-digit engine and typed identifier.

mod checksum;
mod tax_id;

pub use checksum::{
    complete, compute_check_digit, format, normalize, validate, BODY_LEN, FULL_LEN,
};
pub use tax_id::{RifError, TaxId, TaxpayerKind};
