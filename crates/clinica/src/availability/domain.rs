use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a professional as used by the scheduling backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfessionalId(pub String);

impl ProfessionalId {
    /// Rejects blank identifiers and anything that would escape a path segment.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let acceptable = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        acceptable.then(|| Self(trimmed.to_string()))
    }
}

impl fmt::Display for ProfessionalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the recurring schedule, `{ "fecha": ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseDateRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub fecha: Option<String>,
}

/// One availability exception, `{ "fecha": ..., "estado": ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub fecha: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub estado: Option<String>,
}

impl ExceptionRecord {
    pub fn state(&self) -> Option<ExceptionState> {
        self.estado.as_deref().and_then(ExceptionState::from_wire)
    }
}

/// Accepts any JSON value and keeps it only when it is a string.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => Some(text),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExceptionState {
    /// Removes a date from the recurring schedule.
    #[serde(rename = "cancelado")]
    Cancelled,
    /// Opens a date the recurring schedule does not cover.
    #[serde(rename = "manual")]
    Manual,
}

impl ExceptionState {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim() {
            "cancelado" => Some(Self::Cancelled),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AvailabilityException {
    pub date: NaiveDate,
    pub state: ExceptionState,
}

/// Bookable calendar dates, ascending and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AvailableDateSet(BTreeSet<NaiveDate>);

impl AvailableDateSet {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.iter().copied()
    }

    /// Dates on or after `from`.
    pub fn starting_from(&self, from: NaiveDate) -> Self {
        Self(self.0.range(from..).copied().collect())
    }

    pub fn into_vec(self) -> Vec<NaiveDate> {
        self.0.into_iter().collect()
    }
}

impl FromIterator<NaiveDate> for AvailableDateSet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_tolerate_odd_payloads() {
        let records: Vec<ExceptionRecord> = serde_json::from_str(
            r#"[
                {"fecha": "2025-05-27", "estado": "manual", "id": 4},
                {"fecha": 20250527, "estado": "cancelado"},
                {"estado": null},
                {"fecha": "2025-05-30", "estado": "bloqueado"}
            ]"#,
        )
        .expect("payload decodes");

        assert_eq!(records[0].state(), Some(ExceptionState::Manual));
        assert_eq!(records[1].fecha, None);
        assert_eq!(records[1].state(), Some(ExceptionState::Cancelled));
        assert_eq!(records[2], ExceptionRecord::default());
        assert_eq!(records[3].state(), None);
    }

    #[test]
    fn professional_id_rejects_path_tricks() {
        assert_eq!(
            ProfessionalId::parse(" 42 "),
            Some(ProfessionalId("42".to_string()))
        );
        assert!(ProfessionalId::parse("").is_none());
        assert!(ProfessionalId::parse("../admin").is_none());
        assert!(ProfessionalId::parse("4 2").is_none());
    }

    #[test]
    fn date_set_serializes_as_iso_list() {
        let set: AvailableDateSet = [
            NaiveDate::from_ymd_opt(2025, 5, 28).expect("valid"),
            NaiveDate::from_ymd_opt(2025, 5, 27).expect("valid"),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&set).expect("serializes");
        assert_eq!(json, serde_json::json!(["2025-05-27", "2025-05-28"]));
    }
}
