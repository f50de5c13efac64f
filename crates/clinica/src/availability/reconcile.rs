use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use super::domain::{
    AvailabilityException, AvailableDateSet, BaseDateRecord, ExceptionRecord, ExceptionState,
};

/// Reduces a `fecha` value to its calendar date.
///
/// Date-times keep the date as written in their own offset, so
/// `2025-05-27T23:30:00-04:00` is the 27th regardless of where this runs.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|dt| dt.date())
}

fn record_date(fecha: Option<&str>) -> Option<NaiveDate> {
    let Some(raw) = fecha else {
        debug!("skipping availability record without fecha");
        return None;
    };

    let date = parse_calendar_date(raw);
    if date.is_none() {
        debug!(fecha = raw, "skipping unparseable availability date");
    }
    date
}

/// Typed exceptions from wire records; unknown states and bad dates are dropped.
pub fn exceptions_from_records(records: &[ExceptionRecord]) -> Vec<AvailabilityException> {
    records
        .iter()
        .filter_map(|record| {
            let state = record.state()?;
            let date = record_date(record.fecha.as_deref())?;
            Some(AvailabilityException { date, state })
        })
        .collect()
}

/// `(base - cancelled) ∪ manual`. A manual entry survives a cancellation of the same day
/// because cancellations only ever filter the recurring schedule.
pub fn reconcile_dates<B, E>(base: B, exceptions: E) -> AvailableDateSet
where
    B: IntoIterator<Item = NaiveDate>,
    E: IntoIterator<Item = AvailabilityException>,
{
    let mut cancelled = HashSet::new();
    let mut manual = Vec::new();
    for exception in exceptions {
        match exception.state {
            ExceptionState::Cancelled => {
                cancelled.insert(exception.date);
            }
            ExceptionState::Manual => manual.push(exception.date),
        }
    }

    base.into_iter()
        .filter(|date| !cancelled.contains(date))
        .chain(manual)
        .collect()
}

/// Reconciles raw backend payloads.
pub fn reconcile(base: &[BaseDateRecord], exceptions: &[ExceptionRecord]) -> AvailableDateSet {
    let base_dates = base
        .iter()
        .filter_map(|record| record_date(record.fecha.as_deref()));
    reconcile_dates(base_dates, exceptions_from_records(exceptions))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parses_supported_shapes() {
        assert_eq!(parse_calendar_date("2025-05-27"), Some(ymd(2025, 5, 27)));
        assert_eq!(
            parse_calendar_date("2025-05-27T08:00:00Z"),
            Some(ymd(2025, 5, 27))
        );
        assert_eq!(
            parse_calendar_date("2025-05-27T23:30:00-04:00"),
            Some(ymd(2025, 5, 27))
        );
        assert_eq!(
            parse_calendar_date("2025-05-27T08:00:00.000"),
            Some(ymd(2025, 5, 27))
        );
        assert_eq!(
            parse_calendar_date(" 2025-05-27 08:00:00 "),
            Some(ymd(2025, 5, 27))
        );
        assert_eq!(parse_calendar_date("2025-05-27T08:00"), Some(ymd(2025, 5, 27)));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("mañana"), None);
        assert_eq!(parse_calendar_date("2025-02-30"), None);
        assert_eq!(parse_calendar_date("27/05/2025"), None);
    }

    #[test]
    fn exceptions_skip_unknown_states() {
        let records = vec![
            ExceptionRecord {
                fecha: Some("2025-05-27".to_string()),
                estado: Some("bloqueado".to_string()),
            },
            ExceptionRecord {
                fecha: Some("no es fecha".to_string()),
                estado: Some("manual".to_string()),
            },
            ExceptionRecord {
                fecha: Some("2025-05-28".to_string()),
                estado: Some("cancelado".to_string()),
            },
        ];

        assert_eq!(
            exceptions_from_records(&records),
            vec![AvailabilityException {
                date: ymd(2025, 5, 28),
                state: ExceptionState::Cancelled,
            }]
        );
    }

    #[test]
    fn typed_reconciliation_applies_override() {
        let result = reconcile_dates(
            [ymd(2025, 6, 2), ymd(2025, 6, 9)],
            [
                AvailabilityException {
                    date: ymd(2025, 6, 9),
                    state: ExceptionState::Cancelled,
                },
                AvailabilityException {
                    date: ymd(2025, 6, 9),
                    state: ExceptionState::Manual,
                },
            ],
        );
        assert_eq!(result.into_vec(), vec![ymd(2025, 6, 2), ymd(2025, 6, 9)]);
    }
}
