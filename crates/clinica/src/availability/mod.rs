//! Bookable dates for a professional: the recurring schedule minus cancellations, plus
//! manually opened days.

pub mod domain;
pub mod reconcile;
pub mod router;
pub mod service;
pub mod source;

pub use domain::{
    AvailabilityException, AvailableDateSet, BaseDateRecord, ExceptionRecord, ExceptionState,
    ProfessionalId,
};
pub use reconcile::{exceptions_from_records, parse_calendar_date, reconcile, reconcile_dates};
pub use router::{availability_router, AvailableDatesView};
pub use service::{AvailabilityError, AvailabilityService};
pub use source::{AvailabilitySource, HttpAvailabilitySource, SourceError, UpstreamResource};
