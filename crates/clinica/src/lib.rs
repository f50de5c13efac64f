pub mod availability;
pub mod config;
pub mod convenios;
pub mod error;
pub mod rif;
pub mod session;
pub mod telemetry;
