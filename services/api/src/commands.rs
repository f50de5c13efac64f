use crate::infra::parse_date;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use clinica::availability::{AvailabilityService, HttpAvailabilitySource};
use clinica::config::{AppConfig, UpstreamConfig};
use clinica::error::AppError;
use clinica::rif::{self, RifError, TaxId};
use clinica::session::{
    is_authenticated, AuthSession, AuthSessionStore, JsonFileSessionStore, UserProfile,
};
use clinica::telemetry;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct FechasArgs {
    /// Professional identifier as known by the scheduling backend
    #[arg(long)]
    pub(crate) profesional: String,
    /// Only list dates on or after this day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) desde: Option<NaiveDate>,
    /// Override the configured upstream base URL
    #[arg(long)]
    pub(crate) upstream: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum SessionCommand {
    /// Store a token and profile for subsequent upstream calls
    Set {
        #[arg(long)]
        token: String,
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        correo: Option<String>,
        #[arg(long)]
        rol: Option<String>,
    },
    /// Show the stored session (token redacted)
    Show,
    /// Forget the stored session
    Clear,
}

pub(crate) fn run_rif_check(raw: &str) -> Result<(), AppError> {
    match TaxId::parse(raw) {
        Ok(tax_id) => {
            println!("{} is valid ({})", tax_id, tax_id.kind().label());
            Ok(())
        }
        Err(RifError::CheckDigitMismatch { expected, .. }) => {
            println!("{} is invalid", rif::format(raw));
            println!("- check digit should be {expected}");
            Err(AppError::InvalidInput(format!("RIF '{raw}' failed checksum")))
        }
        Err(err) => Err(AppError::InvalidInput(err.to_string())),
    }
}

pub(crate) fn run_rif_complete(body: &str) -> Result<(), AppError> {
    let full = rif::complete(body).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "'{body}' must be a letter (V, E, J, P, G) followed by 8 digits"
        ))
    })?;
    println!("{}", rif::format(&full));
    Ok(())
}

pub(crate) async fn run_fechas(args: FechasArgs) -> Result<(), AppError> {
    let FechasArgs {
        profesional,
        desde,
        upstream,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(base_url) = upstream {
        config.upstream = UpstreamConfig::new(base_url, config.upstream.timeout)?;
    }
    telemetry::init(&config.telemetry, config.environment)?;

    let store: Arc<dyn AuthSessionStore> =
        Arc::new(JsonFileSessionStore::new(config.session.file.clone()));
    if !is_authenticated(store.as_ref()) {
        println!("No stored session; querying upstream anonymously");
    }

    let source = HttpAvailabilitySource::new(&config.upstream)?.with_session(store);
    let service = AvailabilityService::new(Arc::new(source));
    let dates = service.available_dates_for(&profesional).await?;
    let dates = match desde {
        Some(from) => dates.starting_from(from),
        None => dates,
    };

    println!(
        "Available dates for professional {} ({})",
        profesional.trim(),
        dates.len()
    );
    if dates.is_empty() {
        println!("- none");
    }
    for date in dates.iter() {
        println!("- {}", date.format("%Y-%m-%d (%a)"));
    }

    Ok(())
}

pub(crate) fn run_session(command: SessionCommand) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = JsonFileSessionStore::new(config.session.file.clone());
    apply_session_command(&store, command)
}

fn apply_session_command(
    store: &dyn AuthSessionStore,
    command: SessionCommand,
) -> Result<(), AppError> {
    match command {
        SessionCommand::Set {
            token,
            user_id,
            nombre,
            correo,
            rol,
        } => {
            if token.trim().is_empty() {
                return Err(AppError::InvalidInput("token must not be blank".to_string()));
            }
            store.set(AuthSession {
                token,
                user: UserProfile {
                    id: user_id,
                    nombre,
                    correo,
                    rol,
                },
            })?;
            println!("Session stored");
        }
        SessionCommand::Show => match store.get()? {
            Some(session) => {
                println!("Signed in as {} (id {})", session.user.nombre, session.user.id);
                if let Some(rol) = &session.user.rol {
                    println!("- role: {rol}");
                }
                println!("- token: {}", redact(&session.token));
            }
            None => println!("No stored session"),
        },
        SessionCommand::Clear => {
            store.clear()?;
            println!("Session cleared");
        }
    }
    Ok(())
}

/// Shows a four character prefix, and nothing at all for tokens that short.
fn redact(token: &str) -> String {
    const VISIBLE: usize = 4;
    if token.chars().count() <= VISIBLE {
        return "****".to_string();
    }
    let visible: String = token.chars().take(VISIBLE).collect();
    format!("{visible}…")
}
