use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ro_api::{config::load_config, create_app, AppState};
use ro_core::{Clock, OsSecureRandom, OtpService, OtpServiceConfig, SystemClock};
use ro_infra::{create_backends, delivery::create_delivery};
use ro_shared::config::{LogFormat, LoggingConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.logging);

    tracing::info!(
        environment = %config.environment,
        store = %config.store.backend,
        "Starting Ruve OTP server"
    );

    // Refuse to start rather than issue weak codes
    OsSecureRandom::ensure_available().context("Secure random source unavailable")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let backends = create_backends(&config, clock.clone())
        .await
        .context("Failed to initialize OTP store")?;
    let delivery = create_delivery(&config.delivery, config.otp.ttl_minutes())
        .context("Failed to initialize email delivery")?;

    let service = OtpService::new(
        backends.store,
        backends.limiter,
        delivery,
        Arc::new(OsSecureRandom),
        OtpServiceConfig::from_app_config(&config.otp, &config.rate_limit),
    )
    .with_clock(clock);

    let state = web::Data::new(AppState::new(Arc::new(service), &config));
    let bind_address = config.server.bind_address();
    let workers = config.server.workers;

    tracing::info!(address = %bind_address, "Server listening");

    let app_config = config.clone();
    let mut server = HttpServer::new(move || create_app(state.clone(), &app_config));
    if workers > 0 {
        server = server.workers(workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("Server terminated with an error")
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}
