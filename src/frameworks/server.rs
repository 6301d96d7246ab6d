// Framework bootstrap for the kiosk runtime.

use crate::frameworks::config::{self, KioskConfig};
use crate::interface_adapters::clients::ErpClient;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{KioskSettings, spawn_kiosk};

use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener, config: KioskConfig) -> Result<()> {
    let address = listener.local_addr()?;
    // build state
    let state = build_state(config)?;
    let app = app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let config = KioskConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        std::io::Error::other(e)
    })?;

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, config).await
}

fn build_state(config: KioskConfig) -> Result<Arc<AppState>> {
    let erp_client = ErpClient::new(config.erp_base_url.clone(), config.rpc_timeout)
        .map_err(|e| std::io::Error::other(format!("failed to initialize erp client: {e}")))?;
    tracing::debug!(
        erp_base_url = %config.erp_base_url,
        rpc_timeout_ms = config.rpc_timeout.as_millis(),
        "erp client configured"
    );

    // The kiosk task owns the controller; handlers only hold its channels.
    let kiosk = spawn_kiosk(
        KioskSettings {
            input_channel_capacity: config::INPUT_CHANNEL_CAPACITY,
            completion_channel_capacity: config::COMPLETION_CHANNEL_CAPACITY,
            default_mode: config.default_mode,
            terminal_session_id: config.terminal_session_id,
            timings: config.timings,
            exit_pin: config.exit_pin,
        },
        Arc::new(erp_client),
    );

    Ok(Arc::new(AppState::from(kiosk)))
}
