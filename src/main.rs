use std::net::SocketAddr;
use std::sync::Arc;

use chatgate::adapters::EnvSettings;
use chatgate::cli::{handle_version_command, parse_args, CliCommand, VERSION};
use chatgate::gateway::{resolve_backend, serve};
use chatgate::traits::SettingsProvider;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "chatgate=info,tower_http=info";

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let bind = match parse_args(std::env::args()) {
        CliCommand::Version => handle_version_command(),
        CliCommand::Serve { bind } => bind,
    };

    color_eyre::install()?;
    init_tracing();

    let env = EnvSettings::new();
    let bind = bind.unwrap_or_else(|| env.bind_addr());
    let addr: SocketAddr = bind
        .parse()
        .wrap_err_with(|| format!("invalid listen address {:?}", bind))?;

    let settings = env.settings();
    tracing::info!(version = VERSION, hardened = settings.hardened, "chatgate starting");
    if let Err(e) = resolve_backend(&settings) {
        // Requests will get a generic 500 until the environment is fixed.
        tracing::warn!(kind = e.kind(), "backend is not usable with current settings");
    }
    if settings.credential().is_none() {
        tracing::warn!("no API key configured; requests will be forwarded without one");
    }

    let provider: Arc<dyn SettingsProvider> = Arc::new(env);
    serve(addr, provider).await?;
    Ok(())
}
