//! # Kirana Terminal Library
//!
//! Console front end for the Kirana POS: the cashier types commands, the
//! terminal keeps the session and hands checkout to the order service.
//!
//! ## Module Organization
//! ```text
//! kirana_terminal/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── repl.rs         ◄─── Command parsing, dispatch, rendering
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── session.rs  ◄─── Cart + customer/warehouse session
//! │   ├── checkout.rs ◄─── Checkout orchestrator handle
//! │   └── config.rs   ◄─── Display configuration
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── product.rs  ◄─── Barcode / SKU lookup
//! │   ├── cart.rs     ◄─── Cart manipulation commands
//! │   └── checkout.rs ◄─── Selection, toggles, checkout
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod repl;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use kirana_client::{ClientConfig, HttpOrderService};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use error::ApiError;
use repl::App;
use state::{CheckoutState, ConfigState, SessionState};

/// Kirana POS console terminal.
#[derive(Debug, Parser)]
#[command(name = "kirana-pos", version, about)]
pub struct Cli {
    /// Path to client.toml (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Order service base URL, overrides config and KIRANA_API_URL
    #[arg(long)]
    pub api_url: Option<String>,
}

/// Runs the terminal until `quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Terminal Startup                                  │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info,kirana=debug, override with RUST_LOG                │
/// │                                                                         │
/// │  2. Load ClientConfig ────────────────────────────────────────────────► │
/// │     • explicit --config must load; otherwise fall back to defaults      │
/// │     • --api-url wins over file and environment                          │
/// │                                                                         │
/// │  3. Initialize State Objects ─────────────────────────────────────────► │
/// │     • SessionState: empty cart, default warehouse, checkout flags       │
/// │     • CheckoutState: orchestrator over the HTTP order service           │
/// │     • ConfigState: store name and currency display                      │
/// │                                                                         │
/// │  4. Read commands from stdin ─────────────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> Result<(), ApiError> {
    init_tracing();
    info!("Starting Kirana POS terminal");

    let mut config = match cli.config {
        Some(path) => ClientConfig::load(Some(path))?,
        None => ClientConfig::load_or_default(None),
    };
    if let Some(url) = cli.api_url {
        config.service.base_url = url;
        config.validate()?;
    }

    let app = build_app(&config)?;
    let mut stdout = tokio::io::stdout();
    if !app.config.json_output {
        println!("{}: type 'help' for commands", app.config.store_name);
    }

    app.run_loop(BufReader::new(tokio::io::stdin()), &mut stdout)
        .await
        .map_err(|e| ApiError::internal(format!("Terminal I/O failed: {}", e)))?;

    info!("Terminal closed");
    Ok(())
}

/// Creates the state objects the command loop runs on.
pub fn build_app(config: &ClientConfig) -> Result<App<HttpOrderService>, ApiError> {
    let service = HttpOrderService::new(config)?;
    info!(base_url = %service.base_url(), "Order service configured");

    let session = SessionState::new(config.checkout.default_warehouse_id.clone(), config.flags());
    let checkout = CheckoutState::new(Arc::new(service), config.checkout.notes.clone());
    let display_config = ConfigState::from_env();
    info!(store = %display_config.store_name, "State initialized");

    Ok(App::new(session, checkout, display_config))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kirana=trace` - Show trace for kirana crates only
/// - Default: info, debug for kirana crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kirana=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::parse_from(["kirana-pos", "--config", "/tmp/client.toml", "--api-url", "http://pos.local/api"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/client.toml")));
        assert_eq!(cli.api_url.as_deref(), Some("http://pos.local/api"));
    }

    #[test]
    fn test_build_app_wires_config_into_state() {
        let mut config = ClientConfig::default();
        config.checkout.default_warehouse_id = Some("w-9".to_string());
        config.checkout.auto_fulfill = false;
        config.checkout.notes = "Counter 2".to_string();

        let app = build_app(&config).unwrap();

        app.session.with_session(|s| {
            assert_eq!(s.warehouse_id.as_deref(), Some("w-9"));
            assert!(!s.flags.auto_fulfill);
            assert!(s.cart.is_empty());
        });
        assert_eq!(app.checkout.notes(), "Counter 2");
        assert_eq!(app.checkout.service().base_url(), "http://localhost:8000/api");
        assert_eq!(app.config.currency_code, "INR");
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["kirana-pos"]);
        assert!(cli.config.is_none());
        assert!(cli.api_url.is_none());
    }
}
