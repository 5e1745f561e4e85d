//! # Kirana POS Terminal Entry Point
//!
//! ## Startup Sequence
//! 1. Parse command-line arguments
//! 2. Initialize tracing (logging)
//! 3. Load client configuration
//! 4. Create state objects (SessionState, CheckoutState, ConfigState)
//! 5. Read cashier commands until `quit`

use clap::Parser;
use kirana_terminal::Cli;

#[tokio::main]
async fn main() {
    // The actual setup is in lib.rs for better testability
    let cli = Cli::parse();
    if let Err(e) = kirana_terminal::run(cli).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
