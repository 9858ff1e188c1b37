//! Chrome Native Messaging Host for maxtab
//!
//! The extension forwards window and tab lifecycle events over stdin and
//! executes the tab/window commands this process sends back on stdout.
//! Logs go to stderr; stdout carries the protocol.

use maxtab_lib::constants::LOG_ENV_VAR;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    init_logging();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(maxtab_lib::run()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
