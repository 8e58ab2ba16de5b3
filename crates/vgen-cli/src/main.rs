use vgen_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging as early as possible; fall back to stderr when the
    // state directory is unusable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    // Parse CLI and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("vgen error: {:#}", err);
        std::process::exit(1);
    }
}
