//! modpin - check the git references pinned in a Puppetfile.

use clap::Parser;
use modpin::cli::Cli;
use modpin::constants::EXIT_INTERRUPTED;
use modpin::core::user_friendly_error;
use tracing_subscriber::EnvFilter;

fn init_tracing(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    if cli.no_color {
        colored::control::set_override(false);
    }
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // The run future is dropped before exiting so that in-flight git
    // processes are killed and scratch directories removed.
    let outcome = tokio::select! {
        result = cli.execute() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let code = match outcome {
        Some(Ok(code)) => code,
        Some(Err(e)) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            error_ctx.exit_code()
        }
        None => {
            eprintln!("Interrupted");
            EXIT_INTERRUPTED
        }
    };

    std::process::exit(code);
}
