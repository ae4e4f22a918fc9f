//! Shared command line plumbing for the two daemons

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::error::EX_USAGE;

/// Parse arguments, exiting with `EX_USAGE` on a usage error
///
/// `--help` and `--version` still exit successfully.
pub fn parse_args<A: Parser>() -> A {
    match A::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(EX_USAGE);
            }
        },
    }
}

/// Initialize logging to stderr
///
/// `RUST_LOG` wins when set; otherwise the crate logs at info, or debug
/// with `debug`.
pub fn init_tracing(debug: bool) {
    let default = if debug {
        "irmp_lircd=debug"
    } else {
        "irmp_lircd=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
