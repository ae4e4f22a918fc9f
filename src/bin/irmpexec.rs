//! irmpexec: run commands for IRMP key presses received from irmplircd
//!
//! Run with: irmpexec [-w] [-d socket] [-t /etc/irmpexec.map]

use std::convert::Infallible;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use clap::Parser;

use irmp_lircd::cli;
use irmp_lircd::client::{
    ActionDispatcher, DispatchMode, ExecConfig, ResilientSubscriber, ShellRunner,
    DEFAULT_EXEC_TABLE,
};
use irmp_lircd::error::{Error, Result};
use irmp_lircd::input::RepeatDetector;
use irmp_lircd::server::{DEFAULT_SOCKET_PATH, DEFAULT_USER};
use irmp_lircd::system;
use irmp_lircd::table::TranslationTable;

#[derive(Parser, Debug)]
#[command(name = "irmpexec", version)]
#[command(about = "LIRC client that executes commands for IRMP key presses")]
struct Args {
    /// UNIX socket to connect to
    #[arg(short = 'd', long = "socket", value_name = "SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Run in the foreground
    #[arg(short, long)]
    foreground: bool,

    /// User to run as
    #[arg(short, long, default_value = DEFAULT_USER)]
    user: String,

    /// Path to translation table
    #[arg(short, long = "translation", value_name = "PATH", default_value = DEFAULT_EXEC_TABLE)]
    translation: PathBuf,

    /// irw like mode: print received lines instead of running commands
    #[arg(short = 'w', long = "print")]
    print: bool,

    /// Ignore presses closer together than this many ms (0 disables)
    #[arg(short, long = "repeat", value_name = "MS", default_value_t = 0)]
    repeat: u64,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl From<Args> for ExecConfig {
    fn from(args: Args) -> Self {
        ExecConfig::default()
            .socket_path(args.socket)
            .user(args.user)
            .translation_path(args.translation)
            .foreground(args.foreground)
            .print_mode(args.print)
            .repeat_window_ms(args.repeat)
    }
}

fn main() {
    let args: Args = cli::parse_args();
    cli::init_tracing(args.debug);

    if let Err(e) = run(args.into()) {
        tracing::error!(error = %e, "Exiting");
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(config: ExecConfig) -> Result<()> {
    let table = TranslationTable::load(&config.translation_path)?;

    let stream = UnixStream::connect(&config.socket_path).map_err(|source| Error::Connect {
        path: config.socket_path.clone(),
        source,
    })?;

    system::drop_privileges(&config.user)?;
    if !config.foreground {
        system::daemonize()?;
    }

    let mode = if config.print_mode {
        DispatchMode::Print
    } else {
        DispatchMode::Execute
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(serve(config, table, stream, mode));
    runtime.shutdown_background();

    match result? {}
}

async fn serve(
    config: ExecConfig,
    table: TranslationTable,
    stream: UnixStream,
    mode: DispatchMode,
) -> Result<Infallible> {
    let subscriber =
        ResilientSubscriber::from_std(&config.socket_path, stream, config.reconnect_delay)?;
    let detector = RepeatDetector::new(config.repeat_window);

    ActionDispatcher::new(table, ShellRunner, mode, detector)
        .run(subscriber)
        .await
}
