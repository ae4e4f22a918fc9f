//! irmplircd: broadcast IRMP receiver events as LIRC lines
//!
//! Run with: irmplircd -t /etc/irmplircd.map [-d socket] [-r ms] DEVICE...

use std::convert::Infallible;
use std::os::unix::net::UnixListener as StdUnixListener;
use std::path::PathBuf;

use clap::Parser;

use irmp_lircd::cli;
use irmp_lircd::error::{Error, Result};
use irmp_lircd::input::{DeviceSource, RepeatDetector};
use irmp_lircd::registry::{bind_socket, BroadcastRegistry};
use irmp_lircd::server::{DistributorConfig, EventDistributor, DEFAULT_SOCKET_PATH, DEFAULT_USER};
use irmp_lircd::system;
use irmp_lircd::table::TranslationTable;

#[derive(Parser, Debug)]
#[command(name = "irmplircd", version)]
#[command(about = "Zeroconf LIRC daemon that reads IRMP events from a USB IR receiver")]
struct Args {
    /// UNIX socket to listen on
    #[arg(short = 'd', long = "socket", value_name = "SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Run in the foreground
    #[arg(short, long)]
    foreground: bool,

    /// Grab the input device(s)
    #[arg(short, long)]
    grab: bool,

    /// Repeat rate in ms (0 disables repeat detection)
    #[arg(short, long = "repeat", value_name = "MS", default_value_t = 0)]
    repeat: u64,

    /// User to run as
    #[arg(short, long, default_value = DEFAULT_USER)]
    user: String,

    /// Path to translation table
    #[arg(short, long = "translation", value_name = "PATH")]
    translation: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Input devices, e.g. /dev/hidraw0
    #[arg(required = true, value_name = "DEVICE")]
    devices: Vec<PathBuf>,
}

impl From<Args> for DistributorConfig {
    fn from(args: Args) -> Self {
        let mut config = DistributorConfig::default()
            .socket_path(args.socket)
            .repeat_window_ms(args.repeat)
            .grab(args.grab)
            .user(args.user)
            .foreground(args.foreground);

        if let Some(path) = args.translation {
            config = config.translation_path(path);
        }
        config.devices = args.devices;
        config
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

fn run(config: DistributorConfig) -> Result<()> {
    let sources = DeviceSource::open_all(&config.devices, config.grab)?;

    let table_path = config.translation_path.as_ref().ok_or(Error::NoTable)?;
    let table = TranslationTable::load(table_path)?;

    let listener = bind_socket(&config.socket_path)?;

    system::drop_privileges(&config.user)?;
    if !config.foreground {
        system::daemonize()?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(serve(config, table, listener, sources));
    runtime.shutdown_background();

    match result? {}
}

async fn serve(
    config: DistributorConfig,
    table: TranslationTable,
    listener: StdUnixListener,
    sources: Vec<DeviceSource>,
) -> Result<Infallible> {
    let registry = BroadcastRegistry::from_std(listener)?;
    let devices = sources
        .into_iter()
        .map(DeviceSource::into_reader)
        .collect::<Result<Vec<_>>>()?;
    let detector = RepeatDetector::new(config.repeat_window);

    tracing::info!(
        socket = %config.socket_path.display(),
        entries = table.len(),
        "Listening"
    );

    EventDistributor::new(registry, table, detector)
        .run(devices)
        .await
}
