//! key-mon - Keyboard and mouse status monitor
//!
//! Listens to raw input device events and keeps an indicator of the keys and
//! buttons currently held, for screencasts and demos.

use anyhow::Result;
use clap::{Parser, Subcommand};
use key_mon::cli::{ConfigArgs, KbdArgs, LookupArgs, ReplayArgs, RunArgs};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keyboard Status Monitor - shows which keys and mouse buttons are held
#[derive(Parser, Debug)]
#[command(
    name = "key-mon",
    author,
    version,
    about,
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    loglevel: Option<String>,

    /// Output debugging information. Shorthand for --loglevel=debug
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Options for running the monitor when no subcommand is given
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the monitor on live input devices (default)
    Run(RunArgs),
    /// Feed a recorded event log through the monitor
    Replay(ReplayArgs),
    /// Resolve a scan code through the modmap
    Lookup(LookupArgs),
    /// Inspect and install modmap files
    Kbd(KbdArgs),
    /// Show or change the configuration
    Config(ConfigArgs),
}

/// Installs the tracing subscriber. `RUST_LOG` takes precedence over the flags.
fn init_logging(loglevel: Option<&str>, debug: bool) -> Result<()> {
    let level = match loglevel {
        Some(level) => level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow::anyhow!("Invalid log level: {level}"))?,
        None if debug => LevelFilter::DEBUG,
        None => LevelFilter::WARN,
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.loglevel.as_deref(), cli.debug)?;

    match cli.command {
        None => cli.run.execute(),
        Some(Command::Run(args)) => args.execute(),
        Some(Command::Replay(args)) => args.execute(),
        Some(Command::Lookup(args)) => args.execute(),
        Some(Command::Kbd(args)) => args.execute(),
        Some(Command::Config(args)) => args.execute(),
    }
}
