mod args;
mod cmd;
mod logging;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::args::{Variant, load_config};
use crate::cmd::Command;
use crate::logging::{LogLevel, init_logging};

#[derive(Parser, Debug)]
#[command(name = "linkframe", version, about = "Build, check and escape link frames")]
struct Cli {
    /// Wire variant.
    #[arg(long, value_enum, default_value_t = Variant::Unit, global = true)]
    variant: Variant,

    /// JSON frame configuration; overrides --variant.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let config = load_config(cli.config.as_deref(), cli.variant)?;
    let ok = cmd::run(cli.command, config, cli.json)?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
