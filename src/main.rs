//! `regtidy` command-line entry point.
use anyhow::Result;
use clap::Parser;

use regtidy::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let name = args.command.name();
    logging::init_subscriber(args.verbose, name);
    let log = logging::Logger::new(name);

    match &args.command {
        cli::Command::Menu(cmd) => commands::menu::run(&args.global, cmd, &log),
        cli::Command::Startup(cmd) => commands::startup::run(&args.global, cmd, &log),
        cli::Command::Version => commands::version::run(),
    }
}
