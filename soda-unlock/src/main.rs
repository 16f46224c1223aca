mod commands;
mod logger;
mod utils;

use clap::{ColorChoice, Parser};
use colored::Colorize;
use commands::{Args, Commands};
use std::{
    io::{IsTerminal, stderr},
    process,
};

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    colored::control::set_override(match args.color {
        ColorChoice::Always => true,
        ColorChoice::Auto => stderr().is_terminal(),
        ColorChoice::Never => false,
    });

    logger::init(args.level_filter())?;

    match args.command {
        Commands::Decrypt(args) => args.execute()?,
        Commands::Inspect(args) => args.execute()?,
        Commands::Key(args) => args.execute()?,
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".bold().red(), e);
        process::exit(1);
    }
}
