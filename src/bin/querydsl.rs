//! querydsl CLI binary.

use std::io::Write;
use std::process;

use anyhow::Context;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use querydsl::cli::args::QueryDslArgs;
use querydsl::cli::commands::execute_command;

fn main() {
    let args = QueryDslArgs::parse();

    let log_level = match args.verbosity() {
        0 => LevelFilter::Error, // Quiet mode
        1 => LevelFilter::Warn,  // Default
        2 => LevelFilter::Info,  // Verbose
        _ => LevelFilter::Debug, // Very verbose (3+)
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let command = args.command.name();
    if let Err(e) = execute_command(args).with_context(|| format!("querydsl {command} failed")) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
