mod audit;
mod ha;
mod input;
mod logging;
mod merge;
mod na;

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "naha";
    pub const BIN_NAME: &str = "naha";
    pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}

pub(crate) fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("NA stalk length and HA glycosylation motif analysis of aligned avian influenza sequences.")
        .subcommand_required(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .value_parser(consts::LOG_LEVELS)
                .default_value(consts::DEFAULT_LOG_LEVEL)
                .help("Logging verbosity; RUST_LOG takes precedence when set"),
        )
        .subcommand(na::cli::create_na_cli())
        .subcommand(ha::cli::create_ha_cli())
        .subcommand(merge::cli::create_merge_cli())
}

pub(crate) fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        //
        // NA STALK LENGTHS
        //
        Some((na::cli::NA_CMD, matches)) => {
            na::handlers::run_na(matches)?;
        }

        //
        // HA GLYCOSYLATION MOTIFS
        //
        Some((ha::cli::HA_CMD, matches)) => {
            ha::handlers::run_ha(matches)?;
        }

        //
        // MERGE
        //
        Some((merge::cli::MERGE_CMD, matches)) => {
            merge::handlers::run_merge(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or(consts::DEFAULT_LOG_LEVEL);
    logging::init_logging(level)?;

    run(&matches)
}
