use clap::{Arg, ArgAction, Command, arg};

use crate::input::fasta_input_args;

pub const NA_CMD: &str = "na";

pub fn create_na_cli() -> Command {
    Command::new(NA_CMD)
        .about("Measure the NA stalk length of every isolate in an aligned FASTA file.")
        .args(fasta_input_args())
        .arg(
            Arg::new("begin-pattern")
                .long("begin-pattern")
                .help("Gap-aware pattern ending right before the stalk, e.g. 'G-?N-?I-?I-?S'"),
        )
        .arg(
            Arg::new("end-pattern")
                .long("end-pattern")
                .help("Gap-aware pattern starting right after the stalk"),
        )
        .arg(
            arg!(--config <CONFIG>)
                .required(false)
                .help("TOML file with stalk parameters; flags given here take precedence"),
        )
        .arg(
            Arg::new("start-offset")
                .long("start-offset")
                .value_parser(clap::value_parser!(isize))
                .allow_negative_numbers(true)
                .help("Shift the start of the stalk span by this many alignment columns"),
        )
        .arg(
            Arg::new("end-offset")
                .long("end-offset")
                .value_parser(clap::value_parser!(isize))
                .allow_negative_numbers(true)
                .help("Shift the end of the stalk span by this many alignment columns"),
        )
        .arg(
            Arg::new("drop-first-residue")
                .long("drop-first-residue")
                .action(ArgAction::SetTrue)
                .help("Do not count the first residue of the stalk"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_parser(["per-record", "reference"])
                .help("Locate the boundaries in every record or once in a reference [default: per-record]"),
        )
        .arg(
            arg!(--reference <REFERENCE>)
                .required(false)
                .help("FASTA whose first record is the reference (reference mode; default: first input record)"),
        )
        .arg(
            Arg::new("drop-reference")
                .long("drop-reference")
                .action(ArgAction::SetTrue)
                .help("Leave the first input record out of the table when it served as the reference"),
        )
        .arg(
            arg!(--out <OUT>)
                .required(true)
                .help("Output CSV (EPI, Date, Stalk_length); .gz is compressed"),
        )
        .arg(
            arg!(--audit <AUDIT>)
                .required(false)
                .help("Write a JSON audit log of parameters and per-record outcomes"),
        )
}
