use clap::{Arg, Command, arg};

pub const MERGE_CMD: &str = "merge";

pub fn create_merge_cli() -> Command {
    Command::new(MERGE_CMD)
        .about("Join NA stalk lengths and HA motif counts on the isolate identifier.")
        .arg(
            arg!(--na <NA>)
                .required(true)
                .help("NA table written by `naha na` (EPI, Stalk_length; Date optional)"),
        )
        .arg(
            arg!(--ha <HA>)
                .required(true)
                .help("HA table written by `naha ha` (EPI, GLS_count; Date optional)"),
        )
        .arg(
            arg!(--out <OUT>)
                .required(true)
                .help("Output CSV (EPI, Date, Stalk_length, GLS_count)"),
        )
        .arg(
            arg!(--counts <COUNTS>)
                .required(false)
                .help("Also write the (stalk length, motif count) frequency table here"),
        )
        .arg(
            Arg::new("na-group")
                .long("na-group")
                .default_value("N1")
                .help("NA subtype or group label written in the frequency table"),
        )
        .arg(
            Arg::new("join")
                .long("join")
                .value_parser(["inner", "outer"])
                .default_value("inner")
                .help("Keep only isolates present in both tables, or all of them"),
        )
        .arg(
            arg!(--audit <AUDIT>)
                .required(false)
                .help("Write a JSON audit log including the identifiers that were not matched"),
        )
}
