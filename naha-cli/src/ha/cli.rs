use clap::{Arg, Command, arg};

use crate::input::fasta_input_args;

pub const HA_CMD: &str = "ha";

pub fn create_ha_cli() -> Command {
    Command::new(HA_CMD)
        .about("Count N-X-[S/T] glycosylation motifs in every isolate of an aligned HA FASTA file.")
        .args(fasta_input_args())
        .arg(
            Arg::new("overlap-policy")
                .long("overlap-policy")
                .value_parser(["overlapping", "non-overlapping"])
                .default_value("overlapping")
                .help("Whether motifs sharing residues are all counted"),
        )
        .arg(
            arg!(--out <OUT>)
                .required(true)
                .help("Output CSV (EPI, Date, GLS_count); .gz is compressed"),
        )
        .arg(
            arg!(--audit <AUDIT>)
                .required(false)
                .help("Write a JSON audit log of parameters and motif sites per record"),
        )
}
