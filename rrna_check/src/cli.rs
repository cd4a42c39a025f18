use std::{num::NonZeroUsize, path::PathBuf};

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    Command,
};

use utils::{add_log_args, init_log};

use crate::config::Config;

/// Set up definition of command options for clap
fn cli_model() -> Command {
    add_log_args(
        Command::new(crate_name!())
            .about(crate_description!())
            .version(crate_version!())
            .author(crate_authors!()),
    )
    .arg(
        Arg::new("threads")
            .short('t')
            .long("threads")
            .value_parser(value_parser!(NonZeroUsize))
            .value_name("INT")
            .help("Set number of read files processed in parallel [default: available cores]"),
    )
    .arg(
        Arg::new("kmer")
            .short('k')
            .long("kmer")
            .value_parser(value_parser!(NonZeroUsize))
            .value_name("INT")
            .default_value("21")
            .help("Set k-mer size"),
    )
    .arg(
        Arg::new("cutoff")
            .short('c')
            .long("cutoff")
            .value_parser(value_parser!(usize))
            .value_name("INT")
            .default_value("3")
            .help("Count reads with more than this number of distinct rRNA k-mers"),
    )
    .arg(
        Arg::new("force")
            .short('f')
            .long("force")
            .action(ArgAction::SetTrue)
            .help("Recalculate hits even if the summary file already exists"),
    )
    .arg(
        Arg::new("fastq")
            .long("fastq")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .value_delimiter(',')
            .action(ArgAction::Append)
            .required(true)
            .help("Input FASTQ file(s), comma separated; may be compressed"),
    )
    .arg(
        Arg::new("rrna")
            .long("rrna")
            .visible_alias("rRNA")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .required(true)
            .help("FASTA file with rRNA sequences"),
    )
    .arg(
        Arg::new("out")
            .short('o')
            .long("out")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .required(true)
            .help("Set output directory"),
    )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m);

    debug!("Processing command line options");

    let nt = m
        .get_one::<NonZeroUsize>("threads")
        .map(|x| usize::from(*x))
        .unwrap_or_else(num_cpus::get);

    let read_files: Vec<PathBuf> = m
        .get_many::<PathBuf>("fastq")
        .expect("Missing FASTQ files")
        .cloned()
        .collect();

    let rrna = m
        .get_one::<PathBuf>("rrna")
        .expect("Missing rRNA file")
        .clone();

    let output_dir = m
        .get_one::<PathBuf>("out")
        .expect("Missing output directory")
        .clone();

    debug!("Number of read files: {}", read_files.len());

    let mut cfg = Config::new(read_files, rrna, output_dir);

    if let Some(k) = m.get_one::<NonZeroUsize>("kmer") {
        cfg.set_kmer(usize::from(*k))
    }
    if let Some(x) = m.get_one::<usize>("cutoff") {
        cfg.set_cutoff(*x)
    }
    if m.get_flag("force") {
        cfg.set_force()
    }
    cfg.set_threads(nt);

    Ok(cfg)
}
