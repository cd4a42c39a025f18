use std::{num::NonZeroUsize, path::PathBuf};

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    ArgGroup, ArgMatches, Command,
};

use anyhow::Context;

use utils::{add_log_args, init_log};

use crate::{config::*, sample::*};

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
            .default_value("1")
            .help("Set number of samples processed in parallel"),
    )
    .arg(
        Arg::new("chunks")
            .short('n')
            .long("chunks")
            .value_parser(value_parser!(usize))
            .value_name("INT")
            .default_value("100")
            .help("Set number of chunks each transcript is split into (minimum 10)"),
    )
    .arg(
        Arg::new("minexpcut")
            .short('m')
            .long("minexpcut")
            .value_parser(value_parser!(f64))
            .value_name("FLOAT")
            .default_value("100")
            .help("Minimum summed chunk coverage for a transcript to be used in the relative profiles"),
    )
    .arg(
        Arg::new("id_tag")
            .long("id-tag")
            .value_parser(value_parser!(String))
            .value_name("STRING")
            .default_value("ID")
            .help("Attribute holding the transcript identifier in mRNA/transcript records"),
    )
    .arg(
        Arg::new("bam_sorted")
            .long("bam-is-sorted")
            .action(ArgAction::SetTrue)
            .requires("bam")
            .help("Input BAM files are already sorted"),
    )
    .arg(
        Arg::new("samtools")
            .long("samtools")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .default_value("samtools")
            .help("Path to samtools executable"),
    )
    .arg(
        Arg::new("bedtools")
            .long("bedtools")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .default_value("genomeCoverageBed")
            .help("Path to bedtools genomeCoverageBed executable"),
    )
    .arg(
        Arg::new("sort_threads")
            .long("sort-threads")
            .value_parser(value_parser!(NonZeroUsize))
            .value_name("INT")
            .default_value("8")
            .help("Set number of threads used for sorting each BAM file"),
    )
    .arg(
        Arg::new("sample")
            .short('s')
            .long("sample")
            .value_parser(value_parser!(String))
            .value_name("NAME")
            .value_delimiter(',')
            .action(ArgAction::Append)
            .help("Sample name(s), comma separated, one per input file [default: 0,1,2...]"),
    )
    .arg(
        Arg::new("bam")
            .long("bam")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .value_delimiter(',')
            .action(ArgAction::Append)
            .help("Input BAM file(s), comma separated"),
    )
    .arg(
        Arg::new("cov")
            .long("cov")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .value_delimiter(',')
            .action(ArgAction::Append)
            .help("Input per base coverage file(s), comma separated; may be compressed"),
    )
    .group(
        ArgGroup::new("input")
            .args(["bam", "cov"])
            .required(true),
    )
    .arg(
        Arg::new("gff")
            .short('g')
            .long("gff")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .required(true)
            .help("GFF3 annotation file; may be compressed"),
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

fn get_inputs(m: &ArgMatches) -> Vec<SampleInput> {
    if let Some(v) = m.get_many::<PathBuf>("bam") {
        v.map(|p| SampleInput::Bam(p.to_owned())).collect()
    } else if let Some(v) = m.get_many::<PathBuf>("cov") {
        v.map(|p| SampleInput::Coverage(p.to_owned())).collect()
    } else {
        Vec::new()
    }
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m);

    debug!("Processing command line options");

    let names = m
        .get_many::<String>("sample")
        .map(|v| v.cloned().collect());

    let samples = make_sample_list(names, get_inputs(&m))
        .with_context(|| "Error setting up sample list")?;

    let gff = m
        .get_one::<PathBuf>("gff")
        .expect("Missing GFF file")
        .clone();

    let output_dir = m
        .get_one::<PathBuf>("out")
        .expect("Missing output directory")
        .clone();

    let mut cfg = Config::new(samples, gff, output_dir);

    if let Some(x) = m.get_one::<usize>("chunks") {
        cfg.set_chunks(*x)
    }
    if let Some(x) = m.get_one::<f64>("minexpcut") {
        cfg.set_minexpcut(*x)?
    }
    if let Some(s) = m.get_one::<String>("id_tag") {
        cfg.set_id_tag(s)
    }
    if let Some(p) = m.get_one::<PathBuf>("samtools") {
        cfg.set_samtools(p)
    }
    if let Some(p) = m.get_one::<PathBuf>("bedtools") {
        cfg.set_bedtools(p)
    }
    if let Some(x) = m.get_one::<NonZeroUsize>("sort_threads") {
        cfg.set_sort_threads(usize::from(*x))
    }
    if m.get_flag("bam_sorted") {
        cfg.set_bam_sorted()
    }
    if let Some(x) = m.get_one::<NonZeroUsize>("threads") {
        cfg.set_threads(usize::from(*x))
    }

    Ok(cfg)
}
