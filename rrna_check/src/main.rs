mod cli;
mod config;
mod fasta;
mod fastq;
mod kmer;
mod process;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let cfg = cli::handle_cli().with_context(|| "Error processing command line arguments")?;
    process::process_read_files(&cfg)
}
