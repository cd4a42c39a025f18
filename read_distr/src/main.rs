mod cli;
mod config;
mod coverage;
mod external;
mod normalize;
mod output;
mod process;
mod project;
mod sample;
mod summary;
mod transcript;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let cfg = cli::handle_cli().with_context(|| "Error processing command line arguments")?;
    process::process_samples(&cfg)
}
