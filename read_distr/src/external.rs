use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context;

use crate::config::Config;

/// Memory per thread passed to samtools sort
const SORT_MEMORY: &str = "5000000000";

/// Run an external command with stdout going to `out`.  The output is written
/// to a temporary file and only moved to `out` if the command succeeds.
fn run_to_file(cmd: &mut Command, out: &Path) -> anyhow::Result<()> {
    let desc = format!("{:?}", cmd);
    let tmp = utils::tmp_path(out);
    debug!("Running {} > {}", desc, out.display());
    let file = fs::File::create(&tmp)
        .with_context(|| format!("Problem creating output file {}", tmp.display()))?;

    let res = match cmd.stdout(Stdio::from(file)).status() {
        Ok(status) if status.success() => fs::rename(&tmp, out)
            .with_context(|| format!("Could not rename {} to {}", tmp.display(), out.display())),
        Ok(status) => Err(anyhow!("Command {} failed ({})", desc, status)),
        Err(e) => Err(anyhow!("Could not run command {}: {}", desc, e)),
    };
    if res.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(&tmp) {
            warn!("Could not remove temporary file {}: {}", tmp.display(), e)
        }
    }
    res
}

/// Generate the per base coverage file for a sample from a BAM file, sorting
/// the BAM file first unless it is already sorted.  An existing coverage file
/// is used as is.  Returns the path of the coverage file.
pub fn make_coverage_file(cfg: &Config, sample: &str, bam: &Path) -> anyhow::Result<PathBuf> {
    let cov = cfg.sample_path(sample, "cov");
    if cov.exists() {
        info!(
            "Coverage file {} already exists; not regenerating",
            cov.display()
        );
        return Ok(cov);
    }

    let sorted = if cfg.bam_sorted() {
        bam.to_owned()
    } else {
        let sorted = cfg.sample_path(sample, "sorted.bam");
        info!("Sorting {}", bam.display());
        run_to_file(
            Command::new(cfg.samtools())
                .args(["sort", "-m", SORT_MEMORY, "--threads"])
                .arg(cfg.sort_threads().to_string())
                .arg(bam),
            &sorted,
        )?;
        sorted
    };

    info!("Generating coverage from {}", sorted.display());
    run_to_file(
        Command::new(cfg.bedtools())
            .args(["-d", "-split", "-ibam"])
            .arg(&sorted),
        &cov,
    )?;
    Ok(cov)
}
