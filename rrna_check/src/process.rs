use std::{fs, io::BufRead, path::Path};

use anyhow::Context;
use compress_io::compress::CompressIo;

use crate::{config::Config, fastq::FastqReader, kmer::KmerIndex};

/// Count reads in a FASTQ stream with more than `cutoff` distinct k-mers from the index
pub fn count_hits<R: BufRead>(rdr: R, idx: &KmerIndex, cutoff: usize) -> anyhow::Result<usize> {
    let mut hits = 0;
    for seq in FastqReader::new(rdr) {
        if idx.is_contaminated(&seq?, cutoff) {
            hits += 1
        }
    }
    Ok(hits)
}

fn count_file_hits(p: &Path, idx: &KmerIndex, cutoff: usize) -> anyhow::Result<usize> {
    info!("processing: {}", p.display());
    let rdr = CompressIo::new()
        .path(p)
        .bufreader()
        .with_context(|| format!("Could not open read file {}", p.display()))?;
    let hits = count_hits(rdr, idx, cutoff).with_context(|| format!("Error reading {}", p.display()))?;
    info!("{} --- hits: {}", p.display(), hits);
    Ok(hits)
}

fn load_index(cfg: &Config) -> anyhow::Result<KmerIndex> {
    let p = cfg.rrna();
    debug!("Reading rRNA sequences from {}", p.display());
    let rdr = CompressIo::new()
        .path(p)
        .bufreader()
        .with_context(|| format!("Could not open rRNA file {}", p.display()))?;
    let idx = KmerIndex::from_fasta(rdr, cfg.kmer())
        .with_context(|| format!("Error reading rRNA sequences from {}", p.display()))?;
    if idx.is_empty() {
        warn!("No {}-mers found in {}; no reads will be counted", idx.k(), p.display())
    } else {
        info!("{} distinct {}-mers loaded from {}", idx.len(), idx.k(), p.display());
    }
    Ok(idx)
}

/// Generate summary file with the number of hits for each read file.
///
/// Read files that can not be processed are reported and left out of the
/// summary; if this happens an error is returned after the summary is written.
pub fn process_read_files(cfg: &Config) -> anyhow::Result<()> {
    let summary = cfg.summary_path();
    if summary.exists() && !cfg.force() {
        info!(
            "Summary file {} already exists; use --force to recalculate",
            summary.display()
        );
        for l in fs::read_to_string(&summary)
            .with_context(|| format!("Could not read {}", summary.display()))?
            .lines()
        {
            info!("{}", l)
        }
        return Ok(());
    }

    utils::make_dir(cfg.output_dir())?;
    let idx = load_index(cfg)?;

    let files = cfg.read_files();
    let results = utils::run_jobs(files, cfg.threads(), |_, p| {
        count_file_hits(p, &idx, cfg.cutoff())
    });

    let mut n_failed = 0;
    utils::write_atomic(&summary, |w| {
        for (p, r) in files.iter().zip(results.iter()) {
            match r {
                Ok(hits) => writeln!(w, "{}\t{}", p.display(), hits)?,
                Err(e) => {
                    error!("{:#}", e);
                    n_failed += 1;
                }
            }
        }
        Ok(())
    })?;
    debug!("Wrote summary to {}", summary.display());

    if n_failed > 0 {
        Err(anyhow!(
            "{} of {} read files could not be processed",
            n_failed,
            files.len()
        ))
    } else {
        Ok(())
    }
}
