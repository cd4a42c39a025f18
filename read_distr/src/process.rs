use std::path::PathBuf;

use anyhow::Context;

use crate::{
    config::Config,
    coverage::read_coverage_file,
    external::make_coverage_file,
    normalize::normalize_coverage,
    output,
    project::project_transcripts,
    sample::{Sample, SampleInput},
    summary::{summarize_samples, summarize_transcripts},
    transcript::{read_gff_file, TranscriptSet},
};

/// File with the per chunk medians of all samples
pub const COMPARISON_FILE: &str = "comparative_summary.txt";

fn coverage_path(cfg: &Config, sample: &Sample) -> anyhow::Result<PathBuf> {
    match sample.input() {
        SampleInput::Coverage(p) => Ok(p.to_owned()),
        SampleInput::Bam(p) => make_coverage_file(cfg, sample.name(), p),
    }
}

/// Process a single sample, writing the per sample output files.
/// Returns the per chunk medians of the relative profiles.
fn process_sample(
    cfg: &Config,
    sample: &Sample,
    ts: &TranscriptSet,
) -> anyhow::Result<Vec<Option<f64>>> {
    let name = sample.name();
    info!("Processing sample {}", name);

    let cov_file = coverage_path(cfg, sample)?;
    let cov = read_coverage_file(&cov_file)?;
    if cov.is_empty() {
        warn!("No coverage data found for sample {}", name)
    }

    let (tcov, stats) = project_transcripts(&cov, ts);
    info!("{}: {}", name, stats);
    if stats.projected == 0 && stats.skipped() > 0 {
        warn!("{}: no transcripts could be placed on the coverage data", name)
    }
    drop(cov);
    output::write_transcript_rows(&cfg.sample_path(name, "cov_per_transcript.txt"), &tcov)?;

    let norm = normalize_coverage(&tcov, cfg.chunks(), cfg.minexpcut());
    info!(
        "{}: {} transcripts with at least {} positions, {} passed expression cutoff",
        name,
        norm.absolute.len(),
        cfg.chunks(),
        norm.relative.len()
    );
    output::write_transcript_rows(
        &cfg.sample_path(name, "norm_cov_per_transcript.txt"),
        &norm.absolute,
    )?;
    output::write_transcript_rows(
        &cfg.sample_path(name, "rel_norm_cov_per_transcript.txt"),
        &norm.relative,
    )?;

    let summary = summarize_transcripts(&norm.relative, cfg.chunks());
    output::write_chunk_distribution(&cfg.sample_path(name, "summary.txt"), &summary)?;
    Ok(summary.medians)
}

/// Process all samples using the shared transcript annotation, then write
/// the comparison of the successful samples.
///
/// A failing sample is reported and skipped; if any sample fails an error
/// is returned once the remaining samples have been processed.
pub fn process_samples(cfg: &Config) -> anyhow::Result<()> {
    utils::make_dir(cfg.output_dir())?;

    let ts = read_gff_file(cfg.gff(), cfg.id_tag())
        .with_context(|| format!("Error reading annotation from {}", cfg.gff().display()))?;
    if ts.is_empty() {
        warn!(
            "No transcripts found in {} with {} attribute",
            cfg.gff().display(),
            cfg.id_tag()
        )
    } else {
        info!(
            "Read {} transcripts from {}",
            ts.len(),
            cfg.gff().display()
        )
    }
    if ts.dropped_exons() > 0 {
        info!(
            "{} exon records skipped as they could not be placed on a transcript",
            ts.dropped_exons()
        )
    }

    let samples = cfg.sample_list();
    let results = utils::run_jobs(samples, cfg.threads(), |_, s| {
        process_sample(cfg, s, &ts).with_context(|| format!("Error processing sample {}", s.name()))
    });

    let mut n_failed = 0;
    let mut medians = Vec::with_capacity(samples.len());
    for (s, r) in samples.iter().zip(results) {
        match r {
            Ok(m) => medians.push((s.name(), m)),
            Err(e) => {
                error!("{:#}", e);
                n_failed += 1
            }
        }
    }

    let comparison = summarize_samples(medians);
    let p = cfg.output_dir().join(COMPARISON_FILE);
    output::write_comparison(&p, &comparison)?;
    info!(
        "Wrote comparison of {} samples to {}",
        comparison.len(),
        p.display()
    );

    if n_failed > 0 {
        Err(anyhow!(
            "{} of {} samples could not be processed",
            n_failed,
            samples.len()
        ))
    } else {
        Ok(())
    }
}
