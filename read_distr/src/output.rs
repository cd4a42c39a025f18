use std::{collections::BTreeMap, fmt, io::Write, path::Path};

use utils::write_row;

use crate::summary::ChunkSummary;

/// Displays a missing value as NA
struct OptVal(Option<f64>);

impl fmt::Display for OptVal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(x) => write!(f, "{}", x),
            None => write!(f, "NA"),
        }
    }
}

/// Write one row per transcript: `<transcript_id>\t<comma separated values>`
pub fn write_transcript_rows<V: fmt::Display>(
    path: &Path,
    rows: &BTreeMap<&str, Vec<V>>,
) -> anyhow::Result<()> {
    utils::write_atomic(path, |w| {
        for (id, v) in rows.iter() {
            write_row(w, id, v)?
        }
        Ok(())
    })?;
    debug!("Wrote {} transcripts to {}", rows.len(), path.display());
    Ok(())
}

/// Write one row per chunk with the values from all transcripts:
/// `<chunk index>\t<comma separated values>`
pub fn write_chunk_distribution(path: &Path, summary: &ChunkSummary) -> anyhow::Result<()> {
    utils::write_atomic(path, |w| {
        for (i, d) in summary.distribution.iter().enumerate() {
            write_row(w, i, d)?
        }
        Ok(())
    })
}

fn write_medians<W: Write + ?Sized>(
    w: &mut W,
    comparison: &BTreeMap<String, Vec<Option<f64>>>,
) -> std::io::Result<()> {
    for (s, m) in comparison.iter() {
        write_row(w, s, m.iter().map(|x| OptVal(*x)))?
    }
    Ok(())
}

/// Write the per chunk medians for each sample, one row per sample
pub fn write_comparison(
    path: &Path,
    comparison: &BTreeMap<String, Vec<Option<f64>>>,
) -> anyhow::Result<()> {
    utils::write_atomic(path, |w| {
        write_medians(w, comparison)?;
        Ok(())
    })
}
