use std::{collections::BTreeMap, fmt};

use crate::{
    coverage::CoverageMap,
    transcript::{Strand, Transcript, TranscriptSet},
};

/// Coverage along the exons of each transcript in transcription order,
/// keyed (and ordered) by transcript identifier
pub type TranscriptCoverage<'a> = BTreeMap<&'a str, Vec<u32>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    // No coverage data for the contig
    MissingContig,
    // An exon extends beyond the end of the coverage data for the contig
    ExonOutOfRange,
    NoExons,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::MissingContig => "no coverage for contig",
            Self::ExonOutOfRange => "exon outside of coverage range",
            Self::NoExons => "no exons",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, PartialEq)]
pub enum Projection {
    Sequence(Vec<u32>),
    Skipped(SkipReason),
}

/// Collect the coverage of all exon positions of a transcript.
///
/// Exons are concatenated in annotation order; for reverse strand transcripts
/// the complete sequence is then reversed.
pub fn project_transcript(tr: &Transcript, cov: &CoverageMap) -> Projection {
    if tr.is_empty() {
        return Projection::Skipped(SkipReason::NoExons);
    }
    let Some(ctg_cov) = cov.get(tr.ctg()) else {
        return Projection::Skipped(SkipReason::MissingContig);
    };
    let mut v = Vec::with_capacity(tr.len());
    for &(start, end) in tr.exons() {
        match start.checked_sub(1).and_then(|a| ctg_cov.get(a..end)) {
            Some(s) => v.extend_from_slice(s),
            None => return Projection::Skipped(SkipReason::ExonOutOfRange),
        }
    }
    if tr.strand() == Strand::Reverse {
        v.reverse()
    }
    Projection::Sequence(v)
}

/// Counts of projected and skipped transcripts
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProjectionStats {
    pub projected: usize,
    pub missing_contig: usize,
    pub exon_out_of_range: usize,
    pub no_exons: usize,
}

impl ProjectionStats {
    fn add_skip(&mut self, r: SkipReason) {
        match r {
            SkipReason::MissingContig => self.missing_contig += 1,
            SkipReason::ExonOutOfRange => self.exon_out_of_range += 1,
            SkipReason::NoExons => self.no_exons += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.missing_contig + self.exon_out_of_range + self.no_exons
    }
}

impl fmt::Display for ProjectionStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} transcripts with coverage; skipped: {} (no coverage for contig), {} (exon outside coverage range), {} (no exons)",
            self.projected, self.missing_contig, self.exon_out_of_range, self.no_exons
        )
    }
}

/// Project all transcripts onto the coverage map.  Transcripts that can not
/// be projected are counted in the returned stats and left out of the result.
pub fn project_transcripts<'a>(
    cov: &CoverageMap,
    ts: &'a TranscriptSet,
) -> (TranscriptCoverage<'a>, ProjectionStats) {
    let mut stats = ProjectionStats::default();
    let mut res = BTreeMap::new();
    for (id, tr) in ts.iter() {
        match project_transcript(tr, cov) {
            Projection::Sequence(v) => {
                stats.projected += 1;
                res.insert(id, v);
            }
            Projection::Skipped(r) => {
                debug!("Transcript {} skipped: {}", id, r);
                stats.add_skip(r)
            }
        }
    }
    (res, stats)
}
