use std::{
    collections::{BTreeMap, HashSet},
    io::BufRead,
    path::Path,
    sync::Arc,
};

use anyhow::Context;
use compress_io::compress::CompressIo;
use utils::get_next_line;

use crate::config::Contig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Only `-` denotes the reverse strand; `+`, `.` and anything else are
    /// treated as forward
    fn from_gff(s: &str) -> Self {
        if s == "-" {
            Self::Reverse
        } else {
            Self::Forward
        }
    }
}

/// Transcript
///
/// ctg - contig the transcript lies on
/// strand - orientation of transcript
/// exons - (start, end) pairs, 1 based and inclusive, in the order they appear in the annotation
///
#[derive(Debug)]
pub struct Transcript {
    ctg: Contig,
    strand: Strand,
    exons: Vec<(usize, usize)>,
}

impl Transcript {
    pub fn new(ctg: Contig, strand: Strand) -> Self {
        Self {
            ctg,
            strand,
            exons: Vec::new(),
        }
    }

    pub fn add_exon(&mut self, start: usize, end: usize) {
        self.exons.push((start, end))
    }

    pub fn ctg(&self) -> &Contig {
        &self.ctg
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn exons(&self) -> &[(usize, usize)] {
        &self.exons
    }

    /// Total length of exons
    pub fn len(&self) -> usize {
        self.exons.iter().map(|(a, b)| (b + 1).saturating_sub(*a)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.exons.is_empty()
    }
}

/// Transcripts read from an annotation file, ordered by identifier
#[derive(Default, Debug)]
pub struct TranscriptSet {
    transcripts: BTreeMap<String, Transcript>,
    dropped_exons: usize,
}

impl TranscriptSet {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Transcript)> {
        self.transcripts.iter().map(|(k, t)| (k.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Number of exon records that could not be assigned to a transcript
    pub fn dropped_exons(&self) -> usize {
        self.dropped_exons
    }
}

/// Get value of attribute `key` from a GFF3 attribute column (key1=value1;key2=value2...)
fn get_attribute<'a>(attr: &'a str, key: &str) -> Option<&'a str> {
    attr.split(';').find_map(|s| match s.trim().split_once('=') {
        Some((k, v)) if k.trim() == key => Some(v.trim()),
        _ => None,
    })
}

fn parse_coords(s1: &str, s2: &str) -> anyhow::Result<(usize, usize)> {
    let a = s1
        .parse::<usize>()
        .with_context(|| format!("Error parsing start coordinate {}", s1))?;
    let b = s2
        .parse::<usize>()
        .with_context(|| format!("Error parsing end coordinate {}", s2))?;
    if a == 0 {
        Err(anyhow!("Coordinates should be 1 based"))
    } else if b < a {
        Err(anyhow!("Range error - {} > {}", a, b))
    } else {
        Ok((a, b))
    }
}

/// Read transcript structures from GFF3 input.
///
/// mRNA and transcript records define transcripts, identified by the attribute
/// `id_tag`.  Exon records are added to the transcript(s) listed in their
/// Parent attribute.  Exons that can not be placed are reported and dropped.
/// `name` is used in messages.
pub fn read_gff<R: BufRead>(
    mut rdr: R,
    id_tag: &str,
    name: &str,
) -> anyhow::Result<TranscriptSet> {
    let mut buf = String::new();
    let mut line = 0;
    let mut ts = TranscriptSet::default();
    let mut ctg_hash: HashSet<Contig> = HashSet::new();

    while let Some(fields) = get_next_line(&mut rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines from {}", line, name))?
    {
        line += 1;
        if fields[0].starts_with('#') {
            // Embedded sequences follow, so there are no more features
            if fields[0].starts_with("##FASTA") {
                debug!("{}:{} FASTA section found; stop reading", name, line);
                break;
            }
            continue;
        }
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }
        if fields.len() < 9 {
            return Err(anyhow!(
                "{}:{} Expected 9 columns, found {}",
                name,
                line,
                fields.len()
            ));
        }
        let attr = fields[8];
        match fields[2] {
            "mRNA" | "transcript" => {
                let Some(id) = get_attribute(attr, id_tag) else {
                    warn!(
                        "{}:{} {} record without {} attribute skipped",
                        name, line, fields[2], id_tag
                    );
                    continue;
                };
                if !ctg_hash.contains(fields[0]) {
                    trace!("Adding contig {}", fields[0]);
                    ctg_hash.insert(Arc::from(fields[0]));
                }
                let ctg = ctg_hash.get(fields[0]).unwrap().clone();
                let tr = Transcript::new(ctg, Strand::from_gff(fields[6]));
                if ts.transcripts.insert(id.to_owned(), tr).is_some() {
                    warn!(
                        "{}:{} Duplicate transcript {}; earlier definition replaced",
                        name, line, id
                    )
                }
            }
            "exon" => {
                let Some(parents) = get_attribute(attr, "Parent") else {
                    warn!("EXON-ERROR: {}:{} exon without Parent attribute", name, line);
                    ts.dropped_exons += 1;
                    continue;
                };
                let (start, end) = match parse_coords(fields[3], fields[4]) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("EXON-ERROR: {}:{} {}", name, line, e);
                        ts.dropped_exons += 1;
                        continue;
                    }
                };
                for parent in parents.split(',') {
                    match ts.transcripts.get_mut(parent) {
                        Some(tr) if tr.ctg.as_ref() == fields[0] => tr.add_exon(start, end),
                        Some(tr) => {
                            warn!(
                                "EXON-ERROR: {}:{} exon on {} but parent {} is on {}",
                                name, line, fields[0], parent, tr.ctg
                            );
                            ts.dropped_exons += 1;
                        }
                        None => {
                            warn!(
                                "EXON-ERROR: {}:{} parent transcript {} not found",
                                name, line, parent
                            );
                            ts.dropped_exons += 1;
                        }
                    }
                }
            }
            _ => (),
        }
    }

    debug!(
        "Finished reading {} lines from {}; found {} transcripts",
        line,
        name,
        ts.len()
    );
    if ts.dropped_exons > 0 {
        warn!(
            "{} exon records from {} could not be assigned to a transcript",
            ts.dropped_exons, name
        )
    }
    Ok(ts)
}

/// Read transcript structures from a GFF3 file (possibly compressed)
pub fn read_gff_file(p: &Path, id_tag: &str) -> anyhow::Result<TranscriptSet> {
    debug!("Reading in transcript structures from {}", p.display());
    let rdr = CompressIo::new()
        .path(p)
        .bufreader()
        .with_context(|| format!("Could not open annotation file {}", p.display()))?;
    read_gff(rdr, id_tag, &p.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GFF: &str = "##gff-version 3
chr1\tsrc\tgene\t100\t500\t.\t+\t.\tID=g1
chr1\tsrc\tmRNA\t100\t500\t.\t+\t.\tID=t1;Parent=g1
chr1\tsrc\texon\t100\t200\t.\t+\t.\tID=e1;Parent=t1
chr1\tsrc\tCDS\t120\t200\t.\t+\t0\tParent=t1
chr1\tsrc\texon\t300\t500\t.\t+\t.\tParent=t1;Name=x
chr2\tsrc\ttranscript\t10\t50\t.\t-\t.\tName=y;ID=t2
chr2\tsrc\texon\t40\t50\t.\t-\t.\tParent=t2
chr2\tsrc\texon\t10\t20\t.\t-\t.\tParent=t2
chr2\tsrc\texon\t60\t70\t.\t-\t.\tParent=t3
";

    fn read(s: &str) -> anyhow::Result<TranscriptSet> {
        read_gff(s.as_bytes(), "ID", "test")
    }

    #[test]
    fn test_get_attribute() {
        let a = "ID=t1;Parent=g1,g2; Name = abc ;";
        assert_eq!(get_attribute(a, "ID"), Some("t1"));
        assert_eq!(get_attribute(a, "Parent"), Some("g1,g2"));
        assert_eq!(get_attribute(a, "Name"), Some("abc"));
        assert_eq!(get_attribute(a, "Alias"), None);
        assert_eq!(get_attribute("transcript_ID=q", "ID"), None);
    }

    #[test]
    fn test_read_transcripts() {
        let ts = read(GFF).unwrap();
        assert_eq!(ts.len(), 2);
        let t1 = ts.transcripts.get("t1").unwrap();
        assert_eq!(t1.ctg().as_ref(), "chr1");
        assert_eq!(t1.strand(), Strand::Forward);
        assert_eq!(t1.exons(), &[(100, 200), (300, 500)]);
        assert_eq!(t1.len(), 302);
        let t2 = ts.transcripts.get("t2").unwrap();
        assert_eq!(t2.strand(), Strand::Reverse);
        // Annotation order is kept
        assert_eq!(t2.exons(), &[(40, 50), (10, 20)]);
        // Exon for unknown t3 is dropped
        assert_eq!(ts.dropped_exons(), 1);
        let ids: Vec<_> = ts.iter().map(|(k, _)| k).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_exon_before_parent_is_dropped() {
        let gff = "chr1\ts\texon\t1\t10\t.\t+\t.\tParent=t1
chr1\ts\tmRNA\t1\t10\t.\t+\t.\tID=t1
chr1\ts\texon\t5\t10\t.\t+\t.\tParent=t1
";
        let ts = read(gff).unwrap();
        assert_eq!(ts.transcripts.get("t1").unwrap().exons(), &[(5, 10)]);
        assert_eq!(ts.dropped_exons(), 1);
    }

    #[test]
    fn test_multiple_parents_and_bad_exons() {
        let gff = "chr1\ts\tmRNA\t1\t10\t.\t+\t.\tID=a
chr1\ts\tmRNA\t1\t10\t.\t+\t.\tID=b
chr1\ts\texon\t1\t10\t.\t+\t.\tParent=a,b
chr1\ts\texon\t9\t3\t.\t+\t.\tParent=a
chr2\ts\texon\t1\t3\t.\t+\t.\tParent=a
chr1\ts\texon\t1\t3\t.\t+\t.\tID=orphan
";
        let ts = read(gff).unwrap();
        assert_eq!(ts.transcripts.get("a").unwrap().exons(), &[(1, 10)]);
        assert_eq!(ts.transcripts.get("b").unwrap().exons(), &[(1, 10)]);
        assert_eq!(ts.dropped_exons(), 3);
    }

    #[test]
    fn test_id_tag_and_fasta_section() {
        let gff = "chr1\ts\tmRNA\t1\t10\t.\t+\t.\tID=m1;transcript_id=T1
chr1\ts\texon\t1\t10\t.\t+\t.\tParent=T1
##FASTA
>chr1
ACGT
";
        let ts = read_gff(gff.as_bytes(), "transcript_id", "test").unwrap();
        assert_eq!(ts.len(), 1);
        assert_eq!(ts.transcripts.get("T1").unwrap().exons(), &[(1, 10)]);
    }

    #[test]
    fn test_short_line_is_error() {
        let e = read("chr1\ts\tmRNA\t1\t10\n").unwrap_err();
        assert!(e.to_string().contains("test:1"));
    }
}
