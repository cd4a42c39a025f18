use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::sample::Sample;

/// Transcripts are never split into fewer chunks than this
pub const MIN_CHUNKS: usize = 10;

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// sample_list - input samples (BAM or coverage files)
/// gff - GFF3 annotation file
/// output_dir - output directory
/// id_tag - attribute holding the identifier of mRNA/transcript records
/// chunks - number of chunks each transcript is split into
/// minexpcut - minimum summed chunk coverage for a transcript to be used for the relative profiles
/// samtools, bedtools - external programs used to generate coverage from BAM files
/// sort_threads - threads used for sorting BAM files
/// bam_sorted - input BAM files are already sorted
/// threads - number of samples processed in parallel
///
pub struct Config {
    sample_list: Vec<Sample>,
    gff: PathBuf,
    output_dir: PathBuf,
    id_tag: String,
    chunks: usize,
    minexpcut: f64,
    samtools: PathBuf,
    bedtools: PathBuf,
    sort_threads: usize,
    bam_sorted: bool,
    threads: usize,
}

impl Config {
    pub fn new(sample_list: Vec<Sample>, gff: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            sample_list,
            gff,
            output_dir,
            id_tag: String::from("ID"),
            chunks: 100,
            minexpcut: 100.0,
            samtools: PathBuf::from("samtools"),
            bedtools: PathBuf::from("genomeCoverageBed"),
            sort_threads: 8,
            bam_sorted: false,
            threads: 1,
        }
    }

    pub fn set_chunks(&mut self, x: usize) {
        if x < MIN_CHUNKS {
            warn!(
                "Number of chunks ({}) too small; setting to {}",
                x, MIN_CHUNKS
            );
        }
        self.chunks = x.max(MIN_CHUNKS)
    }

    pub fn set_minexpcut(&mut self, x: f64) -> anyhow::Result<()> {
        if x.is_finite() && x >= 0.0 {
            self.minexpcut = x;
            Ok(())
        } else {
            Err(anyhow!("Invalid minimum expression cutoff {}", x))
        }
    }

    pub fn set_id_tag<S: AsRef<str>>(&mut self, s: S) {
        self.id_tag = s.as_ref().to_owned()
    }

    pub fn set_samtools<P: AsRef<Path>>(&mut self, p: P) {
        self.samtools = p.as_ref().to_owned()
    }

    pub fn set_bedtools<P: AsRef<Path>>(&mut self, p: P) {
        self.bedtools = p.as_ref().to_owned()
    }

    pub fn set_sort_threads(&mut self, x: usize) {
        self.sort_threads = x
    }

    pub fn set_bam_sorted(&mut self) {
        self.bam_sorted = true
    }

    pub fn set_threads(&mut self, x: usize) {
        self.threads = x
    }

    pub fn sample_list(&self) -> &[Sample] {
        &self.sample_list
    }

    pub fn gff(&self) -> &Path {
        &self.gff
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn id_tag(&self) -> &str {
        &self.id_tag
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn minexpcut(&self) -> f64 {
        self.minexpcut
    }

    pub fn samtools(&self) -> &Path {
        &self.samtools
    }

    pub fn bedtools(&self) -> &Path {
        &self.bedtools
    }

    pub fn sort_threads(&self) -> usize {
        self.sort_threads
    }

    pub fn bam_sorted(&self) -> bool {
        self.bam_sorted
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Path of output file for a sample
    pub fn sample_path(&self, sample: &str, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", sample, suffix))
    }
}

pub type Contig = Arc<str>;
