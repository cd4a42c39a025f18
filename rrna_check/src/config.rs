use std::path::{Path, PathBuf};

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// read_files - FASTQ input files (plain or compressed)
/// rrna - path to FASTA file with rRNA sequences
/// output_dir - output directory
/// kmer - k-mer length
/// cutoff - a read is counted if more than this number of distinct k-mers match
/// threads - number of read files processed in parallel
/// force - regenerate the summary file even if it already exists
///
pub struct Config {
    read_files: Vec<PathBuf>,
    rrna: PathBuf,
    output_dir: PathBuf,
    kmer: usize,
    cutoff: usize,
    threads: usize,
    force: bool,
}

impl Config {
    pub fn new(read_files: Vec<PathBuf>, rrna: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            read_files,
            rrna,
            output_dir,
            kmer: 21,
            cutoff: 3,
            threads: 1,
            force: false,
        }
    }

    pub fn set_kmer(&mut self, k: usize) {
        self.kmer = k
    }

    pub fn set_cutoff(&mut self, x: usize) {
        self.cutoff = x
    }

    pub fn set_threads(&mut self, x: usize) {
        self.threads = x
    }

    pub fn set_force(&mut self) {
        self.force = true
    }

    pub fn read_files(&self) -> &[PathBuf] {
        &self.read_files
    }

    pub fn rrna(&self) -> &Path {
        &self.rrna
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn kmer(&self) -> usize {
        self.kmer
    }

    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join("data_documentation.txt")
    }
}
