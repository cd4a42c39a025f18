use std::{collections::HashSet, io::BufRead};

use crate::fasta::FastaReader;

/// Complement of a single base.  Anything other than (upper case) ACGT becomes N
fn complement(c: u8) -> u8 {
    match c {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        _ => b'N',
    }
}

/// Reverse complement of a sequence.
///
/// Ambiguity codes are mapped to N, so revcomp(revcomp(s)) == s only holds
/// for sequences made up of A, C, G and T.
pub fn revcomp(s: &[u8]) -> Vec<u8> {
    s.iter().rev().map(|c| complement(*c)).collect()
}

/// KmerIndex
///
/// Set of k-mers taken from a collection of reference sequences together with
/// their reverse complements.  Each sequence is cut into consecutive,
/// non-overlapping k-mers starting from the first base; a trailing partial
/// k-mer is discarded.
///
pub struct KmerIndex {
    k: usize,
    kmers: HashSet<Vec<u8>>,
}

impl KmerIndex {
    pub fn build<I, S>(seqs: I, k: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        assert!(k > 0, "k-mer length must be positive");
        let mut kmers = HashSet::new();
        for s in seqs {
            let s = s.as_ref().to_ascii_uppercase();
            for kmer in s.chunks_exact(k) {
                kmers.insert(revcomp(kmer));
                kmers.insert(kmer.to_vec());
            }
        }
        Self { k, kmers }
    }

    /// Build index from the records of a FASTA file
    pub fn from_fasta<R: BufRead>(rdr: R, k: usize) -> anyhow::Result<Self> {
        let mut seqs = Vec::new();
        for rec in FastaReader::new(rdr) {
            let rec = rec?;
            trace!("Read reference {} ({} bp)", rec.name(), rec.seq().len());
            seqs.push(rec.into_seq())
        }
        debug!("Read {} reference sequences", seqs.len());
        Ok(Self::build(seqs, k))
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.kmers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kmers.is_empty()
    }

    /// Count the distinct k-mers from the index occurring anywhere in `read`.
    /// Counting stops once `limit` is exceeded if a limit is given.
    pub fn count_matches(&self, read: &[u8], limit: Option<usize>) -> usize {
        let mut found = HashSet::new();
        for w in read.windows(self.k) {
            if self.kmers.contains(w) && found.insert(w) {
                if let Some(l) = limit {
                    if found.len() > l {
                        break;
                    }
                }
            }
        }
        found.len()
    }

    /// A read is contaminated if more than `cutoff` distinct k-mers from the
    /// index occur in it
    pub fn is_contaminated(&self, read: &[u8], cutoff: usize) -> bool {
        self.count_matches(read, Some(cutoff)) > cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revcomp() {
        assert_eq!(revcomp(b"AACGTT"), b"AACGTT".to_vec());
        assert_eq!(revcomp(b"ACCT"), b"AGGT".to_vec());
        assert_eq!(revcomp(b"ACRT"), b"ANGT".to_vec());
        assert!(revcomp(b"").is_empty());
    }

    #[test]
    fn test_revcomp_twice_is_identity() {
        let s = b"GATTACACCGTTAGGCAT";
        assert_eq!(revcomp(&revcomp(s)), s.to_vec());
        // Ambiguity codes are lost
        assert_eq!(revcomp(&revcomp(b"ACYT")), b"ACNT".to_vec());
    }

    #[test]
    fn test_build_partitions_sequence() {
        let idx = KmerIndex::build(["acgttCGTAC"], 4);
        // ACGT, TCGT plus reverse complements ACGT (palindrome), ACGA
        // Trailing AC is discarded
        assert_eq!(idx.len(), 3);
        for kmer in [&b"ACGT"[..], &b"TCGT"[..], &b"ACGA"[..]] {
            assert!(idx.kmers.contains(kmer));
        }
        assert!(!idx.kmers.contains(&b"CGTT"[..]));
        assert!(!idx.kmers.contains(&b"AC"[..]));
    }

    #[test]
    fn test_build_forward_kmers_are_aligned_substrings() {
        let s = "TTGACCATGGCAAGTCCAGTA";
        let k = 5;
        let idx = KmerIndex::build([s], k);
        let rc: HashSet<Vec<u8>> = s
            .as_bytes()
            .chunks_exact(k)
            .map(revcomp)
            .collect();
        for kmer in idx.kmers.iter().filter(|x| !rc.contains(*x)) {
            assert_eq!(kmer.len(), k);
            let pos = s.find(std::str::from_utf8(kmer).unwrap()).unwrap();
            assert_eq!(pos % k, 0);
        }
        assert_eq!(idx.len(), 8);
    }

    #[test]
    fn test_empty_index_flags_nothing() {
        let idx = KmerIndex::build(Vec::<&str>::new(), 21);
        assert!(idx.is_empty());
        assert!(!idx.is_contaminated(b"ACGTACGTACGTACGTACGTACGTACGT", 0));
    }

    #[test]
    fn test_cutoff_is_strict() {
        // Forward k-mers AAAC, CCCG, GGGT, TTTA and their reverse complements
        let idx = KmerIndex::build(["AAACCCCGGGGTTTTA"], 4);
        let read = b"xAAACxCCCGxGGGTx";
        assert_eq!(idx.count_matches(read, None), 3);
        assert!(idx.is_contaminated(read, 2));
        assert!(!idx.is_contaminated(read, 3));
    }

    #[test]
    fn test_repeated_kmers_counted_once() {
        let idx = KmerIndex::build(["AAACCCCG"], 4);
        let read = b"AAACAAACAAACAAAC";
        assert_eq!(idx.count_matches(read, None), 1);
        assert!(!idx.is_contaminated(read, 1));
    }

    #[test]
    fn test_reverse_complement_match() {
        let idx = KmerIndex::build(["AAACCCCG"], 4);
        // GTTT is the reverse complement of AAAC; CGGG of CCCG
        assert_eq!(idx.count_matches(b"TTGTTTTCGGGT", None), 2);
    }

    #[test]
    fn test_read_shorter_than_k() {
        let idx = KmerIndex::build(["ACGTACGTAC"], 4);
        assert_eq!(idx.count_matches(b"ACG", None), 0);
    }
}
