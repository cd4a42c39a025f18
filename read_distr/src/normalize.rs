use std::collections::BTreeMap;

use crate::project::TranscriptCoverage;

/// Chunk that position `idx` of a transcript is assigned to, where `factor`
/// is the (fractional) number of positions per chunk
fn chunk_index(idx: usize, factor: f64, chunks: usize) -> usize {
    ((idx as f64 / factor) as usize).min(chunks - 1)
}

/// Split coverage values into `chunks` consecutive chunks of (nearly) equal
/// size and return the average coverage of each chunk.
///
/// With `factor = len / chunks`, position `idx` goes to chunk
/// `floor(idx / factor)`, so chunks get either floor(factor) or ceil(factor)
/// positions.  Returns None if there are fewer values than chunks.
pub fn chunk_profile(values: &[u32], chunks: usize) -> Option<Vec<f64>> {
    let l = values.len();
    if chunks == 0 || l < chunks {
        return None;
    }
    let factor = l as f64 / chunks as f64;
    let mut sums = vec![0.0; chunks];
    let mut counts = vec![0usize; chunks];
    for (idx, x) in values.iter().enumerate() {
        let c = chunk_index(idx, factor, chunks);
        sums[c] += *x as f64;
        counts[c] += 1;
    }
    Some(
        sums.iter()
            .zip(counts.iter())
            .map(|(s, n)| if *n == 0 || *s == 0.0 { 0.0 } else { s / (*n as f64) })
            .collect(),
    )
}

/// Scale a chunk profile so that its maximum is 1.  Only profiles where the
/// sum of the chunk averages exceeds `minexpcut` are used.
pub fn relative_profile(profile: &[f64], minexpcut: f64) -> Option<Vec<f64>> {
    let tot: f64 = profile.iter().sum();
    if tot > minexpcut {
        let mx = profile.iter().copied().fold(0.0, f64::max);
        if mx > 0.0 {
            return Some(profile.iter().map(|x| x / mx).collect());
        }
    }
    None
}

/// Chunk profiles for a sample, keyed by transcript
#[derive(Default)]
pub struct NormalizedCoverage<'a> {
    // Average coverage per chunk for transcripts with at least `chunks` positions
    pub absolute: BTreeMap<&'a str, Vec<f64>>,
    // Absolute profiles scaled to a maximum of 1, for transcripts passing the expression cutoff
    pub relative: BTreeMap<&'a str, Vec<f64>>,
    // Transcripts with fewer positions than chunks
    pub too_short: usize,
}

pub fn normalize_coverage<'a>(
    tcov: &TranscriptCoverage<'a>,
    chunks: usize,
    minexpcut: f64,
) -> NormalizedCoverage<'a> {
    let mut norm = NormalizedCoverage::default();
    for (id, v) in tcov.iter() {
        match chunk_profile(v, chunks) {
            Some(p) => {
                if let Some(r) = relative_profile(&p, minexpcut) {
                    norm.relative.insert(*id, r);
                }
                norm.absolute.insert(*id, p);
            }
            None => {
                trace!("Transcript {} too short ({}) for {} chunks", id, v.len(), chunks);
                norm.too_short += 1
            }
        }
    }
    debug!(
        "Chunk profiles for {} transcripts ({} too short), relative profiles for {}",
        norm.absolute.len(),
        norm.too_short,
        norm.relative.len()
    );
    norm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractional_chunks() {
        let chunks = 100;
        let factor = 2.5;
        let mut counts = vec![0; chunks];
        for idx in 0..250 {
            counts[chunk_index(idx, factor, chunks)] += 1;
        }
        assert!(counts.iter().all(|n| *n == 2 || *n == 3));
        assert_eq!(counts.iter().sum::<usize>(), 250);
        assert_eq!(&counts[..4], &[3, 2, 3, 2]);

        let values: Vec<u32> = (0..250).collect();
        let p = chunk_profile(&values, chunks).unwrap();
        assert_eq!(p.len(), 100);
        // Chunk 0 has 0,1,2; chunk 1 has 3,4; chunk 2 has 5,6,7
        assert_eq!(p[0], 1.0);
        assert_eq!(p[1], 3.5);
        assert_eq!(p[2], 6.0);
        assert_eq!(p[99], 248.5);
    }

    #[test]
    fn test_exact_division() {
        let values = [1, 3, 0, 0, 5, 5, 2, 2, 2, 4];
        let p = chunk_profile(&values, 5).unwrap();
        assert_eq!(p, vec![2.0, 0.0, 5.0, 2.0, 3.0]);
        // One value per chunk
        assert_eq!(chunk_profile(&values, 10).unwrap()[9], 4.0);
    }

    #[test]
    fn test_too_short() {
        assert!(chunk_profile(&[1, 2, 3, 4, 5], 100).is_none());
        assert!(chunk_profile(&[], 10).is_none());
    }

    #[test]
    fn test_relative_profile() {
        let p = [10.0, 40.0, 20.0, 80.0];
        let r = relative_profile(&p, 100.0).unwrap();
        assert_eq!(r, vec![0.125, 0.5, 0.25, 1.0]);
        assert!(r.iter().all(|x| (0.0..=1.0).contains(x)));
        // Sum must be strictly greater than the cutoff
        assert!(relative_profile(&p, 150.0).is_none());
        assert!(relative_profile(&[0.0; 4], 0.0).is_none());
    }

    #[test]
    fn test_normalize_coverage() {
        let mut tcov = TranscriptCoverage::new();
        tcov.insert("short", vec![100; 5]);
        tcov.insert("low", vec![1; 20]);
        let high: Vec<u32> = (1..=30).collect();
        tcov.insert("high", high);
        let norm = normalize_coverage(&tcov, 10, 100.0);
        assert_eq!(norm.too_short, 1);
        assert!(!norm.absolute.contains_key("short"));
        assert_eq!(norm.absolute["low"], vec![1.0; 10]);
        assert!(!norm.relative.contains_key("low"));
        let r = &norm.relative["high"];
        assert_eq!(r.len(), 10);
        assert_eq!(r[9], 1.0);
        assert_eq!(r[0], 2.0 / 29.0);
        assert!(r.windows(2).all(|w| w[0] < w[1]));
    }
}
