use std::collections::BTreeMap;

/// ChunkSummary
///
/// distribution - for each chunk, the relative profile values at that chunk
/// from every qualifying transcript (in transcript order)
/// medians - per chunk median of `distribution`; None if no transcripts qualified
///
pub struct ChunkSummary {
    pub distribution: Vec<Vec<f64>>,
    pub medians: Vec<Option<f64>>,
}

/// Transpose the relative profiles into one group per chunk and get the
/// median of each group
pub fn summarize_transcripts(
    relative: &BTreeMap<&str, Vec<f64>>,
    chunks: usize,
) -> ChunkSummary {
    let mut distribution: Vec<Vec<f64>> = (0..chunks)
        .map(|_| Vec::with_capacity(relative.len()))
        .collect();
    for (id, p) in relative.iter() {
        if p.len() != chunks {
            warn!(
                "Profile for {} has {} chunks (expected {}); skipped",
                id,
                p.len(),
                chunks
            );
            continue;
        }
        for (d, x) in distribution.iter_mut().zip(p.iter()) {
            d.push(*x)
        }
    }
    let medians = distribution
        .iter()
        .map(|d| utils::median(&mut d.clone()))
        .collect();
    ChunkSummary {
        distribution,
        medians,
    }
}

/// Collect the per chunk medians of each sample, ordered by sample name
pub fn summarize_samples<'a, I>(summaries: I) -> BTreeMap<String, Vec<Option<f64>>>
where
    I: IntoIterator<Item = (&'a str, Vec<Option<f64>>)>,
{
    summaries
        .into_iter()
        .map(|(s, m)| (s.to_owned(), m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_transcripts() {
        let mut rel = BTreeMap::new();
        rel.insert("t2", vec![1.0, 0.5, 0.0]);
        rel.insert("t1", vec![0.25, 1.0, 0.5]);
        rel.insert("t3", vec![0.75, 0.25, 1.0]);
        rel.insert("t4", vec![1.0, 0.0, 0.0]);
        let s = summarize_transcripts(&rel, 3);
        // Transcript order within each chunk
        assert_eq!(s.distribution[0], vec![0.25, 1.0, 0.75, 1.0]);
        assert_eq!(s.distribution[2], vec![0.5, 0.0, 1.0, 0.0]);
        assert_eq!(s.medians, vec![Some(0.875), Some(0.375), Some(0.25)]);
    }

    #[test]
    fn test_no_transcripts() {
        let rel = BTreeMap::new();
        let s = summarize_transcripts(&rel, 10);
        assert_eq!(s.distribution.len(), 10);
        assert!(s.distribution.iter().all(|d| d.is_empty()));
        assert!(s.medians.iter().all(|m| m.is_none()));
    }

    #[test]
    fn test_summarize_samples() {
        let cmp = summarize_samples(vec![
            ("liver", vec![Some(0.5), None]),
            ("brain", vec![Some(1.0), Some(0.25)]),
        ]);
        let names: Vec<_> = cmp.keys().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["brain", "liver"]);
        assert_eq!(cmp["liver"], vec![Some(0.5), None]);
    }
}
