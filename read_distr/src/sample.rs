use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

/// Input data for a sample.  Coverage is either read directly or generated
/// from a BAM file using external tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleInput {
    Bam(PathBuf),
    Coverage(PathBuf),
}

impl SampleInput {
    pub fn path(&self) -> &Path {
        match self {
            Self::Bam(p) | Self::Coverage(p) => p,
        }
    }
}

/// Input sample
///
/// name - used to generate output files
/// input - BAM or coverage file
///
#[derive(Debug)]
pub struct Sample {
    name: String,
    input: SampleInput,
}

impl Sample {
    pub fn new(name: String, input: SampleInput) -> Self {
        Self { name, input }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &SampleInput {
        &self.input
    }
}

/// Pair sample names with inputs.  If no names are given, samples are
/// numbered from 0 in input order.
pub fn make_sample_list(
    names: Option<Vec<String>>,
    inputs: Vec<SampleInput>,
) -> anyhow::Result<Vec<Sample>> {
    let names = match names {
        Some(v) => {
            if v.len() != inputs.len() {
                return Err(anyhow!(
                    "Number of sample names ({}) does not match number of input files ({})",
                    v.len(),
                    inputs.len()
                ));
            }
            v
        }
        None => (0..inputs.len()).map(|i| i.to_string()).collect(),
    };

    let mut seen = HashSet::new();
    for s in names.iter() {
        if s.is_empty() {
            return Err(anyhow!("Empty sample name"));
        }
        if !seen.insert(s.as_str()) {
            return Err(anyhow!("Sample name {} used more than once", s));
        }
    }

    let samples: Vec<_> = names
        .into_iter()
        .zip(inputs)
        .map(|(name, input)| {
            trace!("Sample {} input {}", name, input.path().display());
            Sample::new(name, input)
        })
        .collect();
    debug!("Found {} samples", samples.len());
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> Vec<SampleInput> {
        vec![
            SampleInput::Coverage(PathBuf::from("a.cov")),
            SampleInput::Coverage(PathBuf::from("b.cov")),
        ]
    }

    #[test]
    fn test_default_names() {
        let v = make_sample_list(None, inputs()).unwrap();
        assert_eq!(v[0].name(), "0");
        assert_eq!(v[1].name(), "1");
        assert_eq!(v[1].input().path(), Path::new("b.cov"));
    }

    #[test]
    fn test_given_names() {
        let names = vec!["leaf".to_owned(), "root".to_owned()];
        let v = make_sample_list(Some(names), inputs()).unwrap();
        assert_eq!(v[0].name(), "leaf");
        assert_eq!(v[1].name(), "root");
    }

    #[test]
    fn test_name_errors() {
        assert!(make_sample_list(Some(vec!["a".to_owned()]), inputs()).is_err());
        assert!(make_sample_list(Some(vec!["a".to_owned(), "a".to_owned()]), inputs()).is_err());
    }
}
