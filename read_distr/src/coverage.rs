use std::{
    collections::HashMap,
    io::BufRead,
    path::Path,
    sync::Arc,
};

use anyhow::Context;
use compress_io::compress::CompressIo;
use utils::get_next_line;

use crate::config::Contig;

/// CoverageMap
///
/// Per base read depth for each contig.  The vector for a contig has one entry
/// per position from 1 up to the last position reported for that contig
/// (index 0 holds position 1).  Positions not present in the input have depth 0.
///
#[derive(Default, Debug)]
pub struct CoverageMap {
    ctgs: HashMap<Contig, Vec<u32>>,
}

impl CoverageMap {
    pub fn get(&self, ctg: &str) -> Option<&[u32]> {
        self.ctgs.get(ctg).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.ctgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctgs.is_empty()
    }

    fn store(&mut self, ctg: Contig, v: Vec<u32>) {
        trace!("Storing coverage for {} ({} positions)", ctg, v.len());
        self.ctgs.insert(ctg, v);
    }
}

/// Depths are integers, but are also accepted in floating point form (i.e., 5.0)
fn parse_depth(s: &str) -> anyhow::Result<u32> {
    match s.parse::<u32>() {
        Ok(z) => Ok(z),
        Err(e) => match s.parse::<f64>() {
            Ok(z) if z >= 0.0 && z <= u32::MAX as f64 && z.fract() == 0.0 => Ok(z as u32),
            _ => Err(anyhow!("Invalid depth {}: {}", s, e)),
        },
    }
}

/// Read coverage from a stream of tab separated (contig, position, depth) lines.
///
/// Lines for a contig must be contiguous and positions must be strictly
/// increasing within a contig; anything else is an error.  `name` is used in
/// error messages.
pub fn read_coverage<R: BufRead>(mut rdr: R, name: &str) -> anyhow::Result<CoverageMap> {
    let mut buf = String::new();
    let mut line = 0;
    let mut cov = CoverageMap::default();
    let mut current: Option<(Contig, Vec<u32>)> = None;

    while let Some(fields) = get_next_line(&mut rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines from {}", line, name))?
    {
        line += 1;
        // Skip blank lines
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }
        if fields.len() < 3 {
            return Err(anyhow!(
                "{}:{} Expected 3 columns (contig, position, depth), found {}",
                name,
                line,
                fields.len()
            ));
        }
        let ctg = fields[0];
        let x = fields[1]
            .parse::<usize>()
            .with_context(|| format!("{}:{} Error reading position", name, line))?;
        let z = parse_depth(fields[2]).with_context(|| {
            format!(
                "{}:{} Error reading depth (expected a non-negative integer)",
                name, line
            )
        })?;
        if x == 0 {
            return Err(anyhow!("{}:{} Positions should be 1 based", name, line));
        }

        if !matches!(&current, Some((c, _)) if c.as_ref() == ctg) {
            if let Some((c, v)) = current.take() {
                cov.store(c, v)
            }
            if cov.get(ctg).is_some() {
                return Err(anyhow!(
                    "{}:{} Contig {} seen again after data from another contig; input must be sorted",
                    name,
                    line,
                    ctg
                ));
            }
            trace!("Reading coverage for {}", ctg);
            current = Some((Arc::from(ctg), Vec::new()));
        }
        if let Some((_, v)) = current.as_mut() {
            if x <= v.len() {
                return Err(anyhow!(
                    "{}:{} Position {} for {} is not after previous position {}; input must be sorted",
                    name,
                    line,
                    x,
                    ctg,
                    v.len()
                ));
            }
            // Zero fill any gap
            v.resize(x - 1, 0);
            v.push(z);
        }
    }
    if let Some((c, v)) = current.take() {
        cov.store(c, v)
    }

    debug!(
        "Finished reading {} lines from {}; coverage for {} contigs",
        line,
        name,
        cov.len()
    );
    Ok(cov)
}

/// Read coverage file (possibly compressed)
pub fn read_coverage_file(p: &Path) -> anyhow::Result<CoverageMap> {
    trace!("Opening coverage file {} for reading", p.display());
    let rdr = CompressIo::new()
        .path(p)
        .bufreader()
        .with_context(|| format!("Could not open coverage file {}", p.display()))?;
    read_coverage(rdr, &p.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(s: &str) -> anyhow::Result<CoverageMap> {
        read_coverage(s.as_bytes(), "test")
    }

    #[test]
    fn test_gap_is_zero_filled() {
        let cov = read("chr1\t1\t5\nchr1\t3\t7\n").unwrap();
        assert_eq!(cov.get("chr1").unwrap(), &[5, 0, 7]);
    }

    #[test]
    fn test_leading_gap_and_contig_switch() {
        let cov = read("chr1\t2\t1\nchr1\t3\t2\n\nchr2\t4\t9\nchrM\t1\t0\n").unwrap();
        assert_eq!(cov.len(), 3);
        assert_eq!(cov.get("chr1").unwrap(), &[0, 1, 2]);
        assert_eq!(cov.get("chr2").unwrap(), &[0, 0, 0, 9]);
        assert_eq!(cov.get("chrM").unwrap(), &[0]);
        assert!(cov.get("chr3").is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(read("").unwrap().is_empty());
    }

    #[test]
    fn test_unsorted_positions() {
        let e = read("chr1\t1\t5\nchr1\t3\t7\nchr1\t2\t1\n").unwrap_err();
        assert!(e.to_string().contains("test:3"));
        assert!(read("chr1\t1\t5\nchr1\t1\t7\n").is_err());
    }

    #[test]
    fn test_contig_not_contiguous() {
        let e = read("chr1\t1\t5\nchr2\t1\t7\nchr1\t2\t1\n").unwrap_err();
        assert!(e.to_string().contains("test:3"));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(read("chr1\t1\n").is_err());
        assert!(read("chr1\tx\t1\n").is_err());
        assert!(read("chr1\t1\t-1\n").is_err());
        assert!(read("chr1\t0\t1\n").is_err());
        let e = read("chr1\t1\t2.5\n").unwrap_err();
        assert!(format!("{:#}", e).contains("non-negative integer"));
    }

    #[test]
    fn test_integral_float_depths() {
        let cov = read("chr1\t1\t5.0\nchr1\t2\t0.0\nchr1\t3\t12\n").unwrap();
        assert_eq!(cov.get("chr1").unwrap(), &[5, 0, 12]);
        assert!(read("chr1\t1\t-1.0\n").is_err());
        assert!(read("chr1\t1\tnan\n").is_err());
    }
}
