use std::io::BufRead;

/// Single sequence record from a FASTA file
pub struct FastaRecord {
    name: String,
    seq: Vec<u8>,
}

impl FastaRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seq(&self) -> &[u8] {
        &self.seq
    }

    pub fn into_seq(self) -> Vec<u8> {
        self.seq
    }
}

/// FastaReader
///
/// Iterator over the records of a FASTA file.  Sequence lines are
/// concatenated with surrounding white space removed; blank lines are skipped.
///
pub struct FastaReader<R> {
    rdr: R,
    buf: String,
    line: usize,
    // Name of record currently being read
    current: Option<String>,
    seq: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            line: 0,
            current: None,
            seq: Vec::new(),
            finished: false,
        }
    }

    fn take_record(&mut self, next: Option<String>) -> Option<FastaRecord> {
        let name = std::mem::replace(&mut self.current, next)?;
        Some(FastaRecord {
            name,
            seq: std::mem::take(&mut self.seq),
        })
    }

    fn next_record(&mut self) -> anyhow::Result<Option<FastaRecord>> {
        loop {
            self.buf.clear();
            if self.rdr.read_line(&mut self.buf)? == 0 {
                self.finished = true;
                return Ok(self.take_record(None));
            }
            self.line += 1;
            let l = self.buf.trim();
            if let Some(s) = l.strip_prefix('>') {
                // Names are only used for messages, so an empty name is accepted
                let name = s.split_ascii_whitespace().next().unwrap_or("").to_owned();
                if let Some(rec) = self.take_record(Some(name)) {
                    return Ok(Some(rec));
                }
            } else if !l.is_empty() {
                if self.current.is_none() {
                    return Err(anyhow!(
                        "Sequence data before first header at line {}",
                        self.line
                    ));
                }
                self.seq.extend_from_slice(l.as_bytes())
            }
        }
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = anyhow::Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            None
        } else {
            let res = self.next_record();
            if res.is_err() {
                self.finished = true
            }
            res.transpose()
        }
    }
}
