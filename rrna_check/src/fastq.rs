use std::io::BufRead;

/// FastqReader
///
/// Iterator over the sequences of a FASTQ file.  Records are 4 lines
/// (header, sequence, separator, quality); only the sequence is returned.
/// Record framing is checked and any inconsistency is reported as an error
/// giving the line number of the start of the offending record.
///
pub struct FastqReader<R> {
    rdr: R,
    lines: [Vec<u8>; 4],
    line: usize,
    finished: bool,
}

fn trim_eol(v: &mut Vec<u8>) {
    while matches!(v.last(), Some(b'\n' | b'\r')) {
        v.pop();
    }
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(rdr: R) -> Self {
        Self {
            rdr,
            lines: Default::default(),
            line: 0,
            finished: false,
        }
    }

    fn read_line(&mut self, ix: usize) -> anyhow::Result<bool> {
        let buf = &mut self.lines[ix];
        buf.clear();
        if self.rdr.read_until(b'\n', buf)? == 0 {
            Ok(false)
        } else {
            self.line += 1;
            trim_eol(buf);
            Ok(true)
        }
    }

    fn next_record(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        // Skip blank lines between records (i.e., at the end of the file)
        loop {
            if !self.read_line(0)? {
                return Ok(None);
            }
            if !self.lines[0].is_empty() {
                break;
            }
        }
        let start = self.line;
        if self.lines[0][0] != b'@' {
            return Err(anyhow!(
                "Invalid FASTQ header at line {}: expected '@'",
                start
            ));
        }
        for ix in 1..4 {
            if !self.read_line(ix)? {
                return Err(anyhow!("Truncated FASTQ record starting at line {}", start));
            }
        }
        if !self.lines[2].starts_with(b"+") {
            return Err(anyhow!(
                "Invalid FASTQ separator for record starting at line {}: expected '+'",
                start
            ));
        }
        if self.lines[1].len() != self.lines[3].len() {
            return Err(anyhow!(
                "Sequence and quality lengths differ for record starting at line {}",
                start
            ));
        }
        Ok(Some(std::mem::take(&mut self.lines[1])))
    }
}

impl<R: BufRead> Iterator for FastqReader<R> {
    type Item = anyhow::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            None
        } else {
            let res = self.next_record();
            if !matches!(res, Ok(Some(_))) {
                self.finished = true
            }
            res.transpose()
        }
    }
}
