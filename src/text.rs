/// Longest line kept while waiting for its newline
pub const MAX_LINE_LEN: usize = 64;

/// Decodes newline-delimited ASCII integers from arbitrary byte chunks.
///
/// A line split across two reads is completed on the next call. Empty
/// lines are skipped; lines that are not decimal integers are counted as
/// rejected and dropped. A line longer than `MAX_LINE_LEN` is discarded up
/// to its newline and counted once.
#[derive(Debug, Default)]
pub struct LineDecoder {
    partial: Vec<u8>,
    overflowed: bool,
    rejected: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every complete sample it finished
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<i32> {
        let mut samples = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (line, tail) = rest.split_at(pos);
            rest = &tail[1..];

            if self.overflowed || self.partial.len() + line.len() > MAX_LINE_LEN {
                self.drop_line();
                continue;
            }

            let parsed = if self.partial.is_empty() {
                parse_line(line)
            } else {
                self.partial.extend_from_slice(line);
                let line = std::mem::take(&mut self.partial);
                parse_line(&line)
            };
            self.tally(parsed, &mut samples);
        }

        if !self.overflowed {
            if self.partial.len() + rest.len() > MAX_LINE_LEN {
                self.partial.clear();
                self.overflowed = true;
            } else {
                self.partial.extend_from_slice(rest);
            }
        }
        samples
    }

    /// Decode whatever is left once the stream has ended
    pub fn finish(&mut self) -> Option<i32> {
        if self.overflowed {
            self.drop_line();
            return None;
        }
        let line = std::mem::take(&mut self.partial);
        let mut samples = Vec::new();
        self.tally(parse_line(&line), &mut samples);
        samples.pop()
    }

    /// Number of malformed lines dropped so far
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Bytes held for a line that has not seen its newline yet
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.partial.len()
    }

    fn drop_line(&mut self) {
        self.partial.clear();
        self.overflowed = false;
        self.rejected += 1;
    }

    fn tally(&mut self, parsed: Option<Result<i32, ()>>, samples: &mut Vec<i32>) {
        match parsed {
            Some(Ok(sample)) => samples.push(sample),
            Some(Err(())) => self.rejected += 1,
            None => {}
        }
    }
}

/// `None` for a blank line, `Some(Err)` for garbage
fn parse_line(line: &[u8]) -> Option<Result<i32, ()>> {
    let text = line.trim_ascii();
    if text.is_empty() {
        return None;
    }
    let parsed = std::str::from_utf8(text)
        .ok()
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or(());
    Some(parsed)
}
