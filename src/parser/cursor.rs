//! Line-addressable view over a document.

/// Forward-only cursor over the lines of a document.
///
/// Lines are split on `\r\n`, `\n`, and lone `\r`. Line numbers are 1-based
/// and always refer to the line that would be consumed next.
#[derive(Debug, Clone)]
pub struct SourceCursor<'a> {
    lines: Vec<&'a str>,
    position: usize,
}

impl<'a> SourceCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        let lines = text
            .split('\n')
            .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
            .collect();
        Self { lines, position: 0 }
    }

    /// The current line with surrounding whitespace removed, or `None` at the end.
    ///
    /// Form feeds and vertical tabs count as whitespace, so a line made only of
    /// them is blank.
    pub fn current_line(&self) -> Option<&'a str> {
        self.raw_line().map(str::trim)
    }

    /// The current line exactly as written.
    pub fn raw_line(&self) -> Option<&'a str> {
        self.lines.get(self.position).copied()
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.lines.len()
    }

    pub fn line_number(&self) -> usize {
        self.position + 1
    }

    /// Returns the trimmed current line and advances past it.
    pub fn consume_line(&mut self) -> Option<&'a str> {
        self.consume_raw_line().map(str::trim)
    }

    /// Returns the untrimmed current line and advances past it.
    pub fn consume_raw_line(&mut self) -> Option<&'a str> {
        let line = self.raw_line()?;
        self.position += 1;
        Some(line)
    }
}
