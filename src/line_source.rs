use std::io::BufRead;

use anyhow::Context;
use regex::Regex;

/// Sequential reader over a line-oriented byte stream.
///
/// All input filtering happens here and nowhere else: blank lines are skipped, and lines matching
/// the optional ignore pattern are skipped. Later stages can rely on every line they see being
/// countable.
pub(crate) struct LineSource<R: BufRead> {
    reader: R,
    ignore_lines: Option<Regex>,
}

impl<R: BufRead> LineSource<R> {
    pub(crate) fn new(reader: R, ignore_lines: Option<Regex>) -> LineSource<R> {
        LineSource {
            reader,
            ignore_lines,
        }
    }

    /// The next countable line, with the terminator stripped, or None at end of input.
    pub(crate) fn next_line(&mut self) -> Result<Option<String>, anyhow::Error> {
        loop {
            let mut line = String::new();
            let bytes = self.reader.read_line(&mut line).with_context(|| "read from input")?;
            if bytes == 0 {
                return Ok(None);
            }
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            if line.is_empty() {
                continue;
            }
            if let Some(r) = &self.ignore_lines {
                if r.is_match(&line) {
                    continue;
                }
            }
            return Ok(Some(line));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use regex::Regex;

    use crate::line_source::LineSource;

    fn drain(source: &mut LineSource<Cursor<&[u8]>>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = source.next_line().unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_blank_lines_skipped() {
        let input: &[u8] = b"alpha\n\n\nbeta\n\ngamma\n";
        let mut source = LineSource::new(Cursor::new(input), None);
        assert_eq!(drain(&mut source), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_crlf_and_missing_final_terminator() {
        let input: &[u8] = b"alpha\r\nbeta\r\ngamma";
        let mut source = LineSource::new(Cursor::new(input), None);
        assert_eq!(drain(&mut source), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_ignore_lines() {
        let input: &[u8] = b"# comment\nalpha\n# another\nbeta\n";
        let mut source = LineSource::new(Cursor::new(input), Some(Regex::new("^#").unwrap()));
        assert_eq!(drain(&mut source), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_empty_input() {
        let input: &[u8] = b"";
        let mut source = LineSource::new(Cursor::new(input), None);
        assert_eq!(source.next_line().unwrap(), None);
    }
}
