use std::io::BufRead;

use crate::config::Config;
use crate::line_source::LineSource;
use crate::run::{Run, RunWriter};

/// Builds generation 0: consumes line sources, accumulating at most `buffer_lines` lines at a
/// time, sorting each full buffer in place and spilling it as a sorted run.
pub(crate) struct ChunkBuilder<'a> {
    config: &'a Config,
    buffer: Vec<String>,
    runs: Vec<Run>,
    sequence: usize,
}

impl<'a> ChunkBuilder<'a> {
    pub(crate) fn new(config: &'a Config) -> ChunkBuilder<'a> {
        ChunkBuilder {
            config,
            buffer: Vec::with_capacity(config.buffer_lines()),
            runs: Vec::new(),
            sequence: 0,
        }
    }

    /// Consume one input source to the end. May be called once per input file.
    pub(crate) fn consume<R: BufRead>(&mut self, source: &mut LineSource<R>) -> Result<(), anyhow::Error> {
        while let Some(line) = source.next_line()? {
            self.buffer.push(line);
            if self.buffer.len() >= self.config.buffer_lines() {
                self.flush()?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), anyhow::Error> {
        // verbatim comparison, stability is irrelevant
        self.buffer.sort_unstable();
        let mut writer = RunWriter::create(0, self.sequence, self.config)?;
        for line in self.buffer.drain(..) {
            writer.push_line(&line)?;
        }
        self.runs.push(writer.seal()?);
        self.sequence += 1;
        Ok(())
    }

    /// Spill the remaining partial buffer, if any, and yield the generation 0 run set.
    pub(crate) fn finish(mut self) -> Result<Vec<Run>, anyhow::Error> {
        if !self.buffer.is_empty() {
            self.flush()?;
        }
        log::info!("Chunking produced {} sorted runs", self.runs.len());
        Ok(self.runs)
    }
}
