use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use tempfile::Builder;

use crate::config::Config;

/// A sealed, internally sorted run backed by a temporary file.
///
/// A run is written once, read start-to-end by the next merge pass or by the counting pass, and
/// removed once a later generation supersedes it.
#[derive(Debug)]
pub(crate) struct Run {
    path: PathBuf,
    lines: usize,
}

impl Run {
    pub(crate) fn path(&self) -> &PathBuf {
        &self.path
    }

    pub(crate) fn lines(&self) -> usize {
        self.lines
    }

    /// Reclaim the backing storage.
    pub(crate) fn remove(self) -> Result<(), anyhow::Error> {
        std::fs::remove_file(&self.path)
            .with_context(|| format!("remove run file, path: {}", self.path.display()))
    }

    /// Release the backing file to the caller without removing it.
    pub(crate) fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Writes a new run for `(generation, sequence)`. The file name carries both numbers so every
/// pass gets its own name space in the tmp directory.
pub(crate) struct RunWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: usize,
}

impl RunWriter {
    pub(crate) fn create(generation: usize, sequence: usize, config: &Config) -> Result<RunWriter, anyhow::Error> {
        let tmp_file = Builder::new()
            .prefix(&format!("{}{}-{}-", config.tmp_prefix(), generation, sequence))
            .suffix(config.tmp_suffix())
            .tempfile_in(config.tmp())
            .with_context(|| format!("create run file in {}", config.tmp().display()))?;
        let (file, path) = tmp_file
            .keep()
            .map_err(|e| anyhow!("persist run file: {}", e))?;
        Ok(RunWriter {
            path,
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    pub(crate) fn push_line(&mut self, line: &str) -> Result<(), anyhow::Error> {
        writeln!(self.writer, "{}", line)
            .with_context(|| format!("write to run file, path: {}", self.path.display()))?;
        self.lines += 1;
        Ok(())
    }

    pub(crate) fn seal(mut self) -> Result<Run, anyhow::Error> {
        self.writer
            .flush()
            .with_context(|| format!("flush run file, path: {}", self.path.display()))?;
        Ok(Run {
            path: self.path,
            lines: self.lines,
        })
    }
}

/// Sequential reader over a run, buffering the current head line for merge ordering.
#[derive(Debug)]
pub(crate) struct RunReader {
    path: PathBuf,
    reader: BufReader<File>,
    head: Option<String>,
}

impl RunReader {
    pub(crate) fn open(path: &Path) -> Result<RunReader, anyhow::Error> {
        let file = File::open(path).with_context(|| format!("path: {}", path.display()))?;
        let mut run_reader = RunReader {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            head: None,
        };
        run_reader.head = run_reader.fetch()?;
        Ok(run_reader)
    }

    fn fetch(&mut self) -> Result<Option<String>, anyhow::Error> {
        let mut line = String::new();
        let bytes = self
            .reader
            .read_line(&mut line)
            .with_context(|| format!("read run file, path: {}", self.path.display()))?;
        if bytes == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Return the current head line and advance, or None when the run is exhausted.
    pub(crate) fn next_line(&mut self) -> Result<Option<String>, anyhow::Error> {
        let next = self.fetch()?;
        Ok(std::mem::replace(&mut self.head, next))
    }
}

impl Eq for RunReader {}

impl PartialEq<Self> for RunReader {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head
    }
}

impl PartialOrd<Self> for RunReader {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RunReader {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.head, &other.head) {
            (None, None) => Ordering::Equal,
            // none > some so exhausted runs pop from BinaryHeap first
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            // flipped to make the std max-heap behave as a min-heap on the head line
            (Some(own), Some(theirs)) => theirs.cmp(own),
        }
    }
}
