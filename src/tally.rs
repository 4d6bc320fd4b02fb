use std::cmp::max;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use regex::Regex;
use rlimit::{getrlimit, setrlimit, Resource};

use crate::chunk::ChunkBuilder;
use crate::config::Config;
use crate::counter;
use crate::error::EmptyInput;
use crate::line_source::LineSource;
use crate::merge;
use crate::run::{Run, RunReader};

/// Sort a line-oriented text file of any size and count distinct lines.
///
/// The input is spilled to sorted temporary runs of at most `buffer_lines` lines, the runs are
/// merged in passes with fan-in `buffer_lines`, and the single remaining run is scanned once to
/// collapse consecutive duplicates into `(line, count)` records.
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use text_file_tally::tally::Tally;
///
/// fn count_words(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
///     let mut tally = Tally::new(vec![input], output);
///     // bound on lines held in memory; also the merge fan-in
///     tally.with_buffer_lines(50_000);
///     // set the directory for intermediate results. The default is the system temp dir -
///     // std::env::temp_dir(); for large files prefer a dedicated directory on the same
///     // file system as the output.
///     tally.with_tmp_dir(tmp);
///     tally.tally()
/// }
/// ```
pub struct Tally {
    input_files: Vec<PathBuf>,
    output: PathBuf,
    tmp: PathBuf,
    buffer_lines: usize,
    ignore_lines: Option<Regex>,
    separator: char,
}

impl Tally {
    /// Create a default Tally definition.
    ///
    /// * intermediate results go to std::env::temp_dir()
    /// * at most 100_000 lines are held in memory, and at most that many runs are merged at once
    /// * blank lines are skipped and never counted
    /// * no lines are ignored beyond blank ones
    /// * the output separator is a TAB ('\t')
    ///
    /// The implementation will increase the file descriptor rlimit to accommodate the configured
    /// merge fan-in.
    pub fn new(input_files: Vec<PathBuf>, output: PathBuf) -> Tally {
        Tally {
            input_files,
            output,
            tmp: std::env::temp_dir(),
            buffer_lines: 100_000,
            ignore_lines: None,
            separator: '\t',
        }
    }

    /// Set directory for intermediate files. By default use std::env::temp_dir()
    /// It is recommended for large files to create a dedicated directory for intermediate files
    /// on the same file system as the output target
    pub fn with_tmp_dir(&mut self, tmp: PathBuf) {
        self.tmp = tmp;
    }

    /// Set the number of lines held in memory at once. The same value bounds the merge fan-in
    /// and with it the number of simultaneously open run files. Must be at least 2; smaller
    /// values are rejected when an operation starts.
    pub fn with_buffer_lines(&mut self, buffer_lines: usize) {
        self.buffer_lines = buffer_lines;
    }

    /// Specify which lines to ignore. Each line matching the regex will be skipped on input and
    /// will not appear in the output or its counts.
    pub fn with_ignore_lines(&mut self, r: Regex) {
        self.ignore_lines = Some(r)
    }

    /// Set the separator written between a line and its count. The default is '\t'
    pub fn with_separator(&mut self, separator: char) {
        self.separator = separator
    }

    /// Sort the input files and write `line<separator>count` records for every distinct line,
    /// in sorted order, to the output path.
    ///
    /// Returns [EmptyInput] (wrapped in [anyhow::Error]) when the input has no countable lines.
    pub fn tally(&self) -> Result<(), anyhow::Error> {
        let config = self.create_config()?;
        let (current_soft, current_hard) = Self::get_rlimits()?;
        log::info!("Current rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
        let new_soft = max((config.buffer_lines() + 256) as u64, current_soft);
        log::info!("Set new rlimit NOFILE, soft: {}, hard: {}", new_soft, current_hard);
        Self::set_rlimits(new_soft, current_hard)?;
        self.internal_tally(&config)?;
        log::info!("Restore rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
        Self::set_rlimits(current_soft, current_hard)?;
        Ok(())
    }

    /// Like [Tally::tally], but write into a caller supplied sink, formatting every
    /// `(line, count)` pair with the caller supplied formatter. The output path configured on
    /// this Tally is not touched.
    pub fn tally_with<W, F>(&self, sink: &mut W, formatter: F) -> Result<(), anyhow::Error>
    where
        W: Write,
        F: Fn(&str, u64) -> String,
    {
        let config = self.create_config()?;
        let (current_soft, current_hard) = Self::get_rlimits()?;
        let new_soft = max((config.buffer_lines() + 256) as u64, current_soft);
        Self::set_rlimits(new_soft, current_hard)?;
        let final_run = Self::internal_sort(&self.input_files, &config)?;
        Self::count_run(final_run, sink, formatter)?;
        Self::set_rlimits(current_soft, current_hard)?;
        Ok(())
    }

    /// Sort the input files into the output path without counting. Every countable line of the
    /// input appears in the output exactly as often as it occurred.
    pub fn sort(&self) -> Result<(), anyhow::Error> {
        let config = self.create_config()?;
        let (current_soft, current_hard) = Self::get_rlimits()?;
        log::info!("Current rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
        let new_soft = max((config.buffer_lines() + 256) as u64, current_soft);
        log::info!("Set new rlimit NOFILE, soft: {}, hard: {}", new_soft, current_hard);
        Self::set_rlimits(new_soft, current_hard)?;
        let final_run = Self::internal_sort(&self.input_files, &config)?;
        let path = final_run.into_path();
        std::fs::rename(&path, &self.output)
            .with_context(|| anyhow!("Rename {} to {}", path.display(), self.output.display()))?;
        log::info!("Restore rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
        Self::set_rlimits(current_soft, current_hard)?;
        Ok(())
    }

    /// Verify that every input file is already sorted under the same filtering policy the sort
    /// applies.
    pub fn check(&self) -> Result<bool, anyhow::Error> {
        let config = self.create_config()?;

        let mut result = true;
        for path in &self.input_files {
            result = Self::internal_check(path, &config)?;
            if !result {
                break;
            }
        }
        Ok(result)
    }

    fn get_rlimits() -> Result<(u64, u64), anyhow::Error> {
        getrlimit(Resource::NOFILE).with_context(|| "getrlimit")
    }

    fn set_rlimits(soft: u64, hard: u64) -> Result<(), anyhow::Error> {
        setrlimit(Resource::NOFILE, soft, hard)
            .with_context(|| format!("set rlimit NOFILE, soft: {}, hard: {}", soft, hard))?;
        Ok(())
    }

    fn create_config(&self) -> Result<Config, anyhow::Error> {
        if self.buffer_lines < 2 {
            return Err(anyhow!(
                "buffer must hold at least 2 lines, got {}",
                self.buffer_lines
            ));
        }
        Ok(Config::new(
            self.tmp.clone(),
            "run-".to_string(),
            ".unmerged".to_string(),
            self.buffer_lines,
            self.ignore_lines.clone(),
            self.separator,
        ))
    }

    fn internal_tally(&self, config: &Config) -> Result<(), anyhow::Error> {
        let final_run = Self::internal_sort(&self.input_files, config)?;
        let output = File::create(&self.output)
            .with_context(|| format!("path: {}", self.output.display()))?;
        let mut writer = BufWriter::new(output);
        let separator = config.separator();
        let distinct = Self::count_run(final_run, &mut writer, |line, count| {
            format!("{}{}{}\n", line, separator, count)
        })?;
        log::info!("Wrote {} distinct lines to {}", distinct, self.output.display());
        Ok(())
    }

    fn count_run<W, F>(final_run: Run, sink: &mut W, formatter: F) -> Result<usize, anyhow::Error>
    where
        W: Write,
        F: Fn(&str, u64) -> String,
    {
        let mut reader = RunReader::open(final_run.path())?;
        let counted = counter::write_counts(&mut reader, sink, formatter);
        drop(reader);
        // the final run is spent either way; reclaim it before reporting a counting failure
        let removed = final_run.remove();
        let distinct = counted?;
        removed?;
        Ok(distinct)
    }

    pub(crate) fn internal_sort(input_files: &[PathBuf], config: &Config) -> Result<Run, anyhow::Error> {
        log::info!("Start external sort of {} input file(s)", input_files.len());
        let mut builder = ChunkBuilder::new(config);
        for path in input_files {
            let file = File::open(path).with_context(|| format!("path: {}", path.display()))?;
            let mut source = LineSource::new(BufReader::new(file), config.ignore_lines().clone());
            builder.consume(&mut source)?;
        }
        let mut runs = builder.finish()?;
        if runs.is_empty() {
            return Err(anyhow::Error::new(EmptyInput));
        }

        let mut generation = 1;
        while runs.len() > 1 {
            let next = merge::merge_pass(&runs, generation, config)?;
            // two-phase cleanup: the previous generation is removed only after the complete
            // replacement generation exists
            let superseded = std::mem::replace(&mut runs, next);
            Self::destroy_runs(superseded)?;
            generation += 1;
        }
        log::info!("External sort finished after {} merge pass(es)", generation - 1);
        runs.pop().ok_or_else(|| anyhow!("merge loop ended without a final run"))
    }

    fn destroy_runs(runs: Vec<Run>) -> Result<(), anyhow::Error> {
        for run in runs {
            run.remove()?;
        }
        Ok(())
    }

    pub(crate) fn internal_check(path: &PathBuf, config: &Config) -> Result<bool, anyhow::Error> {
        let file = File::open(path).with_context(|| format!("path: {}", path.display()))?;
        let mut source = LineSource::new(BufReader::new(file), config.ignore_lines().clone());
        let mut previous: Option<String> = None;
        while let Some(line) = source.next_line()? {
            if let Some(previous_line) = &previous {
                if previous_line > &line {
                    return Ok(false);
                }
            }
            previous = Some(line);
        }
        Ok(true)
    }
}
