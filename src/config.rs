use std::path::PathBuf;

use regex::Regex;

#[derive(Clone)]
pub(crate) struct Config {
    tmp: PathBuf,
    tmp_prefix: String,
    tmp_suffix: String,
    buffer_lines: usize,
    ignore_lines: Option<Regex>,
    separator: char,
}

impl Config {
    pub(crate) fn new(
        tmp: PathBuf,
        tmp_prefix: String,
        tmp_suffix: String,
        buffer_lines: usize,
        ignore_lines: Option<Regex>,
        separator: char,
    ) -> Config {
        Config {
            tmp,
            tmp_prefix,
            tmp_suffix,
            buffer_lines,
            ignore_lines,
            separator,
        }
    }

    pub(crate) fn tmp(&self) -> &PathBuf {
        &self.tmp
    }

    pub(crate) fn tmp_prefix(&self) -> &String {
        &self.tmp_prefix
    }

    pub(crate) fn tmp_suffix(&self) -> &String {
        &self.tmp_suffix
    }

    /// Lines held in memory at once. Doubles as the merge fan-in.
    pub(crate) fn buffer_lines(&self) -> usize {
        self.buffer_lines
    }

    pub(crate) fn ignore_lines(&self) -> &Option<Regex> {
        &self.ignore_lines
    }

    pub(crate) fn separator(&self) -> char {
        self.separator
    }
}
