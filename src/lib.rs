//! This crate sorts line-oriented text files that do not fit in memory and reports each distinct
//! line together with the number of times it occurs.
//!
//! The input is consumed once, split into bounded in-memory chunks that are sorted and spilled to
//! temporary files, and the resulting sorted runs are merged in passes of bounded fan-in until a
//! single sorted run remains. A final counting pass collapses consecutive duplicate lines into
//! `line<separator>count` records. Memory use is bounded by the configured number of buffered
//! lines, and the number of simultaneously open temporary files is bounded by the same value.
//!
//! The original motivation was producing occurrence statistics for multi-gigabyte log and word
//! list files on machines with little memory.
//!
//! # Examples
//! ```
//! use std::path::PathBuf;
//! use text_file_tally::tally::Tally;
//!
//! fn count_occurrences(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
//!     let mut tally = Tally::new(vec![input], output);
//!     // lines held in memory at once; also the merge fan-in. Must be at least 2.
//!     tally.with_buffer_lines(100_000);
//!     // set the directory for intermediate results. The default is the system temp dir -
//!     // std::env::temp_dir(), however, for large files it is recommended to provide a dedicated
//!     // directory for intermediate files, preferably on the same file system as the output result.
//!     tally.with_tmp_dir(tmp);
//!     tally.tally()
//! }
//! ```

pub(crate) mod config;
pub(crate) mod line_source;
pub(crate) mod run;
pub(crate) mod chunk;
pub(crate) mod merge;
pub(crate) mod counter;

pub mod error;
pub mod tally;
