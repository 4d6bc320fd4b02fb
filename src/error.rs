use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reported when the input yields zero countable lines.
///
/// An input that consists only of blank lines (or of lines removed by the configured ignore
/// pattern) produces no sorted runs and therefore has no sorted result. This is surfaced as a
/// named error rather than an empty output file; callers that prefer empty-result semantics can
/// recover it with [anyhow::Error::downcast_ref].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyInput;

impl Display for EmptyInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "input contains no countable lines")
    }
}

impl Error for EmptyInput {}
