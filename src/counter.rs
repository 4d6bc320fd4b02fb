use std::io::Write;

use anyhow::Context;

use crate::run::RunReader;

/// Scan a sorted run and emit `(line, count)` for every group of consecutive equal lines.
///
/// The pending pair is flushed once more after the scan; without that the last distinct line
/// would be dropped. Returns the number of distinct lines emitted.
pub(crate) fn write_counts<W, F>(
    reader: &mut RunReader,
    sink: &mut W,
    formatter: F,
) -> Result<usize, anyhow::Error>
where
    W: Write,
    F: Fn(&str, u64) -> String,
{
    let mut previous: Option<String> = None;
    let mut occurrences: u64 = 0;
    let mut distinct: usize = 0;

    while let Some(line) = reader.next_line()? {
        match &previous {
            Some(prev) if *prev == line => {
                occurrences += 1;
            }
            Some(prev) => {
                sink.write_all(formatter(prev, occurrences).as_bytes())
                    .with_context(|| "write counted line")?;
                distinct += 1;
                previous = Some(line);
                occurrences = 1;
            }
            None => {
                previous = Some(line);
                occurrences = 1;
            }
        }
    }
    if let Some(prev) = &previous {
        sink.write_all(formatter(prev, occurrences).as_bytes())
            .with_context(|| "write counted line")?;
        distinct += 1;
    }
    sink.flush().with_context(|| "flush counted output")?;
    Ok(distinct)
}
