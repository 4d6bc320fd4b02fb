use std::collections::BinaryHeap;

use crate::config::Config;
use crate::run::{Run, RunReader, RunWriter};

/// Merge one generation into the next: consecutive groups of at most `buffer_lines` runs are
/// each merged into a single run. The input runs are left on disk; the orchestrator removes the
/// whole superseded generation only after the complete pass has been built, so an interrupted
/// pass never destroys runs that groups later in the pass still need.
pub(crate) fn merge_pass(runs: &[Run], generation: usize, config: &Config) -> Result<Vec<Run>, anyhow::Error> {
    let mut next = Vec::new();
    for (sequence, group) in runs.chunks(config.buffer_lines()).enumerate() {
        next.push(merge_group(group, generation, sequence, config)?);
    }
    log::info!(
        "Merge pass {}: {} runs merged into {}, {} lines",
        generation,
        runs.len(),
        next.len(),
        next.iter().map(Run::lines).sum::<usize>()
    );
    Ok(next)
}

/// Merge a group of sorted runs into one sorted run via a min-priority-queue keyed on each
/// reader's head line. At most `group.len()` readers are open at once.
pub(crate) fn merge_group(
    group: &[Run],
    generation: usize,
    sequence: usize,
    config: &Config,
) -> Result<Run, anyhow::Error> {
    let mut writer = RunWriter::create(generation, sequence, config)?;
    let mut readers: BinaryHeap<RunReader> = BinaryHeap::with_capacity(group.len());
    for run in group {
        readers.push(RunReader::open(run.path())?);
    }

    while readers.len() > 1 {
        let mut current = match readers.pop() {
            Some(reader) => reader,
            None => break,
        };
        let mut exhausted = false;
        // comparison operators are flipped to work with BinaryHeap (Max Heap)
        while readers.peek().map_or(true, |next_best| &current >= next_best) {
            match current.next_line()? {
                Some(line) => writer.push_line(&line)?,
                None => {
                    exhausted = true;
                    break;
                }
            }
        }
        if !exhausted {
            readers.push(current);
        }
    }
    if let Some(mut last) = readers.pop() {
        while let Some(line) = last.next_line()? {
            writer.push_line(&line)?;
        }
    }
    writer.seal()
}
