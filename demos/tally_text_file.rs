use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Error;
use simple_logger::SimpleLogger;
use text_file_tally::tally::Tally;

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn create_word_file(path: &PathBuf, lines: usize) -> Result<(), Error> {
    let words = ["lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit"];
    let mut writer = BufWriter::new(File::create(path)?);
    for i in 0..lines {
        writeln!(writer, "{}", words[(i * 7) % words.len()])?;
    }
    writer.flush()?;
    Ok(())
}

// cargo run -r --example tally_text_file
pub fn main() -> Result<(), Error> {
    SimpleLogger::new().init()?;

    let input_path = PathBuf::from("./target/demo-words.dat");
    let output_path = PathBuf::from("./target/demo-tally.tsv");
    create_word_file(&input_path, 100_000)?;

    let mut tally = Tally::new(vec![input_path.clone()], output_path.clone());
    tally.with_buffer_lines(4096);
    tally.with_tmp_dir(PathBuf::from("./target/"));
    tally.tally()?;

    let result = fs::read_to_string(&output_path)?;
    println!("{}", result);
    Ok(())
}
