use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use rand::Rng;
use text_file_tally::tally::Tally;

mod common;

#[test]
fn test_large_random_input_counts_every_key() -> Result<(), anyhow::Error> {
    common::setup();
    let keys = 20;
    let rows = 50_000;
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");

    let mut writer = BufWriter::new(File::create(&input_path)?);
    // make sure every key occurs at least once before the random tail
    for key in 0..keys {
        writeln!(writer, "value-{:02}", key)?;
    }
    let mut rng = rand::thread_rng();
    for _row in keys..rows {
        writeln!(writer, "value-{:02}", rng.gen_range(0..keys))?;
    }
    writer.flush()?;
    drop(writer);

    let mut tally = Tally::new(vec![input_path.clone()], output_path.clone());
    // hundreds of initial runs and more than one merge pass
    tally.with_buffer_lines(128);
    tally.with_tmp_dir(PathBuf::from("./target/results/"));
    tally.tally()?;

    let lines = common::read_lines(output_path.clone())?;
    assert_eq!(lines.len(), keys);

    let mut total: u64 = 0;
    let mut previous: Option<String> = None;
    for line in &lines {
        let (key, count) = line.split_once('\t').expect("line<TAB>count record");
        if let Some(previous_key) = &previous {
            assert!(previous_key.as_str() < key);
        }
        previous = Some(key.to_string());
        total += count.parse::<u64>()?;
    }
    assert_eq!(total, rows as u64);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    Ok(())
}
