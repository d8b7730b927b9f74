//! Energy-log CSV to gnuplot .dat conversion.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use color_eyre::Result;
use log::info;

/// Sampling rate of the testbed energy logs, in Hz.
pub const SAMPLE_RATE_HZ: f64 = 5.0;

/// True for paths the converter accepts.
#[must_use]
pub fn is_csv(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "csv")
}

/// Turn CSV rows into space-delimited rows with a leading time column at
/// [`SAMPLE_RATE_HZ`]. Fields pass through unmodified. Returns the number
/// of rows written.
pub fn convert<R: Read, W: Write>(input: R, out: &mut W) -> Result<u64> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut rows = 0u64;
    for record in reader.records() {
        let record = record?;
        write!(out, "{:.1} ", rows as f64 / SAMPLE_RATE_HZ)?;
        for field in record.iter() {
            write!(out, "{field} ")?;
        }
        writeln!(out)?;
        rows += 1;
    }
    Ok(rows)
}

/// Convert `<name>.csv` into a sibling `<name>.dat`, returning its path.
pub fn convert_file(path: &Path) -> Result<PathBuf> {
    info!("Processing {}", path.display());
    let out_path = path.with_extension("dat");
    let input = File::open(path)?;
    let mut out = BufWriter::new(File::create(&out_path)?);
    convert(input, &mut out)?;
    out.flush()?;
    Ok(out_path)
}
