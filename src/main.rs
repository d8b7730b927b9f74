use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::bail;
use log::debug;

pub mod dat;
pub mod plot;
pub mod power;
pub mod rssi;

#[derive(Parser)]
#[command(
    name = "cc2500-tools",
    version,
    about = "Post-processing tools for cc2500 sensor testbed energy logs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the firmware RSSI lookup table and its power report
    #[command(allow_negative_numbers = true)]
    RssiTable {
        /// Target received power in dBm
        #[arg(long, default_value_t = rssi::DEFAULT_TARGET_DBM)]
        target_dbm: f64,
        /// Reference transmit power in dBm
        #[arg(long, default_value_t = rssi::DEFAULT_TX_POWER_DBM)]
        tx_power_dbm: f64,
    },
    /// Convert energy-log CSV files to space-delimited .dat files
    ///
    /// Takes the file list from the arguments, or from stdin when none are
    /// given (sample usage: find . | cc2500-tools csv2dat).
    Csv2dat {
        /// Input files; paths without a .csv extension are skipped
        files: Vec<PathBuf>,
    },
    /// Chart energies.csv files with gnuplot
    ///
    /// Takes the file list from the arguments, or from stdin when none are
    /// given (sample usage: find data/ | cc2500-tools plot).
    Plot {
        /// Input files; anything not named energies.csv is skipped
        files: Vec<PathBuf>,
        /// Write tmp/<run>.dat and tmp/<run>.scr but do not run gnuplot
        #[arg(long)]
        no_render: bool,
    },
    /// Look up PATABLE register settings by output power
    #[command(allow_negative_numbers = true)]
    Power {
        /// Desired output power in dBm; prints the closest setting
        #[arg(long)]
        dbm: Option<f64>,
        /// Register setting (hex, e.g. 0xFF); prints its output power
        #[arg(long, value_parser = parse_setting)]
        setting: Option<u8>,
    },
}

/// Entry point: install the error/log hooks + dispatch the chosen tool.
fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match Cli::parse().command {
        Commands::RssiTable {
            target_dbm,
            tx_power_dbm,
        } => cmd_rssi_table(target_dbm, tx_power_dbm),
        Commands::Csv2dat { files } => cmd_csv2dat(files),
        Commands::Plot { files, no_render } => cmd_plot(files, no_render),
        Commands::Power { dbm, setting } => cmd_power(dbm, setting),
    }
}

fn cmd_rssi_table(target_dbm: f64, tx_power_dbm: f64) -> Result<()> {
    let table = rssi::RssiTable::new();
    println!("{}", table.firmware_literal());
    let rows = table.power_report(target_dbm, tx_power_dbm);
    rssi::write_report(io::stdout().lock(), &rows)
}

fn cmd_csv2dat(files: Vec<PathBuf>) -> Result<()> {
    for path in gather(files, dat::is_csv)? {
        dat::convert_file(&path)?;
    }
    Ok(())
}

fn cmd_plot(files: Vec<PathBuf>, no_render: bool) -> Result<()> {
    for path in gather(files, plot::is_energy_log)? {
        plot::plot_file(&path, !no_render)?;
    }
    Ok(())
}

fn cmd_power(dbm: Option<f64>, setting: Option<u8>) -> Result<()> {
    match (dbm, setting) {
        (Some(dbm), None) => {
            let (setting, actual) = power::closest_setting(dbm);
            println!("0x{setting:02X} -> {actual:+.1} dBm");
        }
        (None, Some(setting)) => match power::setting_to_dbm(setting) {
            Some(dbm) => println!("0x{setting:02X} -> {dbm:+.1} dBm"),
            None => bail!("setting 0x{setting:02X} is not in the PA table"),
        },
        _ => bail!("pass exactly one of --dbm or --setting"),
    }
    Ok(())
}

/// Use the given paths, or read a newline-separated list from stdin when
/// none were passed. Paths rejected by `keep` are skipped.
fn gather(files: Vec<PathBuf>, keep: fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let candidates = if files.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .map(|line| line.map(PathBuf::from))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        files
    };
    let mut kept = Vec::new();
    for path in candidates {
        if keep(&path) {
            kept.push(path);
        } else {
            debug!("skipping {}", path.display());
        }
    }
    Ok(kept)
}

fn parse_setting(s: &str) -> Result<u8, String> {
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(hex, 16).map_err(|e| format!("invalid register setting {s:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn register_settings_parse_as_hex() {
        assert_eq!(parse_setting("0xFF"), Ok(0xFF));
        assert_eq!(parse_setting("a4"), Ok(0xA4));
        assert!(parse_setting("0x100").is_err());
        assert!(parse_setting("zz").is_err());
    }
}
