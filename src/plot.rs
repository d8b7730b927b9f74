//! Gnuplot chart generation for testbed energy logs.
//!
//! Each run directory holds one `energies.csv`; the chart shows the average
//! power drawn by the network plus one series per end device, rendered to
//! `plots/svg/` and `plots/png/`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Local;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use log::info;

use crate::dat;

/// End devices logged per run, one plotted series each.
pub const MAX_DEVICES: usize = 8;

/// Energy logs must use this exact name; anything else is skipped.
pub const ENERGY_LOG_NAME: &str = "energies.csv";

#[must_use]
pub fn is_energy_log(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == ENERGY_LOG_NAME)
}

/// Name a run after the directory holding its energy log.
#[must_use]
pub fn run_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .or_else(|| path.file_stem())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("energies"))
}

/// Gnuplot commands charting the run's average and per-device power.
#[must_use]
pub fn gnuplot_script(run: &str, dat_path: &Path) -> String {
    let dat = dat_path.display();
    let mut script = format!("# gnuplot script for '{dat}'\n");
    script.push_str(&format!(
        "# generated {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    script.push_str(&format!("set title '{run}'\n"));
    script.push_str("set xlabel 'Time (s)'\n");
    script.push_str("set ylabel 'Power Used (mW)'\n");
    script.push_str(&format!(
        "plot '{dat}' using 1:2 with lines title 'Average'\n"
    ));
    for ed in 1..=MAX_DEVICES {
        script.push_str(&format!(
            "replot '{dat}' using 1:{} with lines title 'ED{ed}'\n",
            ed + 2
        ));
    }
    script.push_str("set terminal svg size 640,480\n");
    script.push_str(&format!("set output 'plots/svg/{run}.svg'\n"));
    script.push_str("replot\n");
    script.push_str("set terminal png size 640,480\n");
    script.push_str(&format!("set output 'plots/png/{run}.png'\n"));
    script.push_str("replot\n");
    script
}

/// Chart one energy log: write `tmp/<run>.dat` and `tmp/<run>.scr`, then
/// hand the script to gnuplot unless rendering is turned off.
pub fn plot_file(path: &Path, render: bool) -> Result<()> {
    info!("Processing {}", path.display());
    let run = run_name(path);
    fs::create_dir_all("tmp")?;
    fs::create_dir_all("plots/svg")?;
    fs::create_dir_all("plots/png")?;

    let dat_path = PathBuf::from(format!("tmp/{run}.dat"));
    let input = File::open(path)?;
    let mut out = BufWriter::new(File::create(&dat_path)?);
    dat::convert(input, &mut out)?;
    out.flush()?;

    let script_path = PathBuf::from(format!("tmp/{run}.scr"));
    fs::write(&script_path, gnuplot_script(&run, &dat_path))?;

    if render {
        run_gnuplot(&script_path)?;
    }
    Ok(())
}

fn run_gnuplot(script: &Path) -> Result<()> {
    let status = Command::new("gnuplot").arg(script).status()?;
    if !status.success() {
        return Err(eyre!("gnuplot exited with {status}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_is_named_after_the_log_directory() {
        assert_eq!(run_name(Path::new("data/run7/energies.csv")), "run7");
        assert_eq!(run_name(Path::new("./energies.csv")), "energies");
        assert_eq!(run_name(Path::new("energies.csv")), "energies");
    }

    #[test]
    fn only_exactly_named_logs_are_plotted() {
        assert!(is_energy_log(Path::new("data/run7/energies.csv")));
        assert!(!is_energy_log(Path::new("data/run7/energies2.csv")));
        assert!(!is_energy_log(Path::new("data/run7/run.csv")));
    }

    #[test]
    fn script_plots_average_and_every_device() {
        let script = gnuplot_script("run7", Path::new("tmp/run7.dat"));
        assert!(script.contains("set title 'run7'\n"));
        assert!(script.contains("set xlabel 'Time (s)'\n"));
        assert!(script.contains("set ylabel 'Power Used (mW)'\n"));
        assert!(script.contains("plot 'tmp/run7.dat' using 1:2 with lines title 'Average'\n"));
        for ed in 1..=MAX_DEVICES {
            let series = format!(
                "replot 'tmp/run7.dat' using 1:{} with lines title 'ED{ed}'\n",
                ed + 2
            );
            assert!(script.contains(&series), "missing series ED{ed}");
        }
        assert_eq!(script.matches("replot\n").count(), 2);
    }

    #[test]
    fn script_renders_svg_and_png() {
        let script = gnuplot_script("run7", Path::new("tmp/run7.dat"));
        assert!(script.contains("set terminal svg size 640,480\n"));
        assert!(script.contains("set output 'plots/svg/run7.svg'\n"));
        assert!(script.contains("set terminal png size 640,480\n"));
        assert!(script.contains("set output 'plots/png/run7.png'\n"));
    }
}
