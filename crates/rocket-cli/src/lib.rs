//! Rocket Command Line
//!
//! Fits a kernel set on a CSV panel, saves it with its normalisation setting, and
//! transforms CSV panels with the saved transform.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rocket_transform::{RocketConfig, RocketTransform};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod panel_io;
mod settings;

pub use panel_io::{read_panel, write_features};
pub use settings::{load_settings, LogSettings, Settings};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(author, version, about = "Random convolutional kernel transform for time series")]
pub struct Cli {
    /// Settings file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate kernels from a training panel and save them
    Fit {
        /// Training panel CSV
        #[arg(long)]
        input: PathBuf,
        /// Output kernel file
        #[arg(long)]
        output: PathBuf,
        /// First column holds a class label
        #[arg(long)]
        labelled: bool,
        /// Override the kernel count
        #[arg(long)]
        num_kernels: Option<usize>,
        /// Override the random seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Transform a panel with saved kernels
    Transform {
        /// Kernel file produced by `fit`
        #[arg(long)]
        kernels: PathBuf,
        /// Panel CSV to transform
        #[arg(long)]
        input: PathBuf,
        /// Output feature CSV
        #[arg(long)]
        output: PathBuf,
        /// First column holds a class label
        #[arg(long)]
        labelled: bool,
    },
    /// Print the effective settings as JSON
    ShowConfig,
}

/// Initialize logging to stderr
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let level: Level = settings
        .level
        .parse()
        .with_context(|| format!("invalid log level {:?}", settings.level))?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Run a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    init_logging(&settings.log)?;

    info!("=== Rocket v{} ===", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Fit {
            input,
            output,
            labelled,
            num_kernels,
            seed,
        } => {
            let mut config = settings.transform;
            if let Some(n) = num_kernels {
                config.num_kernels = n;
            }
            if seed.is_some() {
                config.random_state = seed;
            }
            run_fit(config, &input, &output, labelled)
        }
        Command::Transform {
            kernels,
            input,
            output,
            labelled,
        } => run_transform(settings.transform, &kernels, &input, &output, labelled),
        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

/// Fit kernels on `input` and write them to `output`
pub fn run_fit(config: RocketConfig, input: &Path, output: &Path, labelled: bool) -> Result<()> {
    let panel = read_panel(input, labelled)?;
    info!("Loaded {} training series from {}", panel.len(), input.display());

    let mut rocket = RocketTransform::new(config)?;
    rocket.fit(&panel)?;

    fs::write(output, rocket.to_bytes()?)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        "Saved {} kernels to {}",
        rocket.config().num_kernels,
        output.display()
    );
    Ok(())
}

/// Transform `input` with the transform saved at `kernels_path` and write features to `output`.
/// Normalisation follows the saved transform, not `config`.
pub fn run_transform(
    config: RocketConfig,
    kernels_path: &Path,
    input: &Path,
    output: &Path,
    labelled: bool,
) -> Result<()> {
    let bytes = fs::read(kernels_path)
        .with_context(|| format!("failed to read {}", kernels_path.display()))?;
    let rocket = RocketTransform::from_bytes(config, &bytes)?;

    let panel = read_panel(input, labelled)?;
    let features = rocket.transform(&panel)?;
    write_features(output, &features)?;

    info!(
        "Wrote {}x{} features to {}",
        features.nrows(),
        features.ncols(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_panel(rows: usize, length: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for r in 0..rows {
            let line: Vec<String> = (0..length)
                .map(|t| ((t as f64) * 0.2 + r as f64).sin().to_string())
                .collect();
            writeln!(file, "{},{}", r % 2, line.join(",")).unwrap();
        }
        file
    }

    #[test]
    fn test_fit_then_transform() {
        let train = write_panel(4, 40);
        let kernels = tempfile::NamedTempFile::new().unwrap();
        let features = tempfile::NamedTempFile::new().unwrap();

        run_fit(RocketConfig::seeded(25, 0), train.path(), kernels.path(), true).unwrap();
        run_transform(
            RocketConfig::default(),
            kernels.path(),
            train.path(),
            features.path(),
            true,
        )
        .unwrap();

        let back = read_panel(features.path(), false).unwrap();
        assert_eq!(back.len(), 4);
        assert!(back.iter().all(|row| row.len() == 50));
    }

    #[test]
    fn test_transform_rejects_wrong_length() {
        let train = write_panel(2, 40);
        let other = write_panel(2, 30);
        let kernels = tempfile::NamedTempFile::new().unwrap();
        let features = tempfile::NamedTempFile::new().unwrap();

        run_fit(RocketConfig::seeded(10, 0), train.path(), kernels.path(), true).unwrap();
        let err = run_transform(
            RocketConfig::default(),
            kernels.path(),
            other.path(),
            features.path(),
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Shape mismatch"));
    }

    #[test]
    fn test_transform_uses_fitted_normalisation() {
        let train = write_panel(3, 40);
        let kernels = tempfile::NamedTempFile::new().unwrap();
        let features = tempfile::NamedTempFile::new().unwrap();

        let fit_config = RocketConfig {
            normalise: false,
            ..RocketConfig::seeded(16, 2)
        };
        run_fit(fit_config.clone(), train.path(), kernels.path(), true).unwrap();
        run_transform(
            RocketConfig::default(),
            kernels.path(),
            train.path(),
            features.path(),
            true,
        )
        .unwrap();

        let panel = read_panel(train.path(), true).unwrap();
        let mut direct = RocketTransform::new(fit_config).unwrap();
        let expected = direct.fit_transform(&panel).unwrap();

        let written = read_panel(features.path(), false).unwrap();
        for (row, expected_row) in written.iter().zip(expected.rows()) {
            for (value, expected_value) in row.iter().zip(expected_row.iter()) {
                assert!((value - expected_value).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_init_logging_rejects_unknown_level() {
        let settings = LogSettings {
            level: "verbose".to_string(),
            json: false,
        };
        let err = init_logging(&settings).unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn test_cli_parses_fit() {
        let cli = Cli::try_parse_from([
            "rocket",
            "fit",
            "--input",
            "train.csv",
            "--output",
            "kernels.bin",
            "--num-kernels",
            "500",
            "--seed",
            "3",
        ])
        .unwrap();

        match cli.command {
            Command::Fit {
                num_kernels, seed, labelled, ..
            } => {
                assert_eq!(num_kernels, Some(500));
                assert_eq!(seed, Some(3));
                assert!(!labelled);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
