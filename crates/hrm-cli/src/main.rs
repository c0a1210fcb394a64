use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hrm_lib::{
    condition,
    detectors::{BeatDetector, CorrelationDetector, ThresholdDetector},
    io::csv as csv_io,
    warn::LogSink,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "hrm",
    version,
    about = "HRM: heart-rate metrics from two-column ECG recordings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Strategy {
    /// Adaptive moving-average thresholding
    Threshold,
    /// Self-correlation against a one-period template
    Correlation,
}

impl Strategy {
    fn detector(self, window_factor: f64) -> Box<dyn BeatDetector> {
        match self {
            Strategy::Threshold => Box::new(ThresholdDetector { window_factor }),
            Strategy::Correlation => Box::new(CorrelationDetector),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and emit the metrics record as JSON
    Analyze {
        /// CSV recording with time,voltage rows
        #[arg(long)]
        input: PathBuf,
        /// Write the record here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value = "threshold")]
        strategy: Strategy,
        /// Moving-average window width relative to the sampling frequency
        #[arg(long, default_value_t = 0.5)]
        window_factor: f64,
    },
    /// Detect beats and emit their sample indices and times as JSON
    FindBeats {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "threshold")]
        strategy: Strategy,
        #[arg(long, default_value_t = 0.5)]
        window_factor: f64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            input,
            out,
            strategy,
            window_factor,
        } => cmd_analyze(&input, out.as_deref(), strategy, window_factor)?,
        Commands::FindBeats {
            input,
            strategy,
            window_factor,
        } => cmd_find_beats(&input, strategy, window_factor)?,
    }
    Ok(())
}

fn cmd_analyze(
    input: &Path,
    out: Option<&Path>,
    strategy: Strategy,
    window_factor: f64,
) -> Result<()> {
    let mut sink = LogSink;
    let recording = csv_io::load_recording(input, &mut sink)?;
    let detector = strategy.detector(window_factor);
    let metrics = hrm_lib::analyze(&recording, detector.as_ref(), &mut sink)?;
    let js = serde_json::to_string(&metrics)?;
    match out {
        Some(path) => {
            fs::write(path, js).with_context(|| format!("writing {}", path.display()))?
        }
        None => println!("{}", js),
    }
    Ok(())
}

fn cmd_find_beats(input: &Path, strategy: Strategy, window_factor: f64) -> Result<()> {
    let mut sink = LogSink;
    let recording = csv_io::load_recording(input, &mut sink)?;
    let fs_hz = condition::sampling_frequency(&recording.time)?;
    let filtered = condition::smooth(&recording.voltage)?;
    let detector = strategy.detector(window_factor);
    let beats = detector.detect(&filtered, fs_hz)?;
    let times: Vec<f64> = beats.indices.iter().map(|&i| recording.time[i]).collect();
    let js = serde_json::to_string(&serde_json::json!({
        "indices": beats.indices,
        "times": times,
    }))?;
    println!("{}", js);
    Ok(())
}
