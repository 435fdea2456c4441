//! gazemap CLI — fit gaze calibrations and replay offset recordings.

mod documents;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use gazemap::{
    CalibrationSession, FitConfig, GazePredictor, PredictorConfig, DEFAULT_REGULARIZATION,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "gazemap")]
#[command(about = "Map pupil-glint offsets to smoothed screen gaze points")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a gaze model from a calibration document.
    Fit(CliFitArgs),

    /// Replay a recorded offset sequence through a fitted model.
    Predict(CliPredictArgs),

    /// Print the coefficients of a fitted model.
    ModelInfo {
        /// Path to the model document (JSON).
        #[arg(long)]
        model: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct CliFitArgs {
    /// Path to the calibration document (JSON).
    #[arg(long)]
    calibration: PathBuf,

    /// Path to write the fitted model (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Ridge regularization λ added to the normal-matrix diagonal.
    #[arg(long, default_value_t = DEFAULT_REGULARIZATION)]
    lambda: f64,
}

#[derive(Debug, Clone, Args)]
struct CliPredictArgs {
    /// Path to the model document (JSON).
    #[arg(long)]
    model: PathBuf,

    /// Path to the offset sequence, a JSON array of [dx, dy] pairs.
    #[arg(long)]
    deltas: PathBuf,

    /// Path to write emitted screen points (JSON). Printed to stdout if omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Screen width used as the upper X bound.
    #[arg(long, default_value = "1900")]
    screen_width: f64,

    /// Screen height used as the upper Y bound.
    #[arg(long, default_value = "1000")]
    screen_height: f64,

    /// Fraction of the remaining gap closed per sample, in (0, 1].
    #[arg(long, default_value = "0.1")]
    smoothing: f64,

    /// Also clamp predictions below at zero.
    #[arg(long)]
    clamp_to_origin: bool,
}

impl CliPredictArgs {
    fn to_config(&self) -> PredictorConfig {
        PredictorConfig {
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            smoothing_factor: self.smoothing,
            clamp_to_origin: self.clamp_to_origin,
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fit(args) => run_fit(&args),
        Commands::Predict(args) => run_predict(&args),
        Commands::ModelInfo { model } => run_model_info(&model),
    }
}

// ── fit ────────────────────────────────────────────────────────────────

fn run_fit(args: &CliFitArgs) -> CliResult<()> {
    tracing::info!("Loading calibration: {}", args.calibration.display());
    let doc = documents::load_calibration(&args.calibration)?;

    let mut session = CalibrationSession::new(FitConfig {
        regularization: args.lambda,
    });
    session.extend(doc.samples);
    let (model, report) = session.fit_with_report().map_err(|e| -> CliError {
        tracing::warn!("Calibration with {} samples rejected", session.len());
        format!("fit failed: {}", e).into()
    })?;

    tracing::info!(
        "Fitted {} samples (lambda={:e}): rms x={:.3} y={:.3}, max x={:.3} y={:.3}",
        report.n_samples,
        report.regularization,
        report.residuals_x.rms,
        report.residuals_y.rms,
        report.residuals_x.max_abs,
        report.residuals_y.max_abs,
    );

    documents::write_json(&args.out, &documents::ModelDocument::new(&model, Some(report)))?;
    tracing::info!("Model written to {}", args.out.display());
    Ok(())
}

// ── predict ────────────────────────────────────────────────────────────

fn run_predict(args: &CliPredictArgs) -> CliResult<()> {
    let model = documents::load_model(&args.model)?.model();
    let deltas = documents::load_deltas(&args.deltas)?;
    tracing::info!("Replaying {} offsets", deltas.len());

    let mut predictor = GazePredictor::new(model, args.to_config())?;
    let mut points = Vec::with_capacity(deltas.len());
    for (i, &[dx, dy]) in deltas.iter().enumerate() {
        let p = predictor
            .predict(dx, dy)
            .map_err(|e| -> CliError { format!("offset {}: {}", i, e).into() })?;
        points.push(p);
    }

    match &args.out {
        Some(path) => {
            documents::write_json(path, &points)?;
            tracing::info!("Gaze points written to {}", path.display());
        }
        None => {
            for [x, y] in &points {
                println!("{:.3}\t{:.3}", x, y);
            }
        }
    }
    Ok(())
}

// ── model-info ─────────────────────────────────────────────────────────

fn run_model_info(path: &std::path::Path) -> CliResult<()> {
    let doc = documents::load_model(path)?;
    let labels = ["dx", "dy", "dx*dy", "dx^2", "dy^2", "1"];

    println!("gazemap model {}", path.display());
    println!("  {:<8} {:>16} {:>16}", "term", "x", "y");
    for (i, label) in labels.iter().enumerate() {
        println!(
            "  {:<8} {:>16.6e} {:>16.6e}",
            label,
            doc.coeffs_x.to_array()[i],
            doc.coeffs_y.to_array()[i]
        );
    }

    if let Some(report) = doc.report {
        println!("  samples:        {}", report.n_samples);
        println!("  lambda:         {:e}", report.regularization);
        println!(
            "  rms residual:   x={:.3} y={:.3}",
            report.residuals_x.rms, report.residuals_y.rms
        );
    }
    Ok(())
}
