//! Command-line parsing for the gemstone price predictor.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! **command dispatch** (`app`) and from the inference code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::RawRecord;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gem", version, about = "Gemstone price prediction service and client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the prediction API over HTTP.
    Serve(ServeArgs),
    /// Predict the price of one stone (in-process, or via `--api-url`).
    Predict(PredictArgs),
    /// Print the categorical option sets and advisory numeric ranges.
    Options(OptionsArgs),
    /// Load and validate the model/preprocessor pair, then print a summary.
    Check(ArtifactArgs),
    /// Launch the interactive terminal client.
    Tui(TuiArgs),
}

/// Artifact location overrides (default: settings from the environment).
#[derive(Debug, Args, Clone, Default)]
pub struct ArtifactArgs {
    /// Model artifact (JSON).
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Preprocessor artifact (JSON).
    #[arg(long, value_name = "JSON")]
    pub preprocessor: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Address to bind, e.g. `0.0.0.0:8000`.
    #[arg(long)]
    pub addr: Option<String>,

    /// Load artifacts before accepting requests instead of on first use.
    #[arg(long)]
    pub eager: bool,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Weight in carats.
    #[arg(long, allow_negative_numbers = true)]
    pub carat: f64,

    /// Depth percentage.
    #[arg(long, allow_negative_numbers = true)]
    pub depth: f64,

    /// Table percentage.
    #[arg(long, allow_negative_numbers = true)]
    pub table: f64,

    /// Length in mm.
    #[arg(long, allow_negative_numbers = true)]
    pub x: f64,

    /// Width in mm.
    #[arg(long, allow_negative_numbers = true)]
    pub y: f64,

    /// Height in mm.
    #[arg(long, allow_negative_numbers = true)]
    pub z: f64,

    /// Cut quality (Fair, Good, Very Good, Premium, Ideal).
    #[arg(long)]
    pub cut: String,

    /// Color grade (D best .. J).
    #[arg(long)]
    pub color: String,

    /// Clarity grade (I1, SI2, SI1, VS2, VS1, VVS2, VVS1, IF).
    #[arg(long)]
    pub clarity: String,

    /// Send the record to a running API instead of predicting in-process.
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Print the JSON response envelope.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

impl PredictArgs {
    pub fn to_record(&self) -> RawRecord {
        RawRecord {
            carat: self.carat,
            depth: self.depth,
            table: self.table,
            x: self.x,
            y: self.y,
            z: self.z,
            cut: self.cut.clone(),
            color: self.color.clone(),
            clarity: self.clarity.clone(),
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct OptionsArgs {
    /// Print as JSON (same shape as `GET /options`).
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    /// Run inference in-process instead of calling the API.
    #[arg(long)]
    pub local: bool,

    /// API base URL (default: `GEM_API_URL` or `http://localhost:8000`).
    #[arg(long, value_name = "URL", conflicts_with = "local")]
    pub api_url: Option<String>,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}
