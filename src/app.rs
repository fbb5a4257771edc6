//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves settings
//! - initializes logging
//! - dispatches to the server, the one-shot predictor, or the TUI

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::cli::{ArtifactArgs, Command, OptionsArgs, PredictArgs, ServeArgs};
use crate::client::ApiClient;
use crate::config::{Settings, parse_bind_addr};
use crate::error::AppError;
use crate::io::{ArtifactKind, ArtifactStore, FsArtifactStore, load_artifacts};
use crate::server::PredictServer;
use crate::service::{self, CategoryOptions, PredictResponse};

pub mod pipeline;

use pipeline::PredictPipeline;

/// Entry point for the `gem` binary.
pub fn run() -> Result<(), AppError> {
    // `gem` with no subcommand opens the interactive client.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let settings = Settings::from_env()?;

    if !matches!(cli.command, Command::Tui(_)) {
        crate::logging::init(&settings.log_filter);
    }

    match cli.command {
        Command::Serve(args) => handle_serve(args, &settings),
        Command::Predict(args) => handle_predict(args, &settings),
        Command::Options(args) => handle_options(args),
        Command::Check(args) => handle_check(&args, &settings),
        Command::Tui(args) => crate::tui::run(args, &settings),
    }
}

/// Artifact store for the given overrides, falling back to settings.
pub fn artifact_store(args: &ArtifactArgs, settings: &Settings) -> FsArtifactStore {
    FsArtifactStore::new(
        args.model.clone().unwrap_or_else(|| settings.model_path.clone()),
        args.preprocessor
            .clone()
            .unwrap_or_else(|| settings.preprocessor_path.clone()),
    )
}

fn handle_serve(args: ServeArgs, settings: &Settings) -> Result<(), AppError> {
    let bind_addr = match &args.addr {
        Some(raw) => parse_bind_addr(raw)?,
        None => settings.bind_addr,
    };

    let pipeline = Arc::new(PredictPipeline::new(artifact_store(&args.artifacts, settings)));
    if args.eager {
        pipeline.load()?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::new(4, format!("Failed to start async runtime: {e}")))?;

    info!(%bind_addr, eager = args.eager, "starting prediction API");
    runtime.block_on(PredictServer::new(pipeline, bind_addr).run(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
        }
    }))
}

fn handle_predict(args: PredictArgs, settings: &Settings) -> Result<(), AppError> {
    let record = args.to_record();

    let response = match &args.api_url {
        Some(url) => ApiClient::new(url.clone())?.predict(&record)?,
        None => {
            let pipeline = PredictPipeline::new(artifact_store(&args.artifacts, settings));
            service::respond(&pipeline, record)
        }
    };

    if args.json {
        let text = serde_json::to_string_pretty(&response)
            .map_err(|e| AppError::new(4, format!("Failed to encode response: {e}")))?;
        println!("{text}");
    } else if response.is_success() {
        println!("{}", crate::report::format_response(&response));
    }

    match response {
        PredictResponse::Success { .. } => Ok(()),
        PredictResponse::Error { error_kind, message } => Err(AppError::new(error_kind.exit_code(), message)),
    }
}

fn handle_options(args: OptionsArgs) -> Result<(), AppError> {
    let options = CategoryOptions::current();
    if args.json {
        let text = serde_json::to_string_pretty(&options)
            .map_err(|e| AppError::new(4, format!("Failed to encode options: {e}")))?;
        println!("{text}");
    } else {
        print!("{}", crate::report::format_options(&options));
    }
    Ok(())
}

fn handle_check(args: &ArtifactArgs, settings: &Settings) -> Result<(), AppError> {
    let store = artifact_store(args, settings);
    let artifacts = load_artifacts(&store)?;
    print!(
        "{}",
        crate::report::format_artifact_summary(
            &artifacts,
            &store.location(ArtifactKind::Model),
            &store.location(ArtifactKind::Preprocessor),
        )
    );
    Ok(())
}

/// Rewrite argv so `gem` defaults to `gem tui`.
///
/// Rules:
/// - `gem`                      -> `gem tui`
/// - `gem --local ...`          -> `gem tui --local ...`
/// - `gem --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["gem"])), argv(&["gem", "tui"]));
        assert_eq!(rewrite_args(argv(&["gem", "--local"])), argv(&["gem", "tui", "--local"]));
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["gem", "serve"])), argv(&["gem", "serve"]));
        assert_eq!(rewrite_args(argv(&["gem", "--help"])), argv(&["gem", "--help"]));
    }

    #[test]
    fn artifact_overrides_win_over_settings() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        let args = ArtifactArgs {
            model: Some("custom/model.json".into()),
            preprocessor: None,
        };
        let store = artifact_store(&args, &settings);
        assert_eq!(store.path(ArtifactKind::Model), std::path::Path::new("custom/model.json"));
        assert_eq!(store.path(ArtifactKind::Preprocessor), settings.preprocessor_path.as_path());
    }
}
