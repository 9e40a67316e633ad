//! quizsheet command-line entry point.
//!
//! Batch stages (`parse`, `append`, `convert`, `run`) and the question
//! service (`serve`) share one TOML configuration file; every path can be
//! overridden per command.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use quizsheet::{init_logging, serve, Pipeline, Settings, TracingReporter};

#[derive(Parser)]
#[command(
    name = "quizsheet",
    version,
    about = "Exam question pipeline: flat text to XLSX to JSON"
)]
struct Cli {
    /// Configuration file (defaults to ./quizsheet.toml when present)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a delimited text file and print the records as JSON
    Parse {
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Parse a text file and append new questions to the spreadsheet store
    Append {
        #[arg(long)]
        source: Option<PathBuf>,
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Convert spreadsheet rows into the JSON collection
    Convert {
        #[arg(long)]
        store: Option<PathBuf>,
        #[arg(long)]
        collection: Option<PathBuf>,
    },
    /// Run parse, append and convert in sequence
    Run {
        #[arg(long)]
        source: Option<PathBuf>,
        #[arg(long)]
        store: Option<PathBuf>,
        #[arg(long)]
        collection: Option<PathBuf>,
    },
    /// Serve the web app, the question collection and the client log endpoint
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long = "static-root")]
        static_root: Option<PathBuf>,
        #[arg(long)]
        questions: Option<PathBuf>,
    },
}

fn override_path(target: &mut PathBuf, value: Option<PathBuf>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn build_pipeline(settings: &Settings) -> Result<Pipeline> {
    settings
        .pipeline_builder()
        .with_reporter(Arc::new(TracingReporter))
        .build()
        .context("Invalid pipeline configuration")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let log_file = init_logging(&settings.logging).context("Failed to initialize logging")?;
    tracing::debug!("Logging to {}", log_file.display());

    match cli.command {
        Command::Parse { source } => {
            override_path(&mut settings.paths.source, source);
            let pipeline = build_pipeline(&settings)?;
            let records = pipeline.try_parse_file(&settings.paths.source)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Append { source, store } => {
            override_path(&mut settings.paths.source, source);
            override_path(&mut settings.paths.store, store);
            let pipeline = build_pipeline(&settings)?;

            let records = pipeline.try_parse_file(&settings.paths.source)?;
            let summary = pipeline
                .try_append(&records, &settings.paths.store)
                .with_context(|| {
                    format!("Failed to append to {}", settings.paths.store.display())
                })?;
            println!(
                "Appended {} questions ({} duplicates skipped)",
                summary.appended, summary.duplicates
            );
        }
        Command::Convert { store, collection } => {
            override_path(&mut settings.paths.store, store);
            override_path(&mut settings.paths.collection, collection);
            let pipeline = build_pipeline(&settings)?;

            let summary = pipeline
                .try_convert(&settings.paths.store, &settings.paths.collection)
                .context("Failed to convert questions")?;
            println!(
                "Added {} questions ({} duplicates, {} invalid rows skipped)",
                summary.added, summary.duplicates, summary.invalid
            );
        }
        Command::Run {
            source,
            store,
            collection,
        } => {
            override_path(&mut settings.paths.source, source);
            override_path(&mut settings.paths.store, store);
            override_path(&mut settings.paths.collection, collection);
            let pipeline = build_pipeline(&settings)?;

            let summary = pipeline.run(
                &settings.paths.source,
                &settings.paths.store,
                &settings.paths.collection,
            );
            println!(
                "Parsed {} questions, appended {} rows, added {} questions",
                summary.parsed, summary.appended, summary.added
            );
        }
        Command::Serve {
            bind,
            static_root,
            questions,
        } => {
            if let Some(bind) = bind {
                settings.server.bind = bind;
            }
            override_path(&mut settings.server.static_root, static_root);
            override_path(&mut settings.server.questions, questions);

            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime
                .block_on(serve(&settings, Arc::new(TracingReporter)))
                .context("Question service failed")?;
        }
    }

    Ok(())
}
