use anyhow::Result;
use clap::{Parser, Subcommand};
use fingerprint_core::config;
use fingerprint_core::pipeline::{self, PipelineSummary};
use fingerprint_core::progress::LogSink;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "fingerprint", about = "Content fingerprinting engine")]
struct Cli {
    /// Path to a config file (defaults to config/default.*).
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate a root and fingerprint every file found.
    Run {
        root: PathBuf,
        /// Extra exclude globs, on top of the config's.
        #[arg(long)]
        exclude: Vec<String>,
        /// Override the batch width (max concurrently open files).
        #[arg(long)]
        concurrency: Option<usize>,
        /// Emit the full result as JSON instead of a summary line.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            root,
            exclude,
            concurrency,
            json,
        } => {
            cfg.scan.exclude.extend(exclude);
            if let Some(k) = concurrency {
                cfg.engine.batch_size = k;
            }

            let outcome = pipeline::run(&cfg, &root, Arc::new(LogSink)).await?;
            let summary = PipelineSummary::of(&outcome);

            if json {
                let mut files: Vec<_> = outcome.files.values().collect();
                files.sort_by(|a, b| a.path.cmp(&b.path));
                let mut failures: Vec<_> = outcome
                    .failures
                    .iter()
                    .map(|(path, err)| {
                        serde_json::json!({ "path": path, "error": err.to_string() })
                    })
                    .collect();
                failures.sort_by_key(|v| v["path"].as_str().map(str::to_owned));
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "summary": summary,
                        "files": files,
                        "failures": failures,
                    }))?
                );
            } else {
                println!(
                    "fingerprinted {} of {} files ({} failed)",
                    summary.fingerprinted, summary.discovered, summary.failed
                );
            }
            Ok(())
        }
    }
}
