mod app;
mod targets;
mod triangles;

use anyhow::Context;
use clap::{Parser, Subcommand};
use range_kernel::ArenaConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::targets::TargetsDemo;
use crate::triangles::TrianglesDemo;

#[derive(Parser)]
#[command(name = "range-desktop", about = "OpenGL-style range demos on wgpu")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Arena tuning as JSON; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the target placement seed
    #[arg(short, long)]
    seed: Option<u64>,

    #[command(subcommand)]
    demo: Option<DemoKind>,
}

#[derive(Subcommand, Clone, Copy)]
enum DemoKind {
    /// Shoot the target (default)
    Targets,
    /// Two blended triangles under an orbiting camera
    Triangles,
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<ArenaConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ArenaConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ArenaConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

/// `RUST_LOG` directives win when set and valid; otherwise `--verbose`
/// picks between `debug` and `info`.
fn log_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(
            std::env::var("RUST_LOG").ok().as_deref(),
            cli.verbose,
        ))
        .init();

    match cli.demo.unwrap_or(DemoKind::Targets) {
        DemoKind::Targets => {
            let config = load_config(cli.config.as_deref(), cli.seed)?;
            tracing::info!(seed = config.seed, max_targets = config.max_targets, "starting targets");
            app::run(TargetsDemo::new(config)?)
        }
        DemoKind::Triangles => {
            tracing::info!("starting triangles");
            app::run(TrianglesDemo::new())
        }
    }
}
