use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use range_kernel::{Arena, ArenaConfig};
use range_render::{DebugTextRenderer, RenderView, Renderer};
use range_render_wgpu::OrbitCamera;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "range-cli", about = "Headless runner for the shooting range")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and default tuning
    Info,
    /// Run the arena without a window, firing at the nearest target
    Simulate {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// RNG seed for target placement
        #[arg(short, long)]
        seed: Option<u64>,
        /// Launch a fireball every N ticks (0 never fires)
        #[arg(short, long, default_value = "30")]
        fire_every: u64,
        /// Arena tuning as JSON
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the orbit camera path
    Orbit {
        /// Number of orbit steps
        #[arg(short, long, default_value = "1440")]
        ticks: u64,
        /// Print every Nth step
        #[arg(short, long, default_value = "90")]
        every: u64,
    },
}

/// Where the headless shooter stands.
const MUZZLE: Vec3 = Vec3::new(0.0, 0.0, 5.0);

fn simulate(config: ArenaConfig, ticks: u64, fire_every: u64) -> anyhow::Result<Arena> {
    let mut arena = Arena::new(config)?;
    for _ in 0..ticks {
        if fire_every > 0 && arena.tick() % fire_every == 0 {
            let aim = arena
                .targets()
                .iter()
                .map(|t| t.position)
                .min_by(|a, b| a.distance(MUZZLE).total_cmp(&b.distance(MUZZLE)))
                .unwrap_or(Vec3::ZERO);
            let direction = aim - MUZZLE;
            arena
                .launch(MUZZLE, direction)
                .context("aim collapsed onto the muzzle")?;
        }
        let report = arena.step();
        for (fireball, target) in &report.hits {
            tracing::info!(tick = arena.tick(), %fireball, %target, "hit");
        }
    }
    Ok(arena)
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

    match cli.command {
        Commands::Info => {
            let defaults = ArenaConfig::default();
            println!("range-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", range_render::crate_info());
            println!(
                "arena: tick_rate={} spawn_interval={}s max_targets={} hit_radius={}",
                defaults.tick_rate, defaults.spawn_interval, defaults.max_targets, defaults.hit_radius
            );
        }
        Commands::Simulate {
            ticks,
            seed,
            fire_every,
            config,
        } => {
            let mut cfg = match config {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    ArenaConfig::from_json(&text)?
                }
                None => ArenaConfig::default(),
            };
            if let Some(seed) = seed {
                cfg.seed = seed;
            }
            println!("Simulating: seed={}, ticks={ticks}, fire_every={fire_every}", cfg.seed);

            let arena = simulate(cfg, ticks, fire_every)?;
            let view = RenderView {
                eye: MUZZLE,
                ..RenderView::default()
            };
            print!("{}", DebugTextRenderer::new().render(&arena, &view));

            let stats = arena.stats();
            println!(
                "Shots: {}, hits: {}, state hash: {:#018x}",
                stats.shots,
                stats.hits,
                arena.state_hash()
            );
        }
        Commands::Orbit { ticks, every } => {
            let mut camera = OrbitCamera::default();
            let every = every.max(1);
            for i in 0..=ticks {
                if i % every == 0 {
                    let eye = camera.eye();
                    println!(
                        "step {i:>5}  axis={:?}  angle={:.4}  eye=({:+.3}, {:+.3}, {:+.3})",
                        camera.axis(),
                        camera.angle,
                        eye.x,
                        eye.y,
                        eye.z
                    );
                }
                camera.advance();
            }
        }
    }

    Ok(())
}
