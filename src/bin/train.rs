use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use monopoly_mc::ai::{MonteCarloAgent, ValueStore};
use monopoly_mc::checkpoint::CheckpointManager;
use monopoly_mc::config::AppConfig;
use monopoly_mc::training::{ExecutionMode, JsonlSink, NoopSink, StepLogSink, Trainer};

/// Train the Monte Carlo buy/pass agent via self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train a Monopoly buy/pass agent with first-visit Monte Carlo")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override exploration rate
    #[arg(long)]
    epsilon: Option<f64>,

    /// Override the base random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override episodes per parallel batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Override worker thread count (0 = all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Learn after every episode instead of in parallel batches
    #[arg(long)]
    sequential: bool,

    /// Write every step of every episode to this JSONL file
    #[arg(long)]
    log_jsonl: Option<PathBuf>,

    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml().context("serializing default config")?);
        return Ok(());
    }

    // Load configuration
    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(episodes) = cli.episodes {
        app_config.training.num_episodes = episodes;
    }
    if let Some(epsilon) = cli.epsilon {
        app_config.agent.epsilon = epsilon;
    }
    if let Some(seed) = cli.seed {
        app_config.training.seed = seed;
    }
    if let Some(batch_size) = cli.batch_size {
        app_config.training.batch_size = batch_size;
    }
    if let Some(threads) = cli.threads {
        app_config.training.num_threads = threads;
    }
    if cli.sequential {
        app_config.training.mode = ExecutionMode::Sequential;
    }
    app_config.validate().context("validating configuration")?;

    let manager = CheckpointManager::new(app_config.checkpoint.clone());
    let (mut store, start_episode) = if cli.resume {
        resume_store(&manager)
    } else {
        (ValueStore::new(), 0)
    };

    let trainer = Trainer::new(
        app_config.training.clone(),
        app_config.game,
        MonteCarloAgent::new(app_config.agent.epsilon),
    )
    .with_checkpoints(manager)
    .resume_from(start_episode);

    let mut sink: Box<dyn StepLogSink> = match &cli.log_jsonl {
        Some(path) => Box::new(
            JsonlSink::create(path)
                .with_context(|| format!("creating step log {}", path.display()))?,
        ),
        None => Box::new(NoopSink),
    };

    let summary = trainer
        .train(&mut store, sink.as_mut())
        .context("training failed")?;

    println!(
        "Trained {} episodes ({} aborted) in {:.1}s",
        summary.episodes,
        summary.aborted,
        summary.elapsed.as_secs_f64()
    );
    println!("  table entries:    {}", summary.table_size);
    println!("  eval win rate:    {:.1}%", summary.eval_win_rate * 100.0);
    println!("  bankruptcy rate:  {:.1}%", summary.bankruptcy_rate * 100.0);
    println!("  avg episode len:  {:.1}", summary.average_episode_length);
    println!("  avg return:       {:.1}", summary.average_return);
    println!("  buy rate:         {:.1}%", summary.buy_rate * 100.0);
    if let Some(path) = &summary.last_checkpoint {
        println!("  last checkpoint:  {}", path.display());
    }
    Ok(())
}

/// Load the latest checkpoint, or start fresh when there is none.
fn resume_store(manager: &CheckpointManager) -> (ValueStore, usize) {
    match manager.load_latest() {
        Ok(data) => {
            info!(
                episode = data.metadata.episode,
                table = data.store.len(),
                path = %data.path.display(),
                "resumed from checkpoint"
            );
            (data.store, data.metadata.episode)
        }
        Err(e) => {
            warn!(error = %e, "no checkpoint found, starting fresh");
            (ValueStore::new(), 0)
        }
    }
}
