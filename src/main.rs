use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use monopoly_mc::ai::{MonteCarloAgent, Policy, RandomAgent, ValueStore};
use monopoly_mc::checkpoint::CheckpointManager;
use monopoly_mc::config::AppConfig;
use monopoly_mc::game::{square, StepLog, TurnEvent};
use monopoly_mc::training::{play_episode, EpisodeConfig, JsonlSink, StepLogSink};

/// Play one demo game: the learned policy as player 0 against random seats.
#[derive(Parser)]
#[command(name = "monopoly-mc", about = "Watch the learned buy/pass policy play one game")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Load this checkpoint directory instead of the latest one
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Random seed for the demo game
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Stop after this many steps
    #[arg(long)]
    max_steps: Option<usize>,

    /// Print raw JSONL step logs instead of a narrated game
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    let store = load_store(&cli, &app_config)?;
    let episode = EpisodeConfig {
        game: app_config.game,
        max_steps: cli.max_steps.unwrap_or(app_config.training.max_episode_steps),
        record_logs: true,
    };

    let greedy = MonteCarloAgent::greedy();
    let random = RandomAgent::new();
    let seats: Vec<&dyn Policy> = (0..episode.game.num_players)
        .map(|player| if player == 0 { &greedy as &dyn Policy } else { &random })
        .collect();

    let lineup: Vec<String> = seats
        .iter()
        .enumerate()
        .map(|(player, seat)| format!("P{player}: {}", seat.name()))
        .collect();

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let trace = play_episode(0, &episode, &seats, &store, &mut rng).context("playing demo game")?;

    if cli.json {
        let mut sink = JsonlSink::new(std::io::stdout().lock());
        sink.record_episode(0, &trace.logs).context("writing step logs")?;
        sink.flush().context("writing step logs")?;
        return Ok(());
    }

    println!("Seats: {}", lineup.join(", "));
    for log in &trace.logs {
        println!("{}", narrate(log));
    }

    println!();
    match trace.result.bankrupt_player {
        Some(p) => println!("Player {p} went bankrupt after {} steps.", trace.result.length),
        None => println!("Stopped after {} steps.", trace.result.length),
    }
    for player in trace.final_state.players() {
        println!(
            "  P{}: cash {:>6}, {} properties",
            player.id,
            player.cash,
            trace.final_state.owned_count(player.id)
        );
    }
    match trace.result.winner {
        Some(p) => println!("Leader: player {p}"),
        None => println!("No player left standing."),
    }
    Ok(())
}

fn load_store(cli: &Cli, app_config: &AppConfig) -> Result<ValueStore> {
    let manager = CheckpointManager::new(app_config.checkpoint.clone());
    let loaded = match &cli.checkpoint {
        Some(dir) => Some(
            manager
                .load_checkpoint(dir)
                .with_context(|| format!("loading checkpoint {}", dir.display()))?,
        ),
        None => match manager.load_latest() {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(error = %e, "no checkpoint loaded, player 0 plays an untrained table");
                None
            }
        },
    };
    Ok(match loaded {
        Some(data) => {
            info!(
                episode = data.metadata.episode,
                table = data.store.len(),
                "loaded checkpoint"
            );
            data.store
        }
        None => ValueStore::new(),
    })
}

fn narrate(log: &StepLog) -> String {
    let mut line = format!(
        "[{:>3}] P{} {} rolled {}+{} -> {}",
        log.step,
        log.player,
        square(log.position_before).name,
        log.dice.first,
        log.dice.second,
        square(log.position_after).name,
    );
    line.push_str(&format!(
        " | cash {} -> {} | {:?} | reward {:+.0}",
        log.cash_before, log.cash_after, log.action, log.reward
    ));
    for event in &log.events {
        line.push_str("\n        ");
        line.push_str(&describe(event));
    }
    line
}

fn describe(event: &TurnEvent) -> String {
    match *event {
        TurnEvent::StayedInJail { jail_turns } => format!("stays in jail (turn {jail_turns})"),
        TurnEvent::LeftJailByDoubles => "rolls doubles and leaves jail".to_string(),
        TurnEvent::LeftJailByFee { fee } => format!("pays ${fee} to leave jail"),
        TurnEvent::PassedGo { credit } => format!("passes GO, collects ${credit}"),
        TurnEvent::DrewCard { deck, name } => format!("draws {deck:?}: {name}"),
        TurnEvent::SentToJail => "goes to jail".to_string(),
        TurnEvent::PaidTax { square: sq, amount } => {
            format!("pays ${amount} {}", square(sq).name)
        }
        TurnEvent::BoughtProperty { square: sq, price } => {
            format!("buys {} for ${price}", square(sq).name)
        }
        TurnEvent::DeclinedProperty { square: sq } => format!("passes on {}", square(sq).name),
        TurnEvent::CannotAffordProperty { square: sq, price } => {
            format!("cannot afford {} (${price})", square(sq).name)
        }
        TurnEvent::PaidRent {
            square: sq,
            owner,
            due,
            paid,
        } => {
            if paid < due {
                format!("owes P{owner} ${due} rent on {}, pays ${paid}", square(sq).name)
            } else {
                format!("pays P{owner} ${paid} rent on {}", square(sq).name)
            }
        }
        TurnEvent::BoughtHouse {
            square: sq,
            houses,
            cost,
        } => format!("builds on {} for ${cost} ({houses} now)", square(sq).name),
        TurnEvent::DeclinedHouse { square: sq } => {
            format!("does not build on {}", square(sq).name)
        }
        TurnEvent::HousesMaxed { square: sq } => {
            format!("already has a hotel on {}", square(sq).name)
        }
        TurnEvent::CannotAffordHouse { square: sq, cost } => {
            format!("cannot afford a house on {} (${cost})", square(sq).name)
        }
        TurnEvent::SoldHouses {
            square: sq,
            count,
            proceeds,
        } => format!("sells {count} houses on {} for ${proceeds}", square(sq).name),
        TurnEvent::SoldProperty { square: sq, proceeds } => {
            format!("sells {} for ${proceeds}", square(sq).name)
        }
        TurnEvent::Bankrupt { final_cash } => format!("is bankrupt (cash {final_cash})"),
    }
}
