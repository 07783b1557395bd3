//! Encounter simulator
//!
//! Walks a player through a chain of locations, answering every decision
//! either from stdin or from a fixed policy, and prints what happens.

mod prompt;
mod report;

use anyhow::{Context, Result};
use catalog_core::ContentRegistry;
use clap::Parser;
use encounter_core::config::init_constants;
use encounter_core::dice::seeded;
use encounter_core::encounter::RewardPolicy;
use encounter_core::session::{run_route, CancelToken, ScriptedSource};
use encounter_core::types::LocationTransition;
use encounter_core::{ClassTag, PlayerAction, Session, SessionStatus, StatBlock, Strategy, TrapChoice};
use prompt::{Narrated, PromptSource};
use report::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Encounter simulator - play or replay a seeded run of encounters
#[derive(Parser, Debug)]
#[command(name = "encounter_sim")]
#[command(about = "Run a player through encounters, traps and poison on a seeded RNG")]
struct Args {
    /// Player class: warrior, mage or rogue
    #[arg(long, default_value = "warrior")]
    class: ClassTag,

    /// Directory of enemy, item and loadout TOML files
    #[arg(long, default_value = "content")]
    content: PathBuf,

    /// Encounter constants TOML; built-in defaults when omitted
    #[arg(long)]
    constants: Option<PathBuf>,

    /// Number of location transitions to walk
    #[arg(long, default_value_t = 10)]
    moves: usize,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Answer decisions with the fixed policy below instead of prompting
    #[arg(long)]
    scripted: bool,

    /// Scripted combat action
    #[arg(long, default_value = "attack")]
    action: PlayerAction,

    /// Scripted encounter strategy
    #[arg(long, default_value = "fight")]
    strategy: Strategy,

    /// Scripted response to a detected trap
    #[arg(long, default_value = "avoid")]
    trap: TrapChoice,

    /// Reward victories that follow a failed negotiation
    #[arg(long)]
    generous: bool,

    /// Abandon the session after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &args.constants {
        init_constants(path).with_context(|| format!("loading constants from {}", path.display()))?;
    }

    let registry = ContentRegistry::load(&args.content)
        .with_context(|| format!("loading content from {}", args.content.display()))?;
    if registry.is_empty() {
        tracing::warn!(dir = %args.content.display(), "no content found; there is nothing to meet");
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = seeded(seed);
    tracing::info!(seed, class = %args.class, moves = args.moves, "starting run");

    let player = StatBlock::for_class(args.class).with_consumables(registry.starting_inventory(args.class));
    let policy = if args.generous {
        RewardPolicy::generous()
    } else {
        RewardPolicy::default()
    };
    let mut session = Session::new(player, &registry).with_reward_policy(policy);

    let route = (0..args.moves).map(|i| LocationTransition::new(format!("location {}", i), format!("location {}", i + 1)));
    let cancel = match args.timeout_secs {
        Some(secs) => CancelToken::new().with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    };

    let status = if args.scripted {
        let script = ScriptedSource::new().with_defaults(args.action, args.strategy, args.trap);
        let mut source = Narrated::new(script, args.format);
        run_route(&mut session, route, &mut source, &cancel, &mut rng)?
    } else {
        let stdin = std::io::stdin();
        let mut source = Narrated::new(PromptSource::new(stdin.lock()), args.format);
        run_route(&mut session, route, &mut source, &cancel, &mut rng)?
    };

    let player = session.player();
    println!(
        "Seed {}: {} finished with {}/{} health, damage modifier {:.1}",
        seed,
        args.class,
        player.health(),
        player.max_health(),
        player.damage_modifier()
    );
    Ok(exit_code(status))
}

fn exit_code(status: SessionStatus) -> ExitCode {
    match status.reason {
        None => ExitCode::SUCCESS,
        Some(reason) => {
            println!("Ended: {}", reason);
            ExitCode::from(1)
        }
    }
}
