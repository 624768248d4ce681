use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dungeon_core::content::INVENTORY_CAPACITY;
use dungeon_core::game::pathfinding::direction_toward;
use dungeon_core::{
    ActionResult, ActorKind, AdvanceStopReason, Effect, Game, PlayerAction, SimConfig,
    load_snapshot_from_file, save_snapshot,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Stop once the scheduler clock passes this tick
    #[arg(short, long, default_value_t = 2000)]
    ticks: u64,
    /// TOML file overriding simulation tuning
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Resume from a snapshot file instead of starting a new arena
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Write a snapshot here when the run stops
    #[arg(long)]
    save: Option<PathBuf>,
    /// Print narration as it happens
    #[arg(short, long)]
    verbose: bool,
}

/// Drinks a potion when badly hurt, grabs items underfoot, then fights the closest monster in
/// view. Waits when there is nothing to do.
fn bot_action(game: &Game) -> PlayerAction {
    let world = game.world();
    let Some(player) = world.player() else {
        return PlayerAction::Wait;
    };
    let origin = player.pos;
    let hurt = player.fighter.as_ref().is_some_and(|fighter| fighter.hp_fraction() < 0.4);
    let potion = game.inventory().iter().position(|item| item.effect == Effect::Heal);
    if hurt && let Some(slot) = potion {
        return PlayerAction::Use { slot, target: None };
    }
    if world.item_at(origin).is_some() && game.inventory().len() < INVENTORY_CAPACITY {
        return PlayerAction::PickUp;
    }
    let target = world
        .actors
        .values()
        .filter(|actor| {
            matches!(actor.kind, ActorKind::Monster(_))
                && actor.is_alive()
                && world.map.is_visible(actor.pos)
        })
        .map(|actor| actor.pos)
        .min_by_key(|pos| origin.chebyshev(*pos));
    match target.map(|pos| direction_toward(origin, pos)) {
        Some((dx, dy)) if (dx, dy) != (0, 0) => PlayerAction::Step { dx, dy },
        _ => PlayerAction::Wait,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut game = match &args.resume {
        Some(path) => {
            let snapshot = load_snapshot_from_file(path)
                .with_context(|| format!("Failed to load snapshot: {}", path.display()))?;
            Game::from_snapshot(snapshot)
        }
        None => {
            let config = match &args.config {
                Some(path) => SimConfig::load(path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?,
                None => SimConfig::default(),
            };
            Game::new_arena(args.seed, config)
        }
    };
    info!(seed = game.seed(), tick = game.current_tick(), "simulation starting");

    let mut player_turns = 0u32;
    while game.current_tick() < args.ticks {
        let result = game.advance(50);
        if args.verbose {
            for line in game.drain_messages() {
                println!("[{:>5}] {}", game.current_tick(), line.text);
            }
        }
        match result.stop_reason {
            AdvanceStopReason::PlayerTurn => {
                let action = bot_action(&game);
                let result = game.player_act(action).context("player could not act on its turn")?;
                if result == ActionResult::Cancelled {
                    game.player_act(PlayerAction::Wait)?;
                }
                player_turns += 1;
            }
            AdvanceStopReason::Finished(outcome) => {
                info!(?outcome, tick = game.current_tick(), "run finished");
                break;
            }
            AdvanceStopReason::Idle => {
                info!("nothing left to schedule");
                break;
            }
            AdvanceStopReason::BudgetExhausted => {}
        }
    }

    if let Some(path) = &args.save {
        save_snapshot(path, &game.snapshot())
            .with_context(|| format!("Failed to save snapshot: {}", path.display()))?;
        info!(path = %path.display(), "snapshot saved");
    }

    println!("Simulation complete.");
    println!("Final Tick: {}", game.current_tick());
    println!("Player Turns: {player_turns}");
    println!("Outcome: {:?}", game.outcome());
    println!("Snapshot Hash: {}", game.snapshot_hash());

    Ok(())
}
