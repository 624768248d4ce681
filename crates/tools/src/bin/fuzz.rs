use anyhow::{Result, bail};
use clap::Parser;
use dungeon_core::game::pathfinding::DIRECTIONS;
use dungeon_core::{AdvanceStopReason, Game, PlayerAction, SimConfig};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 5000)]
    ticks: u64,
    /// Number of consecutive seeds to run, starting at `seed`
    #[arg(short, long, default_value_t = 1)]
    runs: u64,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_action(rng: &mut ChaCha8Rng, carried: usize) -> PlayerAction {
    match rng.next_u64() % 8 {
        0 => PlayerAction::PickUp,
        1 if carried > 0 => {
            PlayerAction::Use { slot: rng.next_u64() as usize % carried, target: None }
        }
        2 if carried > 0 => PlayerAction::Drop { slot: rng.next_u64() as usize % carried },
        _ => {
            let (dx, dy) = choose(rng, &DIRECTIONS);
            PlayerAction::Step { dx, dy }
        }
    }
}

fn check_invariants(game: &Game) -> Result<()> {
    let world = game.world();
    for actor in world.actors.values() {
        if world.map.is_wall(actor.pos) {
            bail!("Invariant failed: {} inside wall at {:?}", actor.name, actor.pos);
        }
        if let Some(fighter) = &actor.fighter
            && (fighter.hp > fighter.max_hp || fighter.hp < 0)
        {
            bail!("Invariant failed: {} has {} of {} hp", actor.name, fighter.hp, fighter.max_hp);
        }
    }
    Ok(())
}

fn fuzz_one(seed: u64, max_ticks: u64) -> Result<()> {
    let mut game = Game::new_arena(seed, SimConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut last_tick = 0;

    while game.current_tick() < max_ticks {
        let result = game.advance(10);
        if game.current_tick() < last_tick {
            bail!("Invariant failed: clock went backwards on seed {seed}");
        }
        last_tick = game.current_tick();

        match result.stop_reason {
            AdvanceStopReason::Finished(outcome) => {
                println!("seed {seed}: {outcome:?} at tick {}", game.current_tick());
                break;
            }
            AdvanceStopReason::Idle => {
                println!("seed {seed}: idle at tick {}", game.current_tick());
                break;
            }
            AdvanceStopReason::PlayerTurn => {
                let action = random_action(&mut rng, game.inventory().len());
                game.player_act(action)?;
            }
            AdvanceStopReason::BudgetExhausted => {}
        }
        check_invariants(&game)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    println!(
        "Starting fuzz harness on {} seed(s) from {} for max {} ticks...",
        args.runs, args.seed, args.ticks
    );
    for seed in args.seed..args.seed.saturating_add(args.runs) {
        fuzz_one(seed, args.ticks)?;
    }
    println!("Fuzzing completed successfully.");
    Ok(())
}
