use dungeon_core::{
    AdvanceStopReason, Game, PlayerAction, SimConfig, content::INVENTORY_CAPACITY,
    game::pathfinding::DIRECTIONS,
};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_action(rng: &mut ChaCha8Rng, game: &Game) -> PlayerAction {
    let carried = game.inventory().len();
    let player_pos = game.world().player_pos();
    match rng.next_u64() % 10 {
        0 => PlayerAction::Wait,
        1 => PlayerAction::PickUp,
        2 if carried > 0 => PlayerAction::Use {
            slot: rng.next_u64() as usize % carried,
            target: player_pos.map(|p| p.offset(3, 0)),
        },
        3 if carried > 0 => PlayerAction::Drop { slot: rng.next_u64() as usize % carried },
        _ => {
            let (dx, dy) = choose(rng, &DIRECTIONS);
            PlayerAction::Step { dx, dy }
        }
    }
}

fn check_invariants(game: &Game, seed: u64, last_tick: u64) -> Result<(), String> {
    if game.current_tick() < last_tick {
        return Err(format!("Invariant failed: time went backwards on seed {seed}"));
    }
    let world = game.world();
    if world.inventory.len() > INVENTORY_CAPACITY {
        return Err(format!("Invariant failed: pack over capacity on seed {seed}"));
    }
    if world.items.values().any(|item| world.map.is_wall(item.pos)) {
        return Err(format!("Invariant failed: item inside wall on seed {seed}"));
    }
    let mut occupied = Vec::new();
    for (id, actor) in &world.actors {
        if world.map.is_wall(actor.pos) {
            return Err(format!("Invariant failed: actor inside wall on seed {seed}"));
        }
        if let Some(fighter) = &actor.fighter {
            if fighter.hp > fighter.max_hp || fighter.hp < 0 {
                return Err(format!("Invariant failed: hp out of range on seed {seed}"));
            }
            if fighter.died && fighter.hp != 0 {
                return Err(format!("Invariant failed: dead fighter with hp on seed {seed}"));
            }
        }
        if actor.blocks {
            if occupied.contains(&actor.pos) {
                return Err(format!("Invariant failed: two blockers share a tile on seed {seed}"));
            }
            occupied.push(actor.pos);
        }
        if actor.ai.is_some() && !actor.is_alive() {
            return Err(format!("Invariant failed: dead actor {id:?} kept its AI on seed {seed}"));
        }
    }
    Ok(())
}

fn run_fuzz_simulation(seed: u64, choice_seed: u64, max_rounds: u32) -> Result<(), String> {
    let mut game = Game::new_arena(seed, SimConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(choice_seed);
    let mut last_tick = 0;

    for _ in 0..max_rounds {
        let result = game.advance(20);
        check_invariants(&game, seed, last_tick)?;
        last_tick = game.current_tick();

        match result.stop_reason {
            AdvanceStopReason::Finished(_) | AdvanceStopReason::Idle => break,
            AdvanceStopReason::BudgetExhausted => {}
            AdvanceStopReason::PlayerTurn => {
                let action = random_action(&mut rng, &game);
                game.player_act(action).map_err(|e| format!("player action failed: {e}"))?;
            }
        }
        check_invariants(&game, seed, last_tick)?;
    }
    Ok(())
}

#[test]
fn test_fuzz_game_simulation() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(20));
    let seeds = (any::<u64>(), any::<u64>());

    runner
        .run(&seeds, |(seed, choice_seed)| {
            run_fuzz_simulation(seed, choice_seed, 300).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("semantic fuzz simulation should preserve invariants");
}
