//! Fight state: taunt, close the distance, attack from range.

use super::*;
use crate::game::combat;
use crate::game::noise::make_noise;
use crate::game::pathfinding::move_astar;
use crate::game::perception::line_of_sight;

pub(super) fn act(
    world: &mut World,
    dice: &mut dyn Dice,
    id: EntityId,
    sighting: &Sighting,
) -> u64 {
    let Some(actor) = world.actors.get(id) else {
        return 1;
    };
    let (Some(fighter), Some(ai)) = (&actor.fighter, &actor.ai) else {
        return 1;
    };
    let pos = actor.pos;
    let move_cost = u64::from(fighter.move_speed());
    let attack_cost = u64::from(fighter.attack_speed());
    let specials = ai.behavior.specials;
    let range = ai.behavior.attack_range;
    let taunted = ai.taunted;
    let goal = if sighting.visible { sighting.target_pos } else { ai.last_target_pos };

    let Some(goal) = goal else {
        change_state(world, id, AiState::Wander);
        return move_cost;
    };

    if !taunted {
        taunt(world, dice, id, pos, specials.roars);
    }
    if specials.sings {
        let name = capitalize(&world.display_name(id));
        world.narrate(&format!("{name} sings of glory!"), ColorTag::LightBlue);
        let volume = world.config.song_volume;
        make_noise(world, dice, Some(id), pos, volume);
    }

    if sighting.visible
        && let Some(target) = sighting.target
        && in_attack_range(&world.map, pos, goal, range)
    {
        combat::attack(world, dice, id, target);
        if let Some(ai) = record_mut(world, id) {
            ai.turns_since_attack = 0;
        }
        let volume = world.config.attack_volume;
        make_noise(world, dice, Some(id), pos, volume);
        return attack_cost;
    }

    let max_chase = world.config.max_chase_turns;
    let gave_up = record_mut(world, id).is_some_and(|ai| {
        ai.turns_since_attack = ai.turns_since_attack.saturating_add(1);
        ai.turns_since_attack > max_chase
    });
    if gave_up {
        tracing::debug!(?id, "gave up the chase");
        change_state(world, id, AiState::Wander);
        return move_cost;
    }
    move_astar(world, id, goal);
    move_cost
}

fn taunt(world: &mut World, dice: &mut dyn Dice, id: EntityId, pos: Pos, roars: bool) {
    let Some(ai) = record_mut(world, id) else {
        return;
    };
    ai.taunted = true;
    let curse = dice.pick_index(ai.behavior.curses.len()).map(|i| ai.behavior.curses[i].clone());
    let name = capitalize(&world.display_name(id));
    if let Some(curse) = curse {
        let color = if roars { ColorTag::Red } else { ColorTag::Yellow };
        world.narrate(&format!("{name} shouts: \"{curse}\""), color);
    }
    let volume = if roars { world.config.roar_volume } else { world.config.taunt_volume };
    make_noise(world, dice, Some(id), pos, volume);
}

/// Melee reach is one tile; longer reach also needs a clear line.
pub fn in_attack_range(map: &Map, from: Pos, to: Pos, range: i32) -> bool {
    if range <= 1 {
        return from.is_adjacent(to);
    }
    let reach = u32::try_from(range).unwrap_or(1);
    from != to && from.chebyshev(to) <= reach && line_of_sight(map, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::LoadedDice;
    use crate::game::test_support::*;

    #[test]
    fn first_fight_turn_taunts_and_makes_noise() {
        let mut world = open_world(30, 16);
        add_player(&mut world, Pos::new(4, 8));
        let monster = add_monster(&mut world, Archetype::Warrior, Pos::new(8, 8));
        set_state(&mut world, monster, AiState::Fight);

        take_turn(&mut world, &mut LoadedDice::never(), monster);

        assert!(ai_of(&world, monster).taunted);
        assert!(world.messages.entries().iter().any(|m| m.text.contains("shouts")));
        let volume = world.config.taunt_volume;
        assert!(world.events.contains(&LogEvent::NoiseMade { origin: Pos::new(8, 8), volume }));
        assert_eq!(world.actors[monster].pos.x, 7, "closes in after taunting");
    }

    #[test]
    fn adjacent_fighter_attacks_and_pays_attack_cost() {
        let mut world = open_world(30, 16);
        let player = add_player(&mut world, Pos::new(7, 8));
        let monster = add_monster(&mut world, Archetype::Berserker, Pos::new(8, 8));
        set_state(&mut world, monster, AiState::Fight);
        let before = hp_of(&world, player);

        let cost = take_turn(&mut world, &mut LoadedDice::never(), monster);

        let fighter = world.actors[monster].fighter.as_ref().unwrap();
        assert_eq!(cost, u64::from(fighter.attack_speed()));
        assert!(hp_of(&world, player) < before);
    }

    #[test]
    fn archer_shoots_from_range_with_a_clear_line() {
        let mut world = open_world(30, 16);
        let player = add_player(&mut world, Pos::new(4, 8));
        let archer = add_monster(&mut world, Archetype::Archer, Pos::new(8, 8));
        set_state(&mut world, archer, AiState::Fight);
        let before = hp_of(&world, player);

        take_turn(&mut world, &mut LoadedDice::never(), archer);

        assert_eq!(world.actors[archer].pos, Pos::new(8, 8));
        assert!(hp_of(&world, player) < before);
    }

    #[test]
    fn ranged_reach_is_blocked_by_walls() {
        let world = ascii_world(&["#######", "#..#..#", "#######"]);
        assert!(!in_attack_range(&world.map, Pos::new(1, 1), Pos::new(5, 1), 5));
        assert!(in_attack_range(&world.map, Pos::new(1, 1), Pos::new(2, 1), 1));
        assert!(!in_attack_range(&world.map, Pos::new(1, 1), Pos::new(1, 1), 5));
    }

    #[test]
    fn chase_gives_up_after_too_many_turns() {
        let mut world = open_world(30, 16);
        add_player(&mut world, Pos::new(4, 8));
        let monster = add_monster(&mut world, Archetype::Warrior, Pos::new(8, 8));
        set_state(&mut world, monster, AiState::Fight);
        let limit = world.config.max_chase_turns;
        let ai = ai_mut(&mut world, monster);
        ai.taunted = true;
        ai.turns_since_attack = limit;

        take_turn(&mut world, &mut LoadedDice::never(), monster);

        assert_eq!(ai_of(&world, monster).state, AiState::Wander);
    }

    #[test]
    fn skald_sings_every_fight_turn() {
        let mut world = open_world(30, 16);
        add_player(&mut world, Pos::new(4, 8));
        let skald = add_monster(&mut world, Archetype::Skald, Pos::new(9, 8));
        set_state(&mut world, skald, AiState::Fight);
        ai_mut(&mut world, skald).taunted = true;

        take_turn(&mut world, &mut LoadedDice::never(), skald);
        take_turn(&mut world, &mut LoadedDice::never(), skald);

        let songs = world.messages.entries().iter().filter(|m| m.text.contains("sings")).count();
        assert_eq!(songs, 2);
    }
}
