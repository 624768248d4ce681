//! Monster decision making: perception, state transitions and per-state actions.
//! This module exists to drive every archetype through one state machine tuned by `Behavior`.
//! It does not own turn ordering; the scheduler calls `take_turn` and charges the returned cost.

use super::*;
use crate::game::combat::capitalize;
use crate::game::pathfinding::try_step;
use crate::game::perception::can_see;

mod fight;
mod flee;
mod wander;

pub use flee::{EscapeRay, best_escape, score_escape_ray};
pub use wander::pick_patrol_point;

/// What an actor knows about its target this turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sighting {
    pub target: Option<EntityId>,
    pub target_pos: Option<Pos>,
    pub distance: f64,
    pub visible: bool,
}

/// Runs one AI turn for `id` and returns its tick cost.
pub fn take_turn(world: &mut World, dice: &mut dyn Dice, id: EntityId) -> u64 {
    let Some(actor) = world.actors.get(id) else {
        return 1;
    };
    let (Some(fighter), Some(ai)) = (&actor.fighter, &actor.ai) else {
        return 1;
    };
    let move_cost = u64::from(fighter.move_speed());
    if ai.confused_turns > 0 {
        return confused_turn(world, dice, id, move_cost);
    }

    let sighting = perceive(world, id);
    evaluate_transitions(world, dice, id, &sighting);

    let Some(state) = record(world, id).map(|ai| ai.state) else {
        return move_cost;
    };
    let cost = match state {
        AiState::Sleep => move_cost,
        AiState::Wander => wander::act(world, dice, id, move_cost),
        AiState::Fight => fight::act(world, dice, id, &sighting),
        AiState::Flee => flee::act(world, dice, id, &sighting),
    };
    if let Some(ai) = record_mut(world, id) {
        ai.state_turns = ai.state_turns.saturating_add(1);
    }
    cost.max(1)
}

/// Looks for the player and refreshes the cached distance and last known position.
pub fn perceive(world: &mut World, id: EntityId) -> Sighting {
    let target = world.player_id.filter(|player| {
        *player != id && world.actors.get(*player).is_some_and(Actor::is_alive)
    });
    let Some(actor) = world.actors.get(id) else {
        return Sighting { target: None, target_pos: None, distance: f64::MAX, visible: false };
    };
    let target_pos = target.and_then(|target| world.actors.get(target)).map(|t| t.pos);
    let distance = target_pos.map_or(f64::MAX, |p| actor.pos.distance(p));
    let visible = target_pos.is_some_and(|p| can_see(&world.map, actor.pos, actor.vision, p));

    let alert = f64::from(world.config.alert_radius.max(1));
    if let Some(ai) = record_mut(world, id) {
        ai.target_distance = distance;
        ai.turns_away = if distance > alert { ai.turns_away.saturating_add(1) } else { 0 };
        if visible {
            ai.last_target_pos = target_pos;
        }
    }
    Sighting { target, target_pos, distance, visible }
}

/// Applies the transition table once.
pub fn evaluate_transitions(
    world: &mut World,
    dice: &mut dyn Dice,
    id: EntityId,
    sighting: &Sighting,
) {
    let Some(actor) = world.actors.get(id) else {
        return;
    };
    let (Some(ai), Some(fighter)) = (&actor.ai, &actor.fighter) else {
        return;
    };
    let config = &world.config;
    let alert = f64::from(config.alert_radius.max(1));
    let behavior = &ai.behavior;
    let adjacent = sighting.target_pos.is_some_and(|p| actor.pos.is_adjacent(p));

    let next = match ai.state {
        AiState::Sleep => {
            if sighting.visible && sighting.distance <= alert {
                let wake = ((1.0 - sighting.distance / alert) + behavior.hearing) / 2.0;
                dice.chance(wake).then_some(AiState::Fight)
            } else {
                None
            }
        }
        state if sighting.distance > alert && ai.turns_away >= config.min_turns_before_sleep => {
            if dice.chance(behavior.laziness) {
                Some(AiState::Sleep)
            } else if state == AiState::Wander {
                None
            } else {
                Some(AiState::Wander)
            }
        }
        state if sighting.visible => {
            let wants_flee = !behavior.specials.roars
                && fighter.hp_fraction() < behavior.flee_health
                && world.combat.allies_in_combat(id) < config.flee_outnumber_threshold;
            if !wants_flee {
                Some(AiState::Fight)
            } else if state == AiState::Flee {
                None
            } else if !adjacent && dice.chance(behavior.flee_chance) {
                Some(AiState::Flee)
            } else {
                Some(AiState::Fight)
            }
        }
        state => {
            // Only Fight hunts the last sighting; Flee leaves Wander to pick a patrol point.
            let hunt = if state == AiState::Fight { ai.last_target_pos } else { None };
            if change_state(world, id, AiState::Wander)
                && let Some(ai) = record_mut(world, id)
            {
                ai.move_target = hunt;
            }
            None
        }
    };

    if let Some(to) = next {
        change_state(world, id, to);
    }
}

/// Transitions `id` and records the change. Returns false for same-state requests.
pub fn change_state(world: &mut World, id: EntityId, to: AiState) -> bool {
    let Some(ai) = record_mut(world, id) else {
        return false;
    };
    let Some((from, to)) = ai.transition(to) else {
        return false;
    };
    world.events.push(LogEvent::StateChanged { actor: id, from, to });
    tracing::debug!(?id, %from, %to, "ai state changed");
    true
}

fn confused_turn(world: &mut World, dice: &mut dyn Dice, id: EntityId, cost: u64) -> u64 {
    let dx = dice.roll(-1, 1);
    let dy = dice.roll(-1, 1);
    try_step(world, id, dx, dy);
    let remaining = record_mut(world, id).map_or(0, |ai| {
        ai.confused_turns = ai.confused_turns.saturating_sub(1);
        ai.confused_turns
    });
    if remaining == 0 {
        let name = capitalize(&world.display_name(id));
        world.narrate(&format!("{name} is no longer confused!"), ColorTag::Red);
    }
    cost
}

pub(super) fn record(world: &World, id: EntityId) -> Option<&AiRecord> {
    world.actors.get(id).and_then(|actor| actor.ai.as_ref())
}

pub(super) fn record_mut(world: &mut World, id: EntityId) -> Option<&mut AiRecord> {
    world.actors.get_mut(id).and_then(|actor| actor.ai.as_mut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::LoadedDice;
    use crate::game::test_support::*;

    fn arena() -> (World, EntityId, EntityId) {
        let mut world = open_world(30, 16);
        let player = add_player(&mut world, Pos::new(4, 8));
        let monster = add_monster(&mut world, Archetype::Warrior, Pos::new(8, 8));
        (world, player, monster)
    }

    #[test]
    fn sleeper_that_sees_the_player_can_wake_into_fight() {
        let (mut world, _, monster) = arena();
        take_turn(&mut world, &mut LoadedDice::always_max(), monster);
        assert_eq!(ai_of(&world, monster).state, AiState::Fight);
    }

    #[test]
    fn sleeper_stays_asleep_on_a_failed_roll() {
        let (mut world, _, monster) = arena();
        take_turn(&mut world, &mut LoadedDice::never(), monster);
        assert_eq!(ai_of(&world, monster).state, AiState::Sleep);
        assert_eq!(ai_of(&world, monster).state_turns, 1);
    }

    #[test]
    fn wounded_sleeper_wakes_into_fight_not_flee() {
        let (mut world, _, monster) = arena();
        world.actors[monster].fighter.as_mut().unwrap().hp = 1;
        take_turn(&mut world, &mut LoadedDice::always_max(), monster);
        assert_eq!(ai_of(&world, monster).state, AiState::Fight);
    }

    #[test]
    fn wounded_fighter_flees_when_not_adjacent() {
        let (mut world, _, monster) = arena();
        set_state(&mut world, monster, AiState::Fight);
        world.actors[monster].fighter.as_mut().unwrap().hp = 1;
        take_turn(&mut world, &mut LoadedDice::always_max(), monster);
        assert_eq!(ai_of(&world, monster).state, AiState::Flee);
    }

    #[test]
    fn adjacent_wounded_fighter_stands_its_ground() {
        let (mut world, player, monster) = arena();
        world.actors[player].pos = Pos::new(7, 8);
        set_state(&mut world, monster, AiState::Fight);
        world.actors[monster].fighter.as_mut().unwrap().hp = 1;
        take_turn(&mut world, &mut LoadedDice::always_max(), monster);
        assert_eq!(ai_of(&world, monster).state, AiState::Fight);
    }

    #[test]
    fn allies_already_fighting_nearby_keep_a_monster_from_fleeing() {
        let (mut world, _, monster) = arena();
        for y in [6, 10] {
            let ally = add_monster(&mut world, Archetype::Berserker, Pos::new(9, y));
            set_state(&mut world, ally, AiState::Fight);
        }
        set_state(&mut world, monster, AiState::Fight);
        world.actors[monster].fighter.as_mut().unwrap().hp = 1;
        world.recompute_combat_cache();

        take_turn(&mut world, &mut LoadedDice::always_max(), monster);
        assert_eq!(ai_of(&world, monster).state, AiState::Fight);
    }

    #[test]
    fn hero_never_flees() {
        let mut world = open_world(30, 16);
        add_player(&mut world, Pos::new(4, 8));
        let hero = add_monster(&mut world, Archetype::Hero, Pos::new(8, 8));
        set_state(&mut world, hero, AiState::Fight);
        world.actors[hero].fighter.as_mut().unwrap().hp = 1;
        take_turn(&mut world, &mut LoadedDice::always_max(), hero);
        assert_eq!(ai_of(&world, hero).state, AiState::Fight);
    }

    #[test]
    fn losing_sight_turns_a_fighter_into_a_hunter() {
        let (mut world, player, monster) = arena();
        set_state(&mut world, monster, AiState::Fight);
        ai_mut(&mut world, monster).last_target_pos = Some(Pos::new(5, 8));
        world.actors[player].pos = Pos::new(16, 2);

        take_turn(&mut world, &mut LoadedDice::never(), monster);

        let ai = ai_of(&world, monster);
        assert_eq!(ai.state, AiState::Wander);
        assert_eq!(ai.move_target, Some(Pos::new(5, 8)));
    }

    #[test]
    fn long_idle_far_from_the_target_can_fall_back_asleep() {
        let (mut world, player, monster) = arena();
        world.actors[player].pos = Pos::new(27, 14);
        set_state(&mut world, monster, AiState::Wander);
        ai_mut(&mut world, monster).turns_away = world.config.min_turns_before_sleep - 1;

        take_turn(&mut world, &mut LoadedDice::always_max(), monster);
        assert_eq!(ai_of(&world, monster).state, AiState::Sleep);
    }

    #[test]
    fn not_enough_idle_turns_keeps_a_wanderer_awake() {
        let (mut world, player, monster) = arena();
        world.actors[player].pos = Pos::new(27, 14);
        set_state(&mut world, monster, AiState::Wander);
        ai_mut(&mut world, monster).turns_away = world.config.min_turns_before_sleep - 2;

        take_turn(&mut world, &mut LoadedDice::always_max(), monster);
        assert_eq!(ai_of(&world, monster).state, AiState::Wander);
    }

    #[test]
    fn long_fight_does_not_count_as_time_away() {
        let (mut world, player, monster) = arena();
        world.actors[player].pos = Pos::new(7, 8);
        set_state(&mut world, monster, AiState::Fight);
        ai_mut(&mut world, monster).state_turns = world.config.min_turns_before_sleep;
        take_turn(&mut world, &mut LoadedDice::never(), monster);
        assert_eq!(ai_of(&world, monster).turns_away, 0);

        world.actors[player].pos = Pos::new(18, 8);
        take_turn(&mut world, &mut LoadedDice::always_max(), monster);

        let ai = ai_of(&world, monster);
        assert_eq!(ai.turns_away, 1);
        assert_ne!(ai.state, AiState::Sleep);
    }

    #[test]
    fn enough_turns_away_let_a_fighter_doze_off() {
        let (mut world, player, monster) = arena();
        world.actors[player].pos = Pos::new(1, 1);
        set_state(&mut world, monster, AiState::Fight);
        let mut dice = LoadedDice::never();
        for _ in 1..world.config.min_turns_before_sleep {
            take_turn(&mut world, &mut dice, monster);
            assert_ne!(ai_of(&world, monster).state, AiState::Sleep);
        }

        take_turn(&mut world, &mut LoadedDice::always_max(), monster);
        assert_eq!(ai_of(&world, monster).state, AiState::Sleep);
    }

    #[test]
    fn fleeing_actor_that_loses_sight_does_not_head_back_to_the_danger() {
        let (mut world, player, monster) = arena();
        let danger = Pos::new(3, 4);
        world.actors[player].pos = Pos::new(2, 3);
        set_state(&mut world, monster, AiState::Flee);
        ai_mut(&mut world, monster).last_target_pos = Some(danger);
        let before = world.actors[monster].pos.distance(danger);

        take_turn(&mut world, &mut LoadedDice::never(), monster);

        let ai = ai_of(&world, monster);
        assert_eq!(ai.state, AiState::Wander);
        assert_ne!(ai.move_target, Some(danger));
        assert!(world.actors[monster].pos.distance(danger) > before);
    }

    #[test]
    fn confusion_wears_off_with_a_message() {
        let (mut world, _, monster) = arena();
        ai_mut(&mut world, monster).confused_turns = 2;
        let mut dice = LoadedDice::always_max();

        take_turn(&mut world, &mut dice, monster);
        assert_eq!(world.actors[monster].pos, Pos::new(9, 9));
        assert!(world.messages.entries().is_empty());

        take_turn(&mut world, &mut dice, monster);
        assert_eq!(ai_of(&world, monster).confused_turns, 0);
        let last = world.messages.entries().last().unwrap();
        assert!(last.text.ends_with("is no longer confused!"));
        assert_eq!(ai_of(&world, monster).state, AiState::Sleep);
    }

    #[test]
    fn state_changes_are_logged() {
        let (mut world, _, monster) = arena();
        take_turn(&mut world, &mut LoadedDice::always_max(), monster);
        assert!(world.events.iter().any(|event| matches!(
            event,
            LogEvent::StateChanged { from: AiState::Sleep, to: AiState::Fight, .. }
        )));
    }
}
