//! Consumables on the floor and in the player's pack.
//! This module exists to move items between the map and the inventory and to spend them.
//! It does not own what an item does once used; `effects` resolves that.

use super::*;
use crate::content::{INVENTORY_CAPACITY, item_name};
use crate::game::effects::apply_effect;

impl Game {
    pub fn spawn_item(&mut self, effect: Effect, pos: Pos) -> ItemId {
        place_item(&mut self.world, effect, pos)
    }

    pub fn inventory(&self) -> &[Item] {
        &self.world.inventory
    }
}

pub fn place_item(world: &mut World, effect: Effect, pos: Pos) -> ItemId {
    world.items.insert(Item { name: item_name(effect).to_string(), effect, pos })
}

/// Moves the first item under `holder` into the inventory.
/// Returns false when there is nothing to pick up. A full pack still spends the turn.
pub fn pick_up(world: &mut World, holder: EntityId) -> bool {
    let Some(pos) = world.actors.get(holder).map(|actor| actor.pos) else {
        return false;
    };
    let Some(id) = world.item_at(pos) else {
        world.narrate("There is nothing here to pick up.", ColorTag::White);
        return false;
    };
    if world.inventory.len() >= INVENTORY_CAPACITY {
        let name = world.items[id].name.clone();
        world.narrate(&format!("Your inventory is full, cannot pick up {name}."), ColorTag::Red);
        return true;
    }
    let Some(item) = world.items.remove(id) else {
        return false;
    };
    world.narrate(&format!("You picked up a {}!", item.name), ColorTag::Green);
    world.events.push(LogEvent::ItemPickedUp { effect: item.effect });
    tracing::debug!(effect = ?item.effect, carried = world.inventory.len() + 1, "item picked up");
    world.inventory.push(item);
    true
}

/// Puts the item in `slot` back on the map under `holder`.
pub fn drop_item(world: &mut World, holder: EntityId, slot: usize) -> Result<(), GameError> {
    let pos = world.actors.get(holder).map(|actor| actor.pos).ok_or(GameError::UnknownActor)?;
    if slot >= world.inventory.len() {
        return Err(GameError::InvalidSlot { slot });
    }
    let mut item = world.inventory.remove(slot);
    item.pos = pos;
    world.narrate(&format!("You dropped a {}.", item.name), ColorTag::Yellow);
    world.events.push(LogEvent::ItemDropped { effect: item.effect });
    world.items.insert(item);
    Ok(())
}

/// Spends the item in `slot`. A cancelled effect leaves the item in the pack.
pub fn use_item(
    world: &mut World,
    holder: EntityId,
    slot: usize,
    target: Option<Pos>,
) -> Result<EffectOutcome, GameError> {
    let effect =
        world.inventory.get(slot).map(|item| item.effect).ok_or(GameError::InvalidSlot { slot })?;
    let outcome = apply_effect(world, holder, effect, target);
    if outcome == EffectOutcome::Applied {
        world.inventory.remove(slot);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::*;

    fn room() -> (World, EntityId) {
        let mut world = open_world(20, 12);
        let player = add_player(&mut world, Pos::new(5, 5));
        (world, player)
    }

    #[test]
    fn picking_up_moves_the_item_into_the_pack() {
        let (mut world, player) = room();
        place_item(&mut world, Effect::Heal, Pos::new(5, 5));

        assert!(pick_up(&mut world, player));

        assert!(world.items.is_empty());
        assert_eq!(world.inventory.len(), 1);
        assert_eq!(world.inventory[0].name, "healing potion");
        assert!(world.events.contains(&LogEvent::ItemPickedUp { effect: Effect::Heal }));
    }

    #[test]
    fn empty_tile_has_nothing_to_pick_up() {
        let (mut world, player) = room();
        place_item(&mut world, Effect::Heal, Pos::new(6, 5));

        assert!(!pick_up(&mut world, player));
        assert_eq!(world.items.len(), 1);
        assert!(world.inventory.is_empty());
    }

    #[test]
    fn full_pack_leaves_the_item_on_the_floor() {
        let (mut world, player) = room();
        for _ in 0..INVENTORY_CAPACITY {
            place_item(&mut world, Effect::Confuse, Pos::new(5, 5));
            assert!(pick_up(&mut world, player));
        }
        place_item(&mut world, Effect::Fireball, Pos::new(5, 5));

        assert!(pick_up(&mut world, player), "a failed pick-up still spends the turn");
        assert_eq!(world.inventory.len(), INVENTORY_CAPACITY);
        assert_eq!(world.items.len(), 1);
        let last = world.messages.entries().last().unwrap();
        assert_eq!(last.text, "Your inventory is full, cannot pick up scroll of fireball.");
    }

    #[test]
    fn dropping_puts_the_item_under_the_holder() {
        let (mut world, player) = room();
        place_item(&mut world, Effect::Lightning, Pos::new(5, 5));
        pick_up(&mut world, player);
        world.actors[player].pos = Pos::new(9, 7);

        drop_item(&mut world, player, 0).unwrap();

        assert!(world.inventory.is_empty());
        let id = world.item_at(Pos::new(9, 7)).expect("dropped item lies under the player");
        assert_eq!(world.items[id].effect, Effect::Lightning);
        assert_eq!(drop_item(&mut world, player, 0), Err(GameError::InvalidSlot { slot: 0 }));
    }

    #[test]
    fn items_are_spent_only_when_their_effect_applies() {
        let (mut world, player) = room();
        place_item(&mut world, Effect::Heal, Pos::new(5, 5));
        pick_up(&mut world, player);

        assert_eq!(use_item(&mut world, player, 0, None), Ok(EffectOutcome::Cancelled));
        assert_eq!(world.inventory.len(), 1);

        world.actors[player].fighter.as_mut().unwrap().hp = 5;
        assert_eq!(use_item(&mut world, player, 0, None), Ok(EffectOutcome::Applied));
        assert!(world.inventory.is_empty());
        assert_eq!(hp_of(&world, player), 23);
    }

    #[test]
    fn using_an_empty_slot_is_an_error() {
        let (mut world, player) = room();
        assert_eq!(use_item(&mut world, player, 3, None), Err(GameError::InvalidSlot { slot: 3 }));
    }
}
