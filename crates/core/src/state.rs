use std::collections::BTreeMap;
use std::mem;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::config::SimConfig;
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage_min: i32,
    pub damage_max: i32,
    /// Added to the wielder's base turn cost when attacking; may be negative.
    pub speed: i32,
    pub verbs: Vec<String>,
}

impl Weapon {
    pub fn new(name: &str, damage_min: i32, damage_max: i32, speed: i32, verbs: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            damage_min,
            damage_max: damage_max.max(damage_min),
            speed,
            verbs: verbs.iter().map(|verb| (*verb).to_string()).collect(),
        }
    }
}

/// What happens when a fighter's hp reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathPolicy {
    /// Ends the run; the fighter stays attached for inspection.
    Player,
    /// Leaves non-blocking remains with no fighter or AI.
    Monster,
}

/// Picks the status color for a fighter's health bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthColorPolicy {
    Thresholds,
    Player,
}

impl HealthColorPolicy {
    pub fn color_for(self, fighter: &Fighter) -> ColorTag {
        if self == HealthColorPolicy::Player && fighter.died {
            return ColorTag::Crimson;
        }
        let fraction = fighter.hp_fraction();
        if fraction >= 0.66 {
            ColorTag::Green
        } else if fraction >= 0.33 {
            ColorTag::Yellow
        } else {
            ColorTag::Red
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Non-positive damage, or the fighter already died.
    Ignored,
    Hurt,
    Killed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub hp: i32,
    pub max_hp: i32,
    pub power: i32,
    pub defense: i32,
    pub speed: u32,
    pub weapon: Option<Weapon>,
    pub death: DeathPolicy,
    pub health_colors: HealthColorPolicy,
    pub died: bool,
}

impl Fighter {
    pub fn new(hp: i32, power: i32, defense: i32, speed: u32, death: DeathPolicy) -> Self {
        let health_colors = match death {
            DeathPolicy::Player => HealthColorPolicy::Player,
            DeathPolicy::Monster => HealthColorPolicy::Thresholds,
        };
        let max_hp = hp.max(1);
        Self {
            hp: max_hp,
            max_hp,
            power: power.max(0),
            defense: defense.max(0),
            speed: speed.max(1),
            weapon: None,
            death,
            health_colors,
            died: false,
        }
    }

    pub fn hp_fraction(&self) -> f64 {
        f64::from(self.hp) / f64::from(self.max_hp.max(1))
    }

    pub fn is_dead(&self) -> bool {
        self.died || self.hp <= 0
    }

    /// Subtracts damage, clamping at zero. Reports `Killed` only on the transition.
    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if amount <= 0 || self.died {
            return DamageOutcome::Ignored;
        }
        self.hp = (self.hp - amount).max(0);
        if self.hp == 0 {
            self.died = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hurt
        }
    }

    pub fn heal(&mut self, amount: i32) {
        if self.died || amount <= 0 {
            return;
        }
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    pub fn move_speed(&self) -> u32 {
        self.speed.max(1)
    }

    pub fn attack_speed(&self) -> u32 {
        let bonus = self.weapon.as_ref().map_or(0, |weapon| weapon.speed);
        let total = i64::from(self.speed) + i64::from(bonus);
        u32::try_from(total.max(1)).unwrap_or(u32::MAX)
    }

    /// Takes ownership of `weapon` and hands back whatever was equipped before.
    pub fn equip(&mut self, weapon: Weapon) -> Option<Weapon> {
        self.weapon.replace(weapon)
    }

    pub fn unequip(&mut self) -> Option<Weapon> {
        self.weapon.take()
    }

    pub fn health_color(&self) -> ColorTag {
        self.health_colors.color_for(self)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialMoves {
    /// Makes noise every fighting turn, drawing others in.
    pub sings: bool,
    /// Louder taunt; never flees.
    pub roars: bool,
}

/// Per-archetype tuning for the shared AI driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Behavior {
    pub archetype: Archetype,
    pub hearing: f64,
    pub laziness: f64,
    pub flee_health: f64,
    pub flee_chance: f64,
    pub attack_range: i32,
    pub specials: SpecialMoves,
    pub curses: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiRecord {
    pub state: AiState,
    pub prev_state: AiState,
    pub state_turns: u32,
    /// Consecutive turns spent outside the alert radius, whatever the state.
    #[serde(default)]
    pub turns_away: u32,
    pub target_distance: f64,
    pub last_target_pos: Option<Pos>,
    pub move_target: Option<Pos>,
    pub turns_since_attack: u32,
    pub taunted: bool,
    pub stuck_turns: u32,
    pub confused_turns: u32,
    pub behavior: Behavior,
}

impl AiRecord {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            state: AiState::Sleep,
            prev_state: AiState::Sleep,
            state_turns: 0,
            turns_away: 0,
            target_distance: f64::MAX,
            last_target_pos: None,
            move_target: None,
            turns_since_attack: 0,
            taunted: false,
            stuck_turns: 0,
            confused_turns: 0,
            behavior,
        }
    }

    /// Switches state and resets per-state counters. Same-state requests are no-ops.
    pub fn transition(&mut self, to: AiState) -> Option<(AiState, AiState)> {
        if self.state == to {
            return None;
        }
        let from = self.state;
        self.prev_state = from;
        self.state = to;
        self.state_turns = 0;
        if from == AiState::Sleep {
            self.turns_away = 0;
        }
        self.turns_since_attack = 0;
        self.stuck_turns = 0;
        self.taunted = false;
        if to != AiState::Wander {
            self.move_target = None;
        }
        Some((from, to))
    }

    /// Name-based transition for data-driven callers; unknown names are an error.
    pub fn transition_named(
        &mut self,
        name: &str,
    ) -> Result<Option<(AiState, AiState)>, GameError> {
        let to: AiState = name.parse()?;
        Ok(self.transition(to))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Actor {
    pub id: EntityId,
    pub name: String,
    pub kind: ActorKind,
    pub pos: Pos,
    pub blocks: bool,
    pub vision: i32,
    pub fighter: Option<Fighter>,
    pub ai: Option<AiRecord>,
}

impl Actor {
    pub fn is_alive(&self) -> bool {
        self.fighter.as_ref().is_some_and(|fighter| !fighter.is_dead())
    }
}

/// A consumable lying on the map or carried by the player.
/// Carried items keep the position they were picked up from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub effect: Effect,
    pub pos: Pos,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Map {
    pub internal_width: usize,
    pub internal_height: usize,
    pub tiles: Vec<TileKind>,
    pub visible: Vec<bool>,
    pub explored: Vec<bool>,
}

impl Map {
    /// Open floor surrounded by a one-tile wall border.
    pub fn new(width: usize, height: usize) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let mut tiles = vec![TileKind::Floor; width * height];
        for x in 0..width {
            tiles[x] = TileKind::Wall;
            tiles[(height - 1) * width + x] = TileKind::Wall;
        }
        for y in 0..height {
            tiles[y * width] = TileKind::Wall;
            tiles[y * width + (width - 1)] = TileKind::Wall;
        }
        Self {
            internal_width: width,
            internal_height: height,
            tiles,
            visible: vec![false; width * height],
            explored: vec![false; width * height],
        }
    }

    /// `#` is wall, anything else is floor. Rows shorter than the widest are padded with wall.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len().max(1);
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(1).max(1);
        let mut tiles = vec![TileKind::Wall; width * height];
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c != '#' {
                    tiles[y * width + x] = TileKind::Floor;
                }
            }
        }
        Self {
            internal_width: width,
            internal_height: height,
            tiles,
            visible: vec![false; width * height],
            explored: vec![false; width * height],
        }
    }

    pub fn width(&self) -> i32 {
        i32::try_from(self.internal_width).unwrap_or(i32::MAX)
    }

    pub fn height(&self) -> i32 {
        i32::try_from(self.internal_height).unwrap_or(i32::MAX)
    }

    pub fn tile_at(&self, pos: Pos) -> TileKind {
        if !self.in_bounds(pos) {
            return TileKind::Wall;
        }
        self.tiles[self.index(pos)]
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.internal_width
            && (pos.y as usize) < self.internal_height
    }

    pub fn set_tile(&mut self, pos: Pos, tile: TileKind) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.tiles[idx] = tile;
    }

    /// Static passability, ignoring actors.
    pub fn is_wall(&self, pos: Pos) -> bool {
        self.tile_at(pos) == TileKind::Wall
    }

    /// Whether light passes through this tile.
    pub fn is_visible_tile(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.tile_at(pos) != TileKind::Wall
    }

    pub fn is_opaque(&self, pos: Pos) -> bool {
        !self.is_visible_tile(pos)
    }

    pub fn clear_visible(&mut self) {
        self.visible.fill(false);
    }

    pub fn set_visible(&mut self, pos: Pos, visible: bool) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.visible[idx] = visible;
        if visible {
            self.explored[idx] = true;
        }
    }

    pub fn is_visible(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.visible[self.index(pos)]
    }

    pub fn is_explored(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.explored[self.index(pos)]
    }

    pub fn floor_tiles(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height()).flat_map(move |y| {
            (0..self.width()).map(move |x| Pos { y, x }).filter(|p| !self.is_wall(*p))
        })
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.internal_width + (pos.x as usize)
    }
}

/// Fire-and-forget receiver for combat and AI narration.
pub trait NarrationSink {
    fn message(&mut self, text: &str, color: ColorTag);
}

#[derive(Clone, Debug, Default)]
pub struct MessageLog {
    entries: Vec<Narration>,
}

impl MessageLog {
    pub fn entries(&self) -> &[Narration] {
        &self.entries
    }

    pub fn drain(&mut self) -> Vec<Narration> {
        mem::take(&mut self.entries)
    }
}

impl NarrationSink for MessageLog {
    fn message(&mut self, text: &str, color: ColorTag) {
        self.entries.push(Narration { text: text.to_string(), color });
    }
}

/// Per-turn proximity facts, rebuilt between actors so decisions see fresh state.
#[derive(Clone, Debug, Default)]
pub struct CombatCache {
    pub allies_in_combat: BTreeMap<EntityId, usize>,
}

impl CombatCache {
    pub fn allies_in_combat(&self, id: EntityId) -> usize {
        self.allies_in_combat.get(&id).copied().unwrap_or(0)
    }
}

/// Everything a turn can read or change. Passed explicitly to combat, pathing and AI code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    pub map: Map,
    pub actors: SlotMap<EntityId, Actor>,
    #[serde(default)]
    pub items: SlotMap<ItemId, Item>,
    /// The player's carried items, in pick-up order.
    #[serde(default)]
    pub inventory: Vec<Item>,
    pub player_id: Option<EntityId>,
    pub config: SimConfig,
    pub outcome: Option<RunOutcome>,
    #[serde(skip)]
    pub combat: CombatCache,
    #[serde(skip)]
    pub messages: MessageLog,
    #[serde(skip)]
    pub events: Vec<LogEvent>,
}

impl World {
    pub fn new(map: Map, config: SimConfig) -> Self {
        Self {
            map,
            actors: SlotMap::with_key(),
            items: SlotMap::with_key(),
            inventory: Vec::new(),
            player_id: None,
            config,
            outcome: None,
            combat: CombatCache::default(),
            messages: MessageLog::default(),
            events: Vec::new(),
        }
    }

    pub fn narrate(&mut self, text: &str, color: ColorTag) {
        self.messages.message(text, color);
    }

    pub fn player_pos(&self) -> Option<Pos> {
        self.player_id.and_then(|id| self.actors.get(id)).map(|actor| actor.pos)
    }

    pub fn player(&self) -> Option<&Actor> {
        self.player_id.and_then(|id| self.actors.get(id))
    }

    /// Walls plus any blocking actor.
    pub fn is_blocked(&self, pos: Pos) -> bool {
        self.map.is_wall(pos) || self.actors.values().any(|actor| actor.blocks && actor.pos == pos)
    }

    pub fn fighter_at(&self, pos: Pos) -> Option<EntityId> {
        self.actors
            .iter()
            .find(|(_, actor)| actor.pos == pos && actor.is_alive())
            .map(|(id, _)| id)
    }

    pub fn item_at(&self, pos: Pos) -> Option<ItemId> {
        self.items.iter().find(|(_, item)| item.pos == pos).map(|(id, _)| id)
    }

    pub fn display_name(&self, id: EntityId) -> String {
        self.actors.get(id).map_or_else(|| "something".to_string(), |actor| actor.name.clone())
    }

    /// Rebuilds how many fighting allies stand near each monster.
    pub fn recompute_combat_cache(&mut self) {
        let radius = self.config.ally_cache_radius;
        let fighters: Vec<(EntityId, Pos)> = self
            .actors
            .iter()
            .filter(|(_, actor)| {
                actor.is_alive()
                    && actor.ai.as_ref().is_some_and(|ai| ai.state == AiState::Fight)
            })
            .map(|(id, actor)| (id, actor.pos))
            .collect();
        self.combat.allies_in_combat.clear();
        for (id, actor) in &self.actors {
            if actor.ai.is_none() {
                continue;
            }
            let count = fighters
                .iter()
                .filter(|(other, pos)| *other != id && actor.pos.distance(*pos) <= radius)
                .count();
            self.combat.allies_in_combat.insert(id, count);
        }
    }
}
