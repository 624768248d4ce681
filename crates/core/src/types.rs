use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    pub struct EntityId;
    pub struct ItemId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self { y: self.y + dy, x: self.x + dx }
    }

    /// Straight-line distance, used for perception and noise falloff.
    pub fn distance(self, other: Pos) -> f64 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// King-move distance; two tiles are adjacent when this is 1.
    pub fn chebyshev(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    pub fn is_adjacent(self, other: Pos) -> bool {
        self.chebyshev(other) == 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
}

/// Monster families. Each one maps to a behavior configuration in `content`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Warrior,
    Berserker,
    Skald,
    Archer,
    Hero,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Monster(Archetype),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AiState {
    Sleep,
    Wander,
    Fight,
    Flee,
}

impl AiState {
    pub const ALL: [AiState; 4] = [AiState::Sleep, AiState::Wander, AiState::Fight, AiState::Flee];

    pub const fn name(self) -> &'static str {
        match self {
            AiState::Sleep => "sleep",
            AiState::Wander => "wander",
            AiState::Fight => "fight",
            AiState::Flee => "flee",
        }
    }
}

impl fmt::Display for AiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AiState {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AiState::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| GameError::UnknownAiState(s.to_string()))
    }
}

impl TryFrom<u8> for AiState {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        AiState::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| GameError::UnknownAiState(value.to_string()))
    }
}

/// Presentation hint attached to narration; the sink decides what it looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorTag {
    White,
    Red,
    Orange,
    Yellow,
    Green,
    LightBlue,
    Violet,
    Crimson,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narration {
    pub text: String,
    pub color: ColorTag,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Victory,
    Defeat,
}

/// What the player does with a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Move one tile, or attack whatever fighter stands there.
    Step { dx: i32, dy: i32 },
    Wait,
    /// Pick up the first item lying on the player's tile.
    PickUp,
    Drop { slot: usize },
    /// Use the inventory item in `slot`, optionally aimed at a tile.
    Use { slot: usize, target: Option<Pos> },
}

/// Item effects as plain data; numbers live in `content::effect_spec`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Heal,
    Lightning,
    Fireball,
    Confuse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectOutcome {
    Applied,
    Cancelled,
}

/// Result of a player action. A cancelled action leaves the player's turn open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionResult {
    Acted { cost: u64 },
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdvanceStopReason {
    PlayerTurn,
    Finished(RunOutcome),
    /// Nothing is scheduled anymore.
    Idle,
    BudgetExhausted,
}

#[derive(Clone, Debug)]
pub struct AdvanceResult {
    pub simulated_ticks: u64,
    pub turns_taken: u32,
    pub stop_reason: AdvanceStopReason,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEvent {
    Spawned { actor: EntityId, tick: u64 },
    StateChanged { actor: EntityId, from: AiState, to: AiState },
    Attacked { attacker: EntityId, target: EntityId, damage: i32 },
    Died { actor: EntityId },
    NoiseMade { origin: Pos, volume: i32 },
    NoiseHeard { actor: EntityId, origin: Pos },
    EffectUsed { effect: Effect, outcome_applied: bool },
    ItemPickedUp { effect: Effect },
    ItemDropped { effect: Effect },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("unknown AI state `{0}`")]
    UnknownAiState(String),
    #[error("unknown actor")]
    UnknownActor,
    #[error("it is not the player's turn")]
    NotPlayersTurn,
    #[error("the run has already finished")]
    Finished,
    #[error("step ({dx}, {dy}) is not a single-tile move")]
    InvalidStep { dx: i32, dy: i32 },
    #[error("no item in inventory slot {slot}")]
    InvalidSlot { slot: usize },
}
