use serde::{Deserialize, Serialize};

use crate::game::Schedule;
use crate::state::World;
use crate::types::EntityId;

pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

/// Everything needed to resume a run exactly where it stopped.
/// Narration and the event log are not part of it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: u16,
    pub seed: u64,
    /// Values already drawn from the seeded stream.
    pub dice_draws: u64,
    pub awaiting_player: bool,
    pub world: World,
    pub schedule: Schedule<EntityId>,
}
