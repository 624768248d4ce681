pub mod config;
pub mod content;
pub mod dice;
pub mod game;
pub mod snapshot;
pub mod snapshot_file;
pub mod state;
pub mod types;

pub use config::{ConfigError, SimConfig};
pub use dice::{Dice, LoadedDice, SeededDice};
pub use game::Game;
pub use snapshot::{SNAPSHOT_FORMAT_VERSION, Snapshot};
pub use snapshot_file::{SnapshotLoadError, load_snapshot_from_file, save_snapshot};
pub use state::{Actor, AiRecord, Fighter, Item, Map, World};
pub use types::*;
