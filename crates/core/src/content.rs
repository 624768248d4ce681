//! Hardcoded archetype, weapon and effect tables.

use crate::dice::Dice;
use crate::state::{Behavior, SpecialMoves, Weapon};
use crate::types::{Archetype, Effect};

pub struct FighterStats {
    pub hp: i32,
    pub power: i32,
    pub defense: i32,
    pub speed: u32,
    pub vision: i32,
}

pub const PLAYER_NAME: &str = "Grendel";

pub const PLAYER_STATS: FighterStats =
    FighterStats { hp: 30, power: 7, defense: 2, speed: 10, vision: 10 };

pub fn archetype_stats(archetype: Archetype) -> FighterStats {
    match archetype {
        Archetype::Warrior => FighterStats { hp: 10, power: 3, defense: 0, speed: 10, vision: 5 },
        Archetype::Berserker => FighterStats { hp: 14, power: 5, defense: 0, speed: 8, vision: 6 },
        Archetype::Skald => FighterStats { hp: 8, power: 2, defense: 0, speed: 12, vision: 6 },
        Archetype::Archer => FighterStats { hp: 9, power: 3, defense: 0, speed: 11, vision: 9 },
        Archetype::Hero => FighterStats { hp: 40, power: 8, defense: 3, speed: 9, vision: 8 },
    }
}

pub fn archetype_behavior(archetype: Archetype) -> Behavior {
    let (hearing, laziness, flee_health, flee_chance, attack_range, specials) = match archetype {
        Archetype::Warrior => (0.5, 0.4, 0.3, 0.6, 1, SpecialMoves::default()),
        Archetype::Berserker => (0.4, 0.2, 0.1, 0.1, 1, SpecialMoves::default()),
        Archetype::Skald => {
            (0.9, 0.5, 0.5, 0.8, 1, SpecialMoves { sings: true, ..SpecialMoves::default() })
        }
        Archetype::Archer => (0.6, 0.3, 0.4, 0.7, 5, SpecialMoves::default()),
        Archetype::Hero => {
            (0.7, 0.1, 0.0, 0.0, 1, SpecialMoves { roars: true, ..SpecialMoves::default() })
        }
    };
    Behavior {
        archetype,
        hearing,
        laziness,
        flee_health,
        flee_chance,
        attack_range,
        specials,
        curses: curses_for(archetype).iter().map(|line| (*line).to_string()).collect(),
    }
}

fn curses_for(archetype: Archetype) -> &'static [&'static str] {
    match archetype {
        Archetype::Warrior => &["Die, monster!", "For the mead hall!", "There it is!"],
        Archetype::Berserker => &["Blood! BLOOD!", "I will wear your hide!"],
        Archetype::Skald => &["Hear the song of your doom!", "A verse for the beast!"],
        Archetype::Archer => &["Loose!", "Mark the creature!"],
        Archetype::Hero => &["At last we meet, Grendel!", "Your reign of terror ends tonight!"],
    }
}

pub fn archetype_weapon(archetype: Archetype) -> Option<Weapon> {
    match archetype {
        Archetype::Warrior => Some(Weapon::new("spear", 1, 4, 0, &["stabs", "jabs"])),
        Archetype::Berserker => Some(Weapon::new("axe", 2, 6, 2, &["hacks", "cleaves"])),
        Archetype::Skald => None,
        Archetype::Archer => Some(Weapon::new("bow", 1, 5, 3, &["shoots", "feathers"])),
        Archetype::Hero => Some(Weapon::new("sword", 3, 8, -1, &["slashes", "cuts", "smites"])),
    }
}

pub fn archetype_title(archetype: Archetype) -> &'static str {
    match archetype {
        Archetype::Warrior => "warrior",
        Archetype::Berserker => "berserker",
        Archetype::Skald => "skald",
        Archetype::Archer => "archer",
        Archetype::Hero => "hero",
    }
}

const NAME_PREFIXES: &[&str] = &["Uth", "Threk", "Kur", "Ro", "Ar", "Co", "Wulf", "Kor", "Hroth"];
const NAME_SUFFIXES: &[&str] = &["gar", "nan", "gorn", "ruk", "", "wor", "tor"];

pub fn barbarian_name(dice: &mut dyn Dice) -> String {
    let prefix = dice.pick_index(NAME_PREFIXES.len()).map_or("Ulf", |i| NAME_PREFIXES[i]);
    let suffix = dice.pick_index(NAME_SUFFIXES.len()).map_or("", |i| NAME_SUFFIXES[i]);
    format!("{prefix}{suffix}")
}

/// Carried items beyond this stay on the floor.
pub const INVENTORY_CAPACITY: usize = 26;

pub const fn item_name(effect: Effect) -> &'static str {
    match effect {
        Effect::Heal => "healing potion",
        Effect::Lightning => "scroll of lightning bolt",
        Effect::Fireball => "scroll of fireball",
        Effect::Confuse => "scroll of confusion",
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectSpec {
    pub amount: i32,
    pub range: f64,
    pub radius: f64,
    pub turns: u32,
}

pub const fn effect_spec(effect: Effect) -> EffectSpec {
    match effect {
        Effect::Heal => EffectSpec { amount: 18, range: 0.0, radius: 0.0, turns: 0 },
        Effect::Lightning => EffectSpec { amount: 20, range: 5.0, radius: 0.0, turns: 0 },
        Effect::Fireball => EffectSpec { amount: 12, range: 0.0, radius: 3.0, turns: 0 },
        Effect::Confuse => EffectSpec { amount: 0, range: 8.0, radius: 0.0, turns: 10 },
    }
}
