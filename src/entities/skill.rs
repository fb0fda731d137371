//! Skill table and per-skill progress values.
//!
//! The skill domain is fixed: 23 trainable skills plus the `Overall`
//! aggregate. Stat snapshots report the trainable skills only; the
//! aggregate is computed on demand from the others.

use serde::{Deserialize, Serialize};

/// Every skill known to the client, including the `Overall` aggregate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    /// Aggregate of all trainable skills (total level / total xp).
    Overall,
    Might,
    Vitality,
    Agility,
    Archery,
    Defence,
    Sorcery,
    Faith,
    Cooking,
    Smithing,
    Mining,
    Fishing,
    Woodcutting,
    Herblore,
    Crafting,
    Fletching,
    Thieving,
    Slaying,
    Farming,
    Runework,
    Hunting,
    Construction,
    Firemaking,
    Alchemy,
}

impl Skill {
    /// Every skill, aggregate included.
    pub const ALL: [Skill; 24] = [
        Skill::Overall,
        Skill::Might,
        Skill::Vitality,
        Skill::Agility,
        Skill::Archery,
        Skill::Defence,
        Skill::Sorcery,
        Skill::Faith,
        Skill::Cooking,
        Skill::Smithing,
        Skill::Mining,
        Skill::Fishing,
        Skill::Woodcutting,
        Skill::Herblore,
        Skill::Crafting,
        Skill::Fletching,
        Skill::Thieving,
        Skill::Slaying,
        Skill::Farming,
        Skill::Runework,
        Skill::Hunting,
        Skill::Construction,
        Skill::Firemaking,
        Skill::Alchemy,
    ];

    /// The trainable skills, in canonical display order (no aggregate).
    pub const BASE: [Skill; 23] = [
        Skill::Might,
        Skill::Vitality,
        Skill::Agility,
        Skill::Archery,
        Skill::Defence,
        Skill::Sorcery,
        Skill::Faith,
        Skill::Cooking,
        Skill::Smithing,
        Skill::Mining,
        Skill::Fishing,
        Skill::Woodcutting,
        Skill::Herblore,
        Skill::Crafting,
        Skill::Fletching,
        Skill::Thieving,
        Skill::Slaying,
        Skill::Farming,
        Skill::Runework,
        Skill::Hunting,
        Skill::Construction,
        Skill::Firemaking,
        Skill::Alchemy,
    ];

    /// True for the computed `Overall` aggregate.
    pub fn is_aggregate(self) -> bool {
        self == Skill::Overall
    }

    /// Index into per-skill storage for trainable skills, `None` for the aggregate.
    pub fn base_index(self) -> Option<usize> {
        (self as usize).checked_sub(1)
    }

    /// Display name used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Skill::Overall => "Overall",
            Skill::Might => "Might",
            Skill::Vitality => "Vitality",
            Skill::Agility => "Agility",
            Skill::Archery => "Archery",
            Skill::Defence => "Defence",
            Skill::Sorcery => "Sorcery",
            Skill::Faith => "Faith",
            Skill::Cooking => "Cooking",
            Skill::Smithing => "Smithing",
            Skill::Mining => "Mining",
            Skill::Fishing => "Fishing",
            Skill::Woodcutting => "Woodcutting",
            Skill::Herblore => "Herblore",
            Skill::Crafting => "Crafting",
            Skill::Fletching => "Fletching",
            Skill::Thieving => "Thieving",
            Skill::Slaying => "Slaying",
            Skill::Farming => "Farming",
            Skill::Runework => "Runework",
            Skill::Hunting => "Hunting",
            Skill::Construction => "Construction",
            Skill::Firemaking => "Firemaking",
            Skill::Alchemy => "Alchemy",
        }
    }
}

/// Progress values for a single skill.
///
/// `level` is the permanent trained level; `boost` is a temporary offset
/// (potions, prayers) that wears off over time. The effective level seen
/// in-game is `boosted()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillStat {
    pub level: i32,
    pub boost: i32,
    pub xp: i32,
}

impl SkillStat {
    pub fn new(level: i32, xp: i32) -> Self {
        Self { level, boost: 0, xp }
    }

    /// Effective level including the temporary boost.
    pub fn boosted(&self) -> i32 {
        self.level + self.boost
    }

    /// Moves the temporary boost one point back toward zero.
    pub fn decay_boost(&mut self) {
        self.boost -= self.boost.signum();
    }

    /// Adds experience without affecting the level.
    pub fn add_xp(&mut self, amount: i32) {
        self.xp = self.xp.saturating_add(amount);
    }
}
