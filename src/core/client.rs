//! Simulated game client: the state owned by the client thread.
//!
//! **Architecture**: `Client` is plain owned data with no locks and no
//! `Arc`. Exactly one thread (the client loop in `core::runtime`) holds it
//! and mutates it, either through `tick()` or through jobs scheduled via
//! `core::invoke`. Other threads never see a reference to it; they receive
//! owned snapshots built on the client thread.
//!
//! **Why**: keeping the state single-threaded removes every data race by
//! construction. The HTTP layer pays one cross-thread round trip per
//! request instead of sharing memory.
//!
//! **Used by**: `core::runtime` (owns it), `server::api` (reads it through
//! scheduled jobs).
//!
//! # Simulation
//!
//! `tick()` is deterministic, no RNG: the character moves in a fixed
//! run/walk/rest cycle, gathers wood for the first part of every work
//! cycle, and a tonic applies a temporary stat boost that wears off one
//! point per minute. Worn equipment becomes available a few ticks after
//! start, mirroring a client that has not finished loading yet.

use log::{debug, trace};

use crate::entities::item::{Item, ItemContainer};
use crate::entities::{Skill, SkillStat, EQUIPMENT_SIZE, INVENTORY_SIZE};

// Pose animation ids, as reported on the wire.
pub const POSE_IDLE: i32 = 808;
pub const POSE_WALKING: i32 = 819;
pub const POSE_RUNNING: i32 = 824;

/// Action animation played while gathering wood.
pub const ANIM_WOODCUTTING: i32 = 879;
/// No action animation.
pub const ANIM_NONE: i32 = -1;

/// Movement cycle length in ticks: run, walk, rest.
const MOVE_CYCLE: u64 = 40;
/// Work cycle length in ticks; gathering happens in the first part.
const WORK_CYCLE: u64 = 100;
const WORK_ACTIVE: u64 = 60;
/// Woodcutting xp granted per gathering tick.
const XP_PER_GATHER_TICK: i32 = 25;
/// Ticks between boost decay steps (one point per minute at 600 ms ticks).
const BOOST_DECAY_TICKS: u64 = 100;
/// Tick at which a tonic kicks in and boosts combat stats.
const TONIC_TICK: u64 = 30;
/// Tick at which worn equipment finishes loading.
const EQUIPMENT_LOAD_TICK: u64 = 5;

/// Backpack slot holding the growing stack of logs.
const LOG_SLOT: usize = 3;

// Item ids used by the seeded character.
const ITEM_HATCHET: i32 = 121;
const ITEM_TINDERBOX: i32 = 134;
const ITEM_RATIONS: i32 = 407;
const ITEM_LOGS: i32 = 211;
const ITEM_WATERSKIN: i32 = 466;
const ITEM_TONIC: i32 = 520;

/// Seed levels and xp for the trainable skills, in `Skill::BASE` order.
const SKILL_SEED: [(i32, i32); 23] = [
    (74, 1_218_000), // Might
    (76, 1_405_320), // Vitality
    (61, 312_650),   // Agility
    (70, 780_410),   // Archery
    (68, 655_920),   // Defence
    (72, 951_370),   // Sorcery
    (55, 170_300),   // Faith
    (64, 421_800),   // Cooking
    (58, 230_140),   // Smithing
    (66, 512_430),   // Mining
    (62, 342_880),   // Fishing
    (69, 712_090),   // Woodcutting
    (49, 92_600),    // Herblore
    (57, 210_450),   // Crafting
    (52, 128_760),   // Fletching
    (60, 285_510),   // Thieving
    (63, 387_200),   // Slaying
    (54, 155_930),   // Farming
    (44, 58_470),    // Runework
    (51, 115_800),   // Hunting
    (47, 76_320),    // Construction
    (65, 462_740),   // Firemaking
    (39, 34_210),    // Alchemy
];

/// Wire name of a pose animation code. Unknown codes map to an empty
/// string, matching what consumers of the old client protocol expect.
pub fn pose_name(code: i32) -> &'static str {
    match code {
        POSE_IDLE => "idle",
        POSE_WALKING => "walking",
        POSE_RUNNING => "running",
        _ => "",
    }
}

/// Live state of the simulated client. Single-threaded by design.
#[derive(Clone, Debug)]
pub struct Client {
    ticks: u64,
    canvas_offset: (i32, i32),
    energy: i32,
    action_animation: i32,
    pose_animation: i32,
    skills: [SkillStat; 23],
    inventory: ItemContainer,
    equipment: Option<ItemContainer>,
}

impl Client {
    /// Creates the seeded character: mid-game stats, a part-full backpack,
    /// equipment not loaded yet.
    pub fn new() -> Self {
        let mut skills = [SkillStat::default(); 23];
        for (stat, (level, xp)) in skills.iter_mut().zip(SKILL_SEED) {
            *stat = SkillStat::new(level, xp);
        }

        let mut inventory = ItemContainer::new(INVENTORY_SIZE);
        inventory.set(0, Item::new(ITEM_HATCHET, 1));
        inventory.set(1, Item::new(ITEM_TINDERBOX, 1));
        inventory.set(2, Item::new(ITEM_RATIONS, 5));
        inventory.set(LOG_SLOT, Item::new(ITEM_LOGS, 12));
        inventory.set(4, Item::new(ITEM_WATERSKIN, 1));
        inventory.set(5, Item::new(ITEM_TONIC, 2));

        Self {
            ticks: 0,
            canvas_offset: (8, 28),
            energy: 100,
            action_animation: ANIM_NONE,
            pose_animation: POSE_IDLE,
            skills,
            inventory,
            equipment: None,
        }
    }

    /// Advances the simulation by one tick. Client thread only.
    pub fn tick(&mut self) {
        self.ticks += 1;

        // Movement: run hard, then walk it off, then rest.
        let phase = self.ticks % MOVE_CYCLE;
        self.pose_animation = if phase < 16 {
            POSE_RUNNING
        } else if phase < 28 {
            POSE_WALKING
        } else {
            POSE_IDLE
        };
        self.energy = match self.pose_animation {
            POSE_RUNNING => (self.energy - 2).max(0),
            POSE_WALKING => (self.energy + 1).min(100),
            _ => (self.energy + 2).min(100),
        };

        // Gathering: chop for the first part of each work cycle, bank a log
        // when the cycle's active part ends.
        let work_phase = self.ticks % WORK_CYCLE;
        if work_phase < WORK_ACTIVE {
            self.action_animation = ANIM_WOODCUTTING;
            if let Some(stat) = self.stat_mut(Skill::Woodcutting) {
                stat.add_xp(XP_PER_GATHER_TICK);
            }
        } else {
            self.action_animation = ANIM_NONE;
            if work_phase == WORK_ACTIVE {
                self.inventory.grow(LOG_SLOT, 1);
            }
        }

        // Temporary boosts wear off one point per minute.
        if self.ticks % BOOST_DECAY_TICKS == 0 {
            for stat in &mut self.skills {
                stat.decay_boost();
            }
        }

        // The tonic from the backpack kicks in once.
        if self.ticks == TONIC_TICK {
            self.apply_boost(Skill::Might, 4);
            self.apply_boost(Skill::Archery, 3);
            self.inventory.grow(5, -1);
        }

        if self.ticks == EQUIPMENT_LOAD_TICK {
            self.load_equipment();
        }

        trace!(
            "tick {}: pose={} energy={} action={}",
            self.ticks,
            pose_name(self.pose_animation),
            self.energy,
            self.action_animation
        );
    }

    /// Number of ticks processed so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Stat for `skill`. The `Overall` aggregate is computed from the
    /// trainable skills (boosts excluded, like the old protocol).
    pub fn stat(&self, skill: Skill) -> SkillStat {
        match skill.base_index() {
            Some(i) => self.skills[i],
            None => {
                let mut total = SkillStat::default();
                for stat in &self.skills {
                    total.level += stat.level;
                    total.xp = total.xp.saturating_add(stat.xp);
                }
                total
            }
        }
    }

    /// Overwrites the stat for a trainable skill; the aggregate is ignored.
    pub fn set_stat(&mut self, skill: Skill, stat: SkillStat) {
        if let Some(i) = skill.base_index() {
            self.skills[i] = stat;
        }
    }

    fn stat_mut(&mut self, skill: Skill) -> Option<&mut SkillStat> {
        skill.base_index().map(|i| &mut self.skills[i])
    }

    /// Applies a temporary boost on top of the trained level.
    pub fn apply_boost(&mut self, skill: Skill, amount: i32) {
        if let Some(stat) = self.stat_mut(skill) {
            stat.boost = amount;
            debug!("Boost applied: {} {:+}", skill.name(), amount);
        }
    }

    /// Offset of the game canvas inside the host window.
    pub fn canvas_offset(&self) -> (i32, i32) {
        self.canvas_offset
    }

    pub fn set_canvas_offset(&mut self, x: i32, y: i32) {
        self.canvas_offset = (x, y);
    }

    /// Run energy, 0..=100.
    pub fn energy(&self) -> i32 {
        self.energy
    }

    pub fn set_energy(&mut self, energy: i32) {
        self.energy = energy.clamp(0, 100);
    }

    /// Current action animation id, [`ANIM_NONE`] when idle-handed.
    pub fn action_animation(&self) -> i32 {
        self.action_animation
    }

    /// Current pose animation id (see [`pose_name`]).
    pub fn pose_animation(&self) -> i32 {
        self.pose_animation
    }

    pub fn set_pose_animation(&mut self, code: i32) {
        self.pose_animation = code;
    }

    /// The backpack. Always present.
    pub fn inventory(&self) -> &ItemContainer {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut ItemContainer {
        &mut self.inventory
    }

    /// Worn equipment, `None` until the client has finished loading it.
    pub fn equipment(&self) -> Option<&ItemContainer> {
        self.equipment.as_ref()
    }

    /// Populates the worn-equipment container with the seeded loadout.
    pub fn load_equipment(&mut self) {
        let mut worn = ItemContainer::new(EQUIPMENT_SIZE);
        worn.set(0, Item::new(523, 1)); // head
        worn.set(1, Item::new(611, 1)); // cape
        worn.set(3, Item::new(ITEM_HATCHET, 1)); // weapon
        worn.set(4, Item::new(803, 1)); // torso
        worn.set(6, Item::new(905, 1)); // legs
        worn.set(8, Item::new(1007, 1)); // feet
        worn.set(10, Item::new(1113, 40)); // quiver
        self.equipment = Some(worn);
        debug!("Equipment loaded ({} pieces worn)", self.equipment.as_ref().map_or(0, ItemContainer::used_slots));
    }

    /// Occupied backpack slots.
    pub fn used_inventory_slots(&self) -> usize {
        self.inventory.used_slots()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_character_shape() {
        let client = Client::new();
        assert_eq!(client.tick_count(), 0);
        assert_eq!(client.energy(), 100);
        assert_eq!(client.pose_animation(), POSE_IDLE);
        assert_eq!(client.action_animation(), ANIM_NONE);
        assert_eq!(client.inventory().len(), INVENTORY_SIZE);
        assert_eq!(client.used_inventory_slots(), 6);
        assert!(client.equipment().is_none());
        for skill in Skill::BASE {
            let stat = client.stat(skill);
            assert!(stat.level > 0, "{} has no level", skill.name());
            assert!(stat.xp > 0, "{} has no xp", skill.name());
            assert_eq!(stat.boost, 0);
        }
    }

    #[test]
    fn test_overall_is_the_sum_of_trainable_skills() {
        let client = Client::new();
        let total = client.stat(Skill::Overall);
        let expected_level: i32 = Skill::BASE.iter().map(|s| client.stat(*s).level).sum();
        assert_eq!(total.level, expected_level);
        assert!(total.xp > client.stat(Skill::Vitality).xp);
    }

    #[test]
    fn test_equipment_loads_a_few_ticks_in() {
        let mut client = Client::new();
        for _ in 0..EQUIPMENT_LOAD_TICK {
            client.tick();
        }
        let worn = client.equipment().expect("equipment should be loaded");
        assert_eq!(worn.len(), EQUIPMENT_SIZE);
        assert!(worn.used_slots() > 0);
    }

    #[test]
    fn test_running_drains_energy_and_rest_restores_it() {
        let mut client = Client::new();
        for _ in 0..10 {
            client.tick(); // ticks 1..=10 are in the running phase
        }
        assert_eq!(client.pose_animation(), POSE_RUNNING);
        assert!(client.energy() < 100);

        let drained = client.energy();
        for _ in 0..30 {
            client.tick(); // through walking into the rest phase
        }
        assert_eq!(client.tick_count(), 40);
        assert!(client.energy() > drained);
    }

    #[test]
    fn test_gathering_grants_xp_and_banks_logs() {
        let mut client = Client::new();
        let xp_before = client.stat(Skill::Woodcutting).xp;
        let logs_before = client.inventory().get(LOG_SLOT).quantity;
        for _ in 0..WORK_CYCLE {
            client.tick();
        }
        assert!(client.stat(Skill::Woodcutting).xp >= xp_before + 50);
        assert_eq!(client.inventory().get(LOG_SLOT).quantity, logs_before + 1);
    }

    #[test]
    fn test_tonic_boost_applies_and_decays() {
        let mut client = Client::new();
        for _ in 0..TONIC_TICK {
            client.tick();
        }
        let boosted = client.stat(Skill::Might);
        assert_eq!(boosted.boost, 4);
        assert_eq!(boosted.boosted(), boosted.level + 4);

        // Decay steps run every BOOST_DECAY_TICKS; after two of them the
        // boost has dropped by two points.
        for _ in 0..(2 * BOOST_DECAY_TICKS) {
            client.tick();
        }
        assert_eq!(client.stat(Skill::Might).boost, 2);
    }

    #[test]
    fn test_pose_names_match_the_wire_format() {
        assert_eq!(pose_name(POSE_IDLE), "idle");
        assert_eq!(pose_name(POSE_WALKING), "walking");
        assert_eq!(pose_name(POSE_RUNNING), "running");
        assert_eq!(pose_name(12345), "");
    }

    #[test]
    fn test_set_stat_ignores_the_aggregate() {
        let mut client = Client::new();
        let before = client.stat(Skill::Overall);
        client.set_stat(Skill::Overall, SkillStat::new(1, 1));
        assert_eq!(client.stat(Skill::Overall), before);

        client.set_stat(Skill::Alchemy, SkillStat::new(40, 40_000));
        assert_eq!(client.stat(Skill::Alchemy).level, 40);
    }
}
