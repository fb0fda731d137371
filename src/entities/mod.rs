//! Entities module - plain domain data, separated from the simulation engine.
//!
//! Everything here is passive: skill tables, item stacks and containers.
//! The client engine in `core` owns and mutates instances of these types;
//! the API layer serializes copies of them.

pub mod item;
pub mod skill;

pub use item::{Item, ItemContainer, EQUIPMENT_SIZE, INVENTORY_SIZE};
pub use skill::{Skill, SkillStat};
