//! Item stacks and fixed-size item containers (backpack, worn equipment).

use serde::{Deserialize, Serialize};

/// Number of backpack slots.
pub const INVENTORY_SIZE: usize = 28;

/// Number of worn-equipment slots.
pub const EQUIPMENT_SIZE: usize = 11;

// Canvas geometry of the backpack grid in the fixed client layout.
pub const INV_COLUMNS: usize = 4;
pub const INV_SLOT_W: i32 = 42;
pub const INV_SLOT_H: i32 = 36;
pub const INV_ORIGIN_X: i32 = 563;
pub const INV_ORIGIN_Y: i32 = 213;

/// Canvas position of a backpack slot (top-left corner of its cell).
pub fn inv_slot_pos(slot: usize) -> (i32, i32) {
    let col = (slot % INV_COLUMNS) as i32;
    let row = (slot / INV_COLUMNS) as i32;
    (INV_ORIGIN_X + col * INV_SLOT_W, INV_ORIGIN_Y + row * INV_SLOT_H)
}

/// A single item stack. An empty slot is `id: -1, quantity: 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i32,
    pub quantity: i32,
}

impl Item {
    pub const EMPTY: Item = Item { id: -1, quantity: 0 };

    pub fn new(id: i32, quantity: i32) -> Self {
        Self { id, quantity }
    }

    /// True when the slot holds nothing usable.
    pub fn is_empty(&self) -> bool {
        self.id <= -1 || self.quantity <= 0
    }
}

impl Default for Item {
    fn default() -> Self {
        Item::EMPTY
    }
}

/// Fixed-size container of item stacks. Slots never disappear; emptying a
/// slot resets it to [`Item::EMPTY`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemContainer {
    slots: Vec<Item>,
}

impl ItemContainer {
    pub fn new(size: usize) -> Self {
        Self { slots: vec![Item::EMPTY; size] }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots in order, empty ones included.
    pub fn items(&self) -> &[Item] {
        &self.slots
    }

    /// Stack at `slot`, or [`Item::EMPTY`] when out of range.
    pub fn get(&self, slot: usize) -> Item {
        self.slots.get(slot).copied().unwrap_or(Item::EMPTY)
    }

    /// Replaces the stack at `slot`. Out-of-range writes are ignored.
    pub fn set(&mut self, slot: usize, item: Item) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = item;
        }
    }

    /// Resets `slot` to empty.
    pub fn clear(&mut self, slot: usize) {
        self.set(slot, Item::EMPTY);
    }

    /// Adds `amount` to the stack at `slot`, leaving empty slots untouched.
    pub fn grow(&mut self, slot: usize, amount: i32) {
        if let Some(entry) = self.slots.get_mut(slot)
            && !entry.is_empty()
        {
            entry.quantity = entry.quantity.saturating_add(amount);
        }
    }

    /// Count of occupied slots: a slot is used when it has a real item id
    /// and a positive quantity.
    pub fn used_slots(&self) -> usize {
        self.slots
            .iter()
            .filter(|item| item.quantity > 0 && item.id > -1)
            .count()
    }
}
