//! Player state: health, inventory, equipment, and the action log.
//!
//! A session owns exactly one [`PlayerState`]. The rules engine is the
//! only outcome-driven mutator; the equip/unequip/consume operations here
//! are the player-initiated ones. Every rejected operation is a no-op
//! with a typed reason.

use crate::story::{Item, ItemKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Starting and maximum hit points for a fresh session.
pub const DEFAULT_MAX_HP: i32 = 20;

/// Reasons a player-initiated item operation was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayerError {
    #[error("No item '{0}' in inventory")]
    ItemNotFound(String),

    #[error("Item '{0}' cannot be equipped")]
    NotEquippable(String),

    #[error("Item '{0}' cannot be consumed")]
    NotConsumable(String),

    #[error("Nothing equipped in the {0} slot")]
    SlotEmpty(EquipSlot),
}

/// The two equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Armor,
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquipSlot::Weapon => write!(f, "weapon"),
            EquipSlot::Armor => write!(f, "armor"),
        }
    }
}

/// What the player currently has equipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
}

impl Equipment {
    fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<Item> {
        match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
        }
    }

    /// Whether the slot for this kind of item is empty. Non-equippable
    /// kinds have no slot.
    pub fn has_room_for(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Weapon => self.weapon.is_none(),
            ItemKind::Armor => self.armor.is_none(),
            ItemKind::Consumable | ItemKind::Key => false,
        }
    }
}

/// Which slot an item kind equips into, if any.
fn slot_for(kind: ItemKind) -> Option<EquipSlot> {
    match kind {
        ItemKind::Weapon => Some(EquipSlot::Weapon),
        ItemKind::Armor => Some(EquipSlot::Armor),
        ItemKind::Consumable | ItemKind::Key => None,
    }
}

/// Mutable per-session player state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub hp: i32,
    pub max_hp: i32,
    pub inventory: Vec<Item>,
    pub equipped: Equipment,
    /// Append-only log of human-readable outcome entries.
    pub history: Vec<String>,
    pub current_node_id: String,
    /// Nodes whose rewards have already been granted. Only consulted under
    /// the grant-once reward policy.
    #[serde(default)]
    pub claimed_rewards: HashSet<String>,
}

impl PlayerState {
    /// Fresh state at the given start node: full health, empty hands.
    pub fn new(start_node_id: impl Into<String>) -> Self {
        Self {
            hp: DEFAULT_MAX_HP,
            max_hp: DEFAULT_MAX_HP,
            inventory: Vec::new(),
            equipped: Equipment::default(),
            history: Vec::new(),
            current_node_id: start_node_id.into(),
            claimed_rewards: HashSet::new(),
        }
    }

    /// Reduce hp, floored at zero.
    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }

    /// Restore hp, clamped to the maximum. Returns the amount actually
    /// restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }

    pub fn is_down(&self) -> bool {
        self.hp == 0
    }

    /// Append an entry to the action log.
    pub fn log(&mut self, entry: impl Into<String>) {
        self.history.push(entry.into());
    }

    /// Add an item to the inventory. Duplicates by id are allowed.
    pub fn grant(&mut self, item: Item) {
        self.inventory.push(item);
    }

    pub fn has_item(&self, item_id: &str) -> bool {
        self.inventory.iter().any(|i| i.id == item_id)
    }

    /// Attack power: equipped weapon damage plus a bare-hands base of 1.
    pub fn attack_power(&self) -> i32 {
        self.equipped.weapon.as_ref().map_or(0, |w| w.value) + 1
    }

    /// Protection from equipped armor.
    pub fn protection(&self) -> i32 {
        self.equipped.armor.as_ref().map_or(0, |a| a.value)
    }

    fn inventory_index(&self, item_id: &str) -> Result<usize, PlayerError> {
        self.inventory
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| PlayerError::ItemNotFound(item_id.to_string()))
    }

    /// Equip a weapon or armor piece from the inventory. Any previous
    /// occupant of the slot returns to the inventory, so an item is never
    /// in both places at once.
    pub fn equip(&mut self, item_id: &str) -> Result<(), PlayerError> {
        let index = self.inventory_index(item_id)?;
        let slot = slot_for(self.inventory[index].kind)
            .ok_or_else(|| PlayerError::NotEquippable(item_id.to_string()))?;

        let item = self.inventory.remove(index);
        if let Some(previous) = self.equipped.slot_mut(slot).replace(item) {
            self.inventory.push(previous);
        }
        Ok(())
    }

    /// Return the slot's occupant to the inventory.
    pub fn unequip(&mut self, slot: EquipSlot) -> Result<(), PlayerError> {
        let item = self
            .equipped
            .slot_mut(slot)
            .take()
            .ok_or(PlayerError::SlotEmpty(slot))?;
        self.inventory.push(item);
        Ok(())
    }

    /// Use up a consumable, healing by its value (clamped to max hp).
    /// Returns the hp actually restored.
    pub fn consume(&mut self, item_id: &str) -> Result<i32, PlayerError> {
        let index = self.inventory_index(item_id)?;
        if self.inventory[index].kind != ItemKind::Consumable {
            return Err(PlayerError::NotConsumable(item_id.to_string()));
        }
        let item = self.inventory.remove(index);
        Ok(self.heal(item.value))
    }
}
