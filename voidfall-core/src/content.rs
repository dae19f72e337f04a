//! Built-in campaign: escape from the dying starship Voidfall.
//!
//! Content is data, not code. This module exists so the engine ships with
//! a playable graph; sessions can load any other validated [`StoryGraph`]
//! instead.

use crate::story::{Choice, Item, ItemKind, StoryGraph, StoryNode};
use lazy_static::lazy_static;

lazy_static! {
    /// Every item that appears in the built-in campaign, by id.
    pub static ref SHIP_ITEMS: Vec<Item> = vec![
        Item::new(
            "pipe",
            "Rusty Pipe",
            "Better than nothing.",
            ItemKind::Weapon,
            2,
        ),
        Item::new(
            "laser_pistol",
            "Laser Pistol",
            "Federation standard sidearm.",
            ItemKind::Weapon,
            5,
        ),
        Item::new(
            "medkit",
            "Nano Medkit",
            "Restores 10 HP.",
            ItemKind::Consumable,
            10,
        ),
        Item::new(
            "red_keycard",
            "Red Keycard",
            "Grants access to maintenance.",
            ItemKind::Key,
            0,
        ),
        Item::new(
            "spacesuit",
            "EVA Suit",
            "Protects against vacuum.",
            ItemKind::Armor,
            3,
        ),
    ];
}

/// Look up a campaign item by id.
pub fn get_item(id: &str) -> Option<&'static Item> {
    SHIP_ITEMS.iter().find(|item| item.id == id)
}

fn item(id: &str) -> Item {
    get_item(id)
        .cloned()
        .expect("campaign references only items in SHIP_ITEMS")
}

/// The built-in escape scenario. Eleven nodes, one ending.
pub fn voidfall_campaign() -> StoryGraph {
    let nodes = vec![
        StoryNode::new(
            "start",
            "The Awakening",
            "You wake in a cryo chamber. The air is ice cold and smells of ozone. \
             Red emergency lights pulse rhythmically in the dark. The ship's AI \
             announces in a flat monotone: \"Critical system collapse. Evacuate \
             immediately.\"",
        )
        .with_choice(
            Choice::new("opt_force", "Force the door open", "corridor_safe")
                .with_failure("sickbay_injured")
                .with_difficulty(10),
        )
        .with_choice(
            Choice::new("opt_hack", "Hack the control panel", "corridor_stealth")
                .with_failure("start_fail")
                .with_difficulty(12),
        ),
        StoryNode::new(
            "start_fail",
            "Technical Failure",
            "You fumble with the wiring. Sparks fly and give you a vicious shock. \
             The door stays locked for a long moment before the emergency release \
             finally triggers on its own.",
        )
        .with_choice(Choice::new(
            "opt_recover",
            "Stumble out into the corridor",
            "corridor_safe",
        )),
        StoryNode::new(
            "sickbay_injured",
            "Brute Force",
            "You smash through the glass. It shatters and cuts your arm, but you \
             tumble out. You find yourself in the sickbay. The place is a wreck.",
        )
        .with_choice(
            Choice::new("opt_search", "Search for supplies", "sickbay_looted").with_difficulty(5),
        )
        .with_choice(Choice::new(
            "opt_leave",
            "Leave the room immediately",
            "corridor_safe",
        )),
        StoryNode::new(
            "sickbay_looted",
            "Supplies",
            "You rummage through the cabinets and find a medical kit among the debris.",
        )
        .with_reward(item("medkit"))
        .with_choice(Choice::new(
            "opt_corridor",
            "Step out into the corridor",
            "corridor_safe",
        )),
        StoryNode::new(
            "corridor_stealth",
            "Silent Exit",
            "The door slides open without a sound. You step out into the corridor. \
             A security drone hovers further down the hall, facing away.",
        )
        .with_choice(
            Choice::new("opt_sneak", "Sneak past the drone", "bridge").with_difficulty(14),
        )
        .with_choice(
            Choice::new("opt_attack", "Ambush the drone", "drone_fight").with_difficulty(8),
        ),
        StoryNode::new(
            "corridor_safe",
            "Main Corridor",
            "The main corridor is thick with smoke. Debris blocks the way to the \
             engine room. You see a dead guard still gripping a weapon.",
        )
        .with_reward(item("laser_pistol"))
        .with_choice(Choice::new(
            "opt_take_gun",
            "Take the pistol and head for the Bridge",
            "bridge",
        ))
        .with_choice(
            Choice::new("opt_maintenance", "Look for a maintenance shaft", "maintenance")
                .with_difficulty(10),
        ),
        StoryNode::new(
            "maintenance",
            "Dark Shafts",
            "It is dark and cramped. You find the body of a technician who got \
             stuck down here.",
        )
        .with_reward(item("red_keycard"))
        .with_reward(item("pipe"))
        .with_choice(Choice::new("opt_climb", "Climb up to the Bridge", "bridge")),
        StoryNode::new(
            "drone_fight",
            "Combat!",
            "You throw yourself at the drone. It spins around and starts charging \
             its laser cannon.",
        )
        .with_choice(
            Choice::new("opt_dodge", "Duck and strike", "bridge")
                .with_failure("bridge_injured")
                .with_difficulty(12),
        ),
        StoryNode::new(
            "bridge",
            "The Bridge",
            "You reach the command deck. The captain's chair is empty. The main \
             screen shows a black hole slowly swallowing the stars. One last \
             escape pod stands ready.",
        )
        .with_choice(
            Choice::new("opt_launch", "Launch the escape pod", "end_survival").with_difficulty(0),
        ),
        StoryNode::new(
            "bridge_injured",
            "Wounded Arrival",
            "You defeated the drone but took a laser burn. You stagger onto the \
             Bridge, exhausted.",
        )
        .with_choice(Choice::new(
            "opt_launch",
            "Launch the escape pod",
            "end_survival",
        )),
        StoryNode::new(
            "end_survival",
            "The Escape",
            "The pod launches an instant before the ship is torn apart by the \
             gravitational forces. You drift in silence through space, waiting \
             for rescue. You have survived.",
        )
        .ending(),
    ];

    StoryGraph::new(nodes, "start").expect("built-in campaign must validate")
}
