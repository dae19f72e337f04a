//! Scripted offline playthrough of the built-in campaign.
//!
//! Run with: `cargo run -p voidfall-core --example escape`
//! Set GEMINI_API_KEY to see AI-enhanced narration instead of base text.

use voidfall_core::session::{GameSession, SessionConfig};
use voidfall_core::testing::ScriptedRoller;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Fixed dice so the demo always takes the same route: force the door,
    // fail into the sickbay, loot it, then escape via the corridor.
    let rolls = [4, 15];
    let mut session =
        GameSession::new(SessionConfig::new()).with_roller(ScriptedRoller::new(rolls));

    println!("=== {} ===", session.current_node().title);
    println!("{}\n", session.current_node().text);

    let route = [
        "opt_force",
        "opt_search",
        "opt_corridor",
        "opt_take_gun",
        "opt_launch",
    ];
    for choice_id in route {
        let choice_text = session
            .current_node()
            .choice(choice_id)
            .map(|c| c.text.clone())
            .unwrap_or_default();
        let turn = match session.choose(choice_id).await {
            Ok(turn) => turn,
            Err(err) => {
                eprintln!("error: {err}");
                return;
            }
        };

        println!("> {choice_text}");
        if let Some(roll) = turn.outcome.roll {
            println!("  [{roll}]");
        }
        println!("{}\n", turn.text);

        if turn.is_ending {
            break;
        }
    }

    let player = session.player();
    println!("--- Final state ---");
    println!("hp: {}/{}", player.hp, player.max_hp);
    if let Some(weapon) = &player.equipped.weapon {
        println!("weapon: {}", weapon.name);
    }
    println!(
        "inventory: {}",
        player
            .inventory
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    for entry in &player.history {
        println!("log: {entry}");
    }
}
