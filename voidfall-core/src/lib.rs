//! Branching sci-fi narrative engine with dice-based choice resolution
//! and optional AI-enhanced narration.
//!
//! A story is a validated directed graph of nodes ([`story`]). The player
//! ([`player`]) walks it one choice at a time; choices with a difficulty
//! are settled by a d20 roll ([`dice`]) under fixed transition rules
//! ([`rules`]). A [`session::GameSession`] ties the pieces together and,
//! when a Gemini API key is available, routes arrival text through the
//! [`narrator`] for dramatic rewriting. Narration is fail-soft: the game
//! always plays, with or without the model.
//!
//! # Quick start
//!
//! ```ignore
//! use voidfall_core::session::{GameSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut session = GameSession::new(SessionConfig::new());
//!     println!("{}", session.current_node().text);
//!
//!     let turn = session.choose("opt_force").await.unwrap();
//!     println!("{}", turn.text);
//!     println!("hp: {}", session.player().hp);
//! }
//! ```

pub mod content;
pub mod dice;
pub mod narrator;
pub mod player;
pub mod rules;
pub mod session;
pub mod story;
pub mod testing;

pub use content::voidfall_campaign;
pub use dice::{DiceRoller, RandomRoller, Roll};
pub use narrator::{Narrate, Narrator, NarratorConfig};
pub use player::{EquipSlot, PlayerError, PlayerState, DEFAULT_MAX_HP};
pub use rules::{Effect, Outcome, RewardPolicy, RulesEngine, FAILURE_PENALTY};
pub use session::{GameSession, SessionConfig, SessionError, Turn, TurnRecord};
pub use story::{Choice, ContentError, Item, ItemKind, StoryGraph, StoryNode};
