//! Integration tests that call the real Gemini API.
//!
//! These tests require GEMINI_API_KEY to be set (via .env file or environment).
//! Run with: `cargo test -p voidfall-core --test api_integration -- --ignored`
//!
//! These are marked #[ignore] by default to avoid:
//! - API costs in CI
//! - Test failures when no API key is available
//! - Slow test runs (API calls take seconds)

use voidfall_core::narrator::{Narrator, NarratorConfig};
use voidfall_core::session::{GameSession, SessionConfig};
use voidfall_core::testing::ScriptedRoller;
use voidfall_core::voidfall_campaign;

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

/// Check if API key is available
fn has_api_key() -> bool {
    std::env::var("GEMINI_API_KEY").is_ok()
}

#[tokio::test]
#[ignore] // Run with: cargo test -p voidfall-core --test api_integration -- --ignored
async fn test_enhance_produces_fresh_text() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: GEMINI_API_KEY not set");
        return;
    }

    let narrator = Narrator::from_env().expect("Failed to create narrator");
    let base = "The main corridor is thick with smoke. Debris blocks the way \
                to the engine room.";
    let text = narrator
        .enhance(base, "Force the door open", 17, true)
        .await;

    println!("Narration: {text}");
    assert!(!text.is_empty());
    // The model should rewrite rather than echo.
    assert_ne!(text, base);
}

#[tokio::test]
#[ignore]
async fn test_enhance_respects_language_config() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: GEMINI_API_KEY not set");
        return;
    }

    let narrator = Narrator::from_env()
        .expect("Failed to create narrator")
        .with_config(NarratorConfig::new().with_language("Swedish"));
    let text = narrator
        .enhance(
            "You wake in a cryo chamber. The air is ice cold.",
            "Hack the control panel",
            3,
            false,
        )
        .await;

    println!("Swedish narration: {text}");
    assert!(!text.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_narrated_turn_through_session() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: GEMINI_API_KEY not set");
        return;
    }

    let mut session =
        GameSession::new(SessionConfig::new()).with_roller(ScriptedRoller::new([17]));
    let turn = session.choose("opt_force").await.expect("choice resolves");

    println!("Turn text: {}", turn.text);
    assert_eq!(turn.node_id, "corridor_safe");
    assert!(!turn.text.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_summarize_node() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: GEMINI_API_KEY not set");
        return;
    }

    let narrator = Narrator::from_env().expect("Failed to create narrator");
    let graph = voidfall_campaign();
    let summary = narrator.summarize_node(graph.start()).await;

    println!("Summary: {summary}");
    assert!(!summary.is_empty());
    // 10-word budget, allow some slack for model drift.
    assert!(summary.split_whitespace().count() <= 15);
}
