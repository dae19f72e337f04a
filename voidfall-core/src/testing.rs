//! Deterministic test utilities: a scripted dice roller and a harness for
//! driving playthroughs without randomness or network access.

use crate::dice::DiceRoller;
use crate::narrator::Narrate;
use crate::session::{GameSession, SessionConfig, SessionError, TurnRecord};
use crate::story::StoryGraph;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Default roll value once a scripted queue runs dry. Succeeds against
/// every difficulty the built-in campaign uses except 12 and 14.
pub const EXHAUSTED_ROLL: u8 = 10;

/// A roller that returns pre-queued values, then [`EXHAUSTED_ROLL`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    queue: VecDeque<u8>,
}

impl ScriptedRoller {
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        Self {
            queue: rolls.into_iter().collect(),
        }
    }

    pub fn queue(&mut self, roll: u8) {
        self.queue.push_back(roll);
    }

    /// Scripted values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DiceRoller for ScriptedRoller {
    fn roll_d20(&mut self) -> u8 {
        self.queue.pop_front().unwrap_or(EXHAUSTED_ROLL)
    }
}

/// A narration source that replays canned responses, then falls back to
/// the base text once the queue runs dry (so `failing()` behaves like a
/// gateway that always errors). Clones share the queue, letting a test
/// keep a handle after handing the mock to a session.
#[derive(Clone, Default)]
pub struct MockNarrator {
    responses: Arc<Mutex<VecDeque<String>>>,
}

impl MockNarrator {
    pub fn new(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.into_iter().map(Into::into).collect(),
            )),
        }
    }

    /// A narrator whose every call fails, exercising the base-text
    /// fallback.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Canned responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Narrate for MockNarrator {
    fn enhance<'a>(
        &'a self,
        base_text: &'a str,
        _action_text: &'a str,
        _roll: u8,
        _success: bool,
    ) -> Pin<Box<dyn Future<Output = String> + Send + 'a>> {
        let text = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| base_text.to_string());
        Box::pin(std::future::ready(text))
    }
}

/// An offline session with fully scripted dice, plus assertion helpers
/// that point at the failing call site.
pub struct TestHarness {
    session: GameSession,
}

impl TestHarness {
    /// Harness over the built-in campaign.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::new())
    }

    pub fn with_graph(graph: StoryGraph) -> Self {
        Self::with_config(SessionConfig::new().with_graph(graph))
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            session: GameSession::offline(config).with_roller(ScriptedRoller::default()),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    /// Take a choice with a forced roll value.
    pub fn choose_with_roll(&mut self, choice_id: &str, roll: u8) -> TurnRecord {
        self.session.set_roller(ScriptedRoller::new([roll]));
        self.choose(choice_id)
    }

    /// Take a choice that must not require a roll.
    pub fn choose(&mut self, choice_id: &str) -> TurnRecord {
        match self.session.resolve_choice(choice_id) {
            Ok(record) => record,
            Err(err) => panic!("choice '{choice_id}' failed: {err}"),
        }
    }

    /// Take a choice expecting it to be rejected.
    pub fn choose_expecting_error(&mut self, choice_id: &str) -> SessionError {
        match self.session.resolve_choice(choice_id) {
            Ok(record) => panic!(
                "choice '{choice_id}' unexpectedly succeeded, moved to '{}'",
                record.node_id
            ),
            Err(err) => err,
        }
    }

    #[track_caller]
    pub fn assert_hp(&self, expected: i32) {
        let actual = self.session.player().hp;
        assert_eq!(actual, expected, "expected {expected} hp, player has {actual}");
    }

    #[track_caller]
    pub fn assert_at_node(&self, node_id: &str) {
        let actual = &self.session.player().current_node_id;
        assert_eq!(
            actual, node_id,
            "expected player at '{node_id}', found at '{actual}'"
        );
    }

    #[track_caller]
    pub fn assert_has_item(&self, item_id: &str) {
        assert!(
            self.session.player().has_item(item_id),
            "expected '{item_id}' in inventory, have: {:?}",
            self.session
                .player()
                .inventory
                .iter()
                .map(|i| i.id.as_str())
                .collect::<Vec<_>>()
        );
    }

    #[track_caller]
    pub fn assert_equipped_weapon(&self, item_id: &str) {
        let actual = self
            .session
            .player()
            .equipped
            .weapon
            .as_ref()
            .map(|w| w.id.as_str());
        assert_eq!(
            actual,
            Some(item_id),
            "expected '{item_id}' equipped as weapon"
        );
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_roller_replays_then_defaults() {
        let mut roller = ScriptedRoller::new([1, 20]);
        assert_eq!(roller.roll_d20(), 1);
        assert_eq!(roller.roll_d20(), 20);
        assert_eq!(roller.roll_d20(), EXHAUSTED_ROLL);
        assert_eq!(roller.remaining(), 0);

        roller.queue(7);
        assert_eq!(roller.roll_d20(), 7);
    }

    #[test]
    fn test_harness_drives_a_playthrough() {
        let mut harness = TestHarness::new();
        harness.choose_with_roll("opt_force", 15);
        harness.assert_at_node("corridor_safe");
        harness.assert_equipped_weapon("laser_pistol");
        harness.assert_hp(20);

        harness.choose("opt_take_gun");
        harness.assert_at_node("bridge");
    }

    #[tokio::test]
    async fn test_mock_narrator_replays_then_falls_back() {
        let mock = MockNarrator::new(["Sparks cascade from the panel."]);
        assert_eq!(
            mock.enhance("base", "act", 12, true).await,
            "Sparks cascade from the panel."
        );
        assert_eq!(mock.enhance("base", "act", 12, true).await, "base");
        assert_eq!(mock.remaining(), 0);

        assert_eq!(
            MockNarrator::failing().enhance("base", "act", 3, false).await,
            "base"
        );
    }

    #[test]
    fn test_harness_reports_rejected_choice() {
        let mut harness = TestHarness::new();
        let err = harness.choose_expecting_error("opt_warp_drive");
        assert!(matches!(err, SessionError::UnknownChoice(_)));
    }
}
