//! Game session: one player walking one story graph.
//!
//! State mutation is synchronous and completes before any narration call
//! goes out. Narration is a separate async step keyed to a turn sequence
//! number, so a slow response that lands after a restart (or a later turn)
//! is detected as stale and replaced by the node's base text.

use crate::content::voidfall_campaign;
use crate::dice::{DiceRoller, RandomRoller};
use crate::narrator::{Narrate, Narrator, NarratorConfig};
use crate::player::{EquipSlot, PlayerError, PlayerState};
use crate::rules::{Effect, Outcome, RewardPolicy, RulesEngine};
use crate::story::{ContentError, StoryGraph, StoryNode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("No choice '{0}' at the current node")]
    UnknownChoice(String),

    #[error("The story has ended; restart to continue playing")]
    SessionEnded,

    #[error("Choice leads to unknown node '{0}'")]
    UnknownNode(String),

    #[error(transparent)]
    Player(#[from] PlayerError),
}

/// Everything configurable about a session, with a playable default.
pub struct SessionConfig {
    graph: StoryGraph,
    reward_policy: RewardPolicy,
    auto_equip: bool,
    narrator: NarratorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    /// The built-in campaign with default rules.
    pub fn new() -> Self {
        Self {
            graph: voidfall_campaign(),
            reward_policy: RewardPolicy::default(),
            auto_equip: true,
            narrator: NarratorConfig::default(),
        }
    }

    pub fn with_graph(mut self, graph: StoryGraph) -> Self {
        self.graph = graph;
        self
    }

    pub fn with_reward_policy(mut self, policy: RewardPolicy) -> Self {
        self.reward_policy = policy;
        self
    }

    pub fn without_auto_equip(mut self) -> Self {
        self.auto_equip = false;
        self
    }

    pub fn with_narrator_config(mut self, config: NarratorConfig) -> Self {
        self.narrator = config;
        self
    }

    fn rules(&self) -> RulesEngine {
        let engine = RulesEngine::new().with_reward_policy(self.reward_policy);
        if self.auto_equip {
            engine
        } else {
            engine.without_auto_equip()
        }
    }
}

/// The synchronous half of a turn: what happened, pinned to the session
/// sequence it happened at. Feed it to [`GameSession::narrate`] for text.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    seq: u64,
    pub outcome: Outcome,
    pub effects: Vec<Effect>,
    pub choice_text: String,
    pub node_id: String,
    /// The arrival node's unenhanced text.
    pub base_text: String,
}

/// A fully narrated turn, ready for display.
#[derive(Debug, Clone)]
pub struct Turn {
    pub outcome: Outcome,
    pub effects: Vec<Effect>,
    pub text: String,
    pub node_id: String,
    pub is_ending: bool,
}

/// One playthrough in progress.
pub struct GameSession {
    graph: StoryGraph,
    rules: RulesEngine,
    player: PlayerState,
    narrator: Option<Box<dyn Narrate>>,
    roller: Box<dyn DiceRoller + Send>,
    seq: u64,
}

impl GameSession {
    /// Start a session; narration is enabled if `GEMINI_API_KEY` is set
    /// and silently absent otherwise.
    pub fn new(config: SessionConfig) -> Self {
        let narrator = Narrator::from_env()
            .ok()
            .map(|n| Box::new(n.with_config(config.narrator.clone())) as Box<dyn Narrate>);
        Self::build(config, narrator)
    }

    /// Start a session with narration disabled regardless of environment.
    pub fn offline(config: SessionConfig) -> Self {
        Self::build(config, None)
    }

    /// Start a session with an explicit narrator.
    pub fn with_narrator(config: SessionConfig, narrator: Narrator) -> Self {
        let narrator = narrator.with_config(config.narrator.clone());
        Self::build(config, Some(Box::new(narrator)))
    }

    /// Start a session with a custom narration source, e.g. a scripted
    /// one in tests.
    pub fn with_narration_source(config: SessionConfig, source: impl Narrate + 'static) -> Self {
        Self::build(config, Some(Box::new(source)))
    }

    fn build(config: SessionConfig, narrator: Option<Box<dyn Narrate>>) -> Self {
        let rules = config.rules();
        let player = PlayerState::new(config.graph.start_id());
        Self {
            graph: config.graph,
            rules,
            player,
            narrator,
            roller: Box::new(RandomRoller),
            seq: 0,
        }
    }

    /// Replace the dice roller, e.g. with a scripted one.
    pub fn with_roller(mut self, roller: impl DiceRoller + Send + 'static) -> Self {
        self.set_roller(roller);
        self
    }

    /// Replace the dice roller on a running session.
    pub fn set_roller(&mut self, roller: impl DiceRoller + Send + 'static) {
        self.roller = Box::new(roller);
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    /// The node the player is standing at.
    pub fn current_node(&self) -> &StoryNode {
        self.graph
            .get(&self.player.current_node_id)
            .expect("player position always names a graph node")
    }

    pub fn is_ended(&self) -> bool {
        self.current_node().is_ending
    }

    /// Resolve a choice and apply its consequences. Purely synchronous;
    /// the player state is fully updated when this returns. On error the
    /// session is unchanged.
    pub fn resolve_choice(&mut self, choice_id: &str) -> Result<TurnRecord, SessionError> {
        if self.is_ended() {
            return Err(SessionError::SessionEnded);
        }
        let choice = {
            let node = self.current_node();
            node.choice(choice_id)
                .ok_or_else(|| SessionError::UnknownChoice(choice_id.to_string()))?
                .clone()
        };

        let outcome = self.rules.resolve(&choice, self.roller.as_mut());
        let target = self
            .graph
            .get(&outcome.target_node_id)
            .ok_or_else(|| SessionError::UnknownNode(outcome.target_node_id.clone()))?
            .clone();

        let effects = self
            .rules
            .apply_transition(&mut self.player, &choice, &outcome, &target);
        self.seq += 1;

        Ok(TurnRecord {
            seq: self.seq,
            outcome,
            effects,
            choice_text: choice.text,
            node_id: target.id,
            base_text: target.text,
        })
    }

    /// Whether a record still belongs to the session's latest turn.
    pub fn is_current(&self, turn: &TurnRecord) -> bool {
        turn.seq == self.seq
    }

    /// Produce the display text for a turn. Uses the narration source when
    /// one is configured and the turn involved a roll; falls back to the
    /// node's base text when narration is unavailable or fails. The result
    /// is checked against the session's latest turn after it arrives, so a
    /// narration that lands once the session has moved on (a later turn or
    /// a restart) is discarded in favor of the base text.
    pub async fn narrate(&self, turn: &TurnRecord) -> String {
        let (narrator, roll) = match (&self.narrator, turn.outcome.roll) {
            (Some(narrator), Some(roll)) => (narrator, roll),
            _ => return turn.base_text.clone(),
        };
        let text = narrator
            .enhance(
                &turn.base_text,
                &turn.choice_text,
                roll.value,
                turn.outcome.success,
            )
            .await;
        if self.is_current(turn) {
            text
        } else {
            turn.base_text.clone()
        }
    }

    /// Resolve a choice and narrate it in one call.
    pub async fn choose(&mut self, choice_id: &str) -> Result<Turn, SessionError> {
        let record = self.resolve_choice(choice_id)?;
        let text = self.narrate(&record).await;
        let is_ending = self.is_ended();
        Ok(Turn {
            outcome: record.outcome,
            effects: record.effects,
            text,
            node_id: record.node_id,
            is_ending,
        })
    }

    pub fn equip_item(&mut self, item_id: &str) -> Result<(), SessionError> {
        Ok(self.player.equip(item_id)?)
    }

    pub fn unequip_slot(&mut self, slot: EquipSlot) -> Result<(), SessionError> {
        Ok(self.player.unequip(slot)?)
    }

    /// Returns the hp restored.
    pub fn consume_item(&mut self, item_id: &str) -> Result<i32, SessionError> {
        Ok(self.player.consume(item_id)?)
    }

    /// Reset to a fresh playthrough of the same graph. Any narration still
    /// in flight for earlier turns becomes stale.
    pub fn restart(&mut self) {
        self.player = PlayerState::new(self.graph.start_id());
        self.seq += 1;
    }
}
