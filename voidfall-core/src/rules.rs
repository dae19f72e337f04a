//! Choice resolution and state transition rules.
//!
//! [`RulesEngine::resolve`] turns a choice into an [`Outcome`] (rolling a
//! d20 when the choice asks for one), and [`RulesEngine::apply_transition`]
//! applies that outcome to the player state, returning the ordered list of
//! [`Effect`]s that occurred. Splitting the two keeps the roll injectable
//! and the mutation step deterministic.

use crate::dice::{DiceRoller, Roll};
use crate::player::{EquipSlot, PlayerState};
use crate::story::{Choice, Item, StoryNode};
use serde::{Deserialize, Serialize};

/// Hit points lost when a skill check fails.
pub const FAILURE_PENALTY: i32 = 2;

/// The result of resolving a choice, before any state is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    /// Present only when the choice required a skill check.
    pub roll: Option<Roll>,
    pub target_node_id: String,
}

/// Whether node rewards are granted on every visit or only the first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardPolicy {
    /// Grant the node's rewards every time the player arrives there.
    #[default]
    EveryEntry,
    /// Grant each node's rewards at most once per session.
    OncePerNode,
}

/// One observable state change produced by a transition, in the order it
/// was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    RollMade { roll: Roll, choice_text: String },
    HpChanged { amount: i32, new_hp: i32 },
    ItemGranted { item: Item },
    ItemEquipped { item_id: String, slot: EquipSlot },
    MovedTo { node_id: String },
}

/// Applies outcomes to player state under a configured policy.
#[derive(Debug, Clone)]
pub struct RulesEngine {
    reward_policy: RewardPolicy,
    auto_equip: bool,
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine {
    pub fn new() -> Self {
        Self {
            reward_policy: RewardPolicy::default(),
            auto_equip: true,
        }
    }

    pub fn with_reward_policy(mut self, policy: RewardPolicy) -> Self {
        self.reward_policy = policy;
        self
    }

    /// Disable automatic equipping of granted weapons and armor into
    /// empty slots.
    pub fn without_auto_equip(mut self) -> Self {
        self.auto_equip = false;
        self
    }

    /// Resolve a choice. Choices without a skill check (no difficulty, or
    /// difficulty zero) succeed unconditionally and consume no roll.
    pub fn resolve<R: DiceRoller + ?Sized>(&self, choice: &Choice, roller: &mut R) -> Outcome {
        if !choice.requires_roll() {
            return Outcome {
                success: true,
                roll: None,
                target_node_id: choice.on_success.clone(),
            };
        }

        let difficulty = choice.difficulty.unwrap_or(0);
        let roll = Roll {
            value: roller.roll_d20(),
            difficulty,
        };
        let target = if roll.is_success() {
            choice.on_success.clone()
        } else {
            choice.failure_target().to_string()
        };
        Outcome {
            success: roll.is_success(),
            roll: Some(roll),
            target_node_id: target,
        }
    }

    /// Apply an outcome to the player, in a fixed order: roll consequences
    /// first, then arrival rewards at the target node, then the position
    /// update. `target` must be the node named by `outcome.target_node_id`.
    pub fn apply_transition(
        &self,
        player: &mut PlayerState,
        choice: &Choice,
        outcome: &Outcome,
        target: &StoryNode,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let Some(roll) = outcome.roll {
            effects.push(Effect::RollMade {
                roll,
                choice_text: choice.text.clone(),
            });
            let verdict = if outcome.success { "Success" } else { "Failure" };
            player.log(format!(
                "Rolled {} ({}) on \"{}\"",
                roll.value, verdict, choice.text
            ));
            if !outcome.success {
                player.take_damage(FAILURE_PENALTY);
                effects.push(Effect::HpChanged {
                    amount: -FAILURE_PENALTY,
                    new_hp: player.hp,
                });
            }
        }

        if self.rewards_due(player, target) {
            for item in &target.rewards {
                player.grant(item.clone());
                effects.push(Effect::ItemGranted { item: item.clone() });

                // Auto-equip fills an empty slot only, never displaces
                // gear the player already chose.
                if self.auto_equip && player.equipped.has_room_for(item.kind) {
                    if player.equip(&item.id).is_ok() {
                        let slot = match player.equipped.weapon.as_ref() {
                            Some(w) if w.id == item.id => EquipSlot::Weapon,
                            _ => EquipSlot::Armor,
                        };
                        effects.push(Effect::ItemEquipped {
                            item_id: item.id.clone(),
                            slot,
                        });
                    }
                }
            }
            if self.reward_policy == RewardPolicy::OncePerNode {
                player.claimed_rewards.insert(target.id.clone());
            }
        }

        player.current_node_id = target.id.clone();
        effects.push(Effect::MovedTo {
            node_id: target.id.clone(),
        });
        effects
    }

    fn rewards_due(&self, player: &PlayerState, target: &StoryNode) -> bool {
        if target.rewards.is_empty() {
            return false;
        }
        match self.reward_policy {
            RewardPolicy::EveryEntry => true,
            RewardPolicy::OncePerNode => !player.claimed_rewards.contains(&target.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::RngRoller;
    use crate::story::ItemKind;
    use crate::testing::ScriptedRoller;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn checked_choice(difficulty: u8) -> Choice {
        Choice::new("try", "Force the hatch", "won")
            .with_failure("lost")
            .with_difficulty(difficulty)
    }

    fn plain_node(id: &str) -> StoryNode {
        StoryNode::new(id, "Somewhere", "Text.")
    }

    fn armory_node() -> StoryNode {
        plain_node("armory")
            .with_reward(Item::new(
                "pistol",
                "Laser Pistol",
                "Zap.",
                ItemKind::Weapon,
                5,
            ))
            .with_reward(Item::new(
                "keycard",
                "Red Keycard",
                "Opens doors.",
                ItemKind::Key,
                0,
            ))
    }

    #[test]
    fn test_resolve_without_check_always_succeeds() {
        let engine = RulesEngine::new();
        let choice = Choice::new("go", "Walk through", "next");
        let mut roller = ScriptedRoller::new([1]);

        let outcome = engine.resolve(&choice, &mut roller);
        assert!(outcome.success);
        assert!(outcome.roll.is_none());
        assert_eq!(outcome.target_node_id, "next");
        // The scripted value was never consumed.
        assert_eq!(roller.remaining(), 1);
    }

    #[test]
    fn test_resolve_success_and_failure_targets() {
        let engine = RulesEngine::new();
        let choice = checked_choice(10);

        let mut roller = ScriptedRoller::new([15, 4]);
        let won = engine.resolve(&choice, &mut roller);
        assert!(won.success);
        assert_eq!(won.target_node_id, "won");

        let lost = engine.resolve(&choice, &mut roller);
        assert!(!lost.success);
        assert_eq!(lost.target_node_id, "lost");
    }

    #[test]
    fn test_resolve_failure_falls_back_to_success_target() {
        let engine = RulesEngine::new();
        let choice = Choice::new("leap", "Leap the gap", "other_side").with_difficulty(12);
        let mut roller = ScriptedRoller::new([3]);

        let outcome = engine.resolve(&choice, &mut roller);
        assert!(!outcome.success);
        assert_eq!(outcome.target_node_id, "other_side");
    }

    #[test]
    fn test_success_rate_matches_difficulty() {
        let engine = RulesEngine::new();
        let difficulty = 12;
        let choice = checked_choice(difficulty);
        let mut roller = RngRoller(StdRng::seed_from_u64(7));

        let trials = 10_000;
        let mut successes = 0;
        for _ in 0..trials {
            let outcome = engine.resolve(&choice, &mut roller);
            let roll = outcome.roll.unwrap();
            assert!((1..=20).contains(&roll.value));
            if outcome.success {
                successes += 1;
            }
        }

        let expected = f64::from(21 - i32::from(difficulty)) / 20.0;
        let observed = f64::from(successes) / f64::from(trials);
        assert!(
            (observed - expected).abs() < 0.02,
            "observed {observed}, expected {expected}"
        );
    }

    #[test]
    fn test_failure_costs_hp_and_logs() {
        let engine = RulesEngine::new();
        let mut player = PlayerState::new("start");
        let choice = checked_choice(10);
        let target = plain_node("lost");
        let mut roller = ScriptedRoller::new([4]);

        let outcome = engine.resolve(&choice, &mut roller);
        let effects = engine.apply_transition(&mut player, &choice, &outcome, &target);

        assert_eq!(player.hp, 18);
        assert_eq!(player.current_node_id, "lost");
        assert_eq!(
            player.history.last().unwrap(),
            "Rolled 4 (Failure) on \"Force the hatch\""
        );
        assert!(matches!(
            effects[1],
            Effect::HpChanged { amount: -2, new_hp: 18 }
        ));
    }

    #[test]
    fn test_success_logs_without_damage() {
        let engine = RulesEngine::new();
        let mut player = PlayerState::new("start");
        let choice = checked_choice(10);
        let target = plain_node("won");
        let mut roller = ScriptedRoller::new([17]);

        let outcome = engine.resolve(&choice, &mut roller);
        engine.apply_transition(&mut player, &choice, &outcome, &target);

        assert_eq!(player.hp, 20);
        assert_eq!(
            player.history.last().unwrap(),
            "Rolled 17 (Success) on \"Force the hatch\""
        );
    }

    #[test]
    fn test_rewards_granted_and_weapon_auto_equipped() {
        let engine = RulesEngine::new();
        let mut player = PlayerState::new("start");
        let choice = Choice::new("go", "Enter the armory", "armory");
        let target = armory_node();
        let mut roller = ScriptedRoller::new([]);

        let outcome = engine.resolve(&choice, &mut roller);
        engine.apply_transition(&mut player, &choice, &outcome, &target);

        assert_eq!(player.equipped.weapon.as_ref().unwrap().id, "pistol");
        assert!(player.has_item("keycard"));
        assert!(!player.has_item("pistol"));
    }

    #[test]
    fn test_auto_equip_never_displaces() {
        let engine = RulesEngine::new();
        let mut player = PlayerState::new("start");
        player.grant(Item::new("pipe", "Rusty Pipe", "Clang.", ItemKind::Weapon, 2));
        player.equip("pipe").unwrap();

        let choice = Choice::new("go", "Enter the armory", "armory");
        let target = armory_node();
        let mut roller = ScriptedRoller::new([]);
        let outcome = engine.resolve(&choice, &mut roller);
        engine.apply_transition(&mut player, &choice, &outcome, &target);

        assert_eq!(player.equipped.weapon.as_ref().unwrap().id, "pipe");
        assert!(player.has_item("pistol"));
    }

    #[test]
    fn test_auto_equip_disabled() {
        let engine = RulesEngine::new().without_auto_equip();
        let mut player = PlayerState::new("start");
        let choice = Choice::new("go", "Enter the armory", "armory");
        let target = armory_node();
        let mut roller = ScriptedRoller::new([]);

        let outcome = engine.resolve(&choice, &mut roller);
        engine.apply_transition(&mut player, &choice, &outcome, &target);

        assert!(player.equipped.weapon.is_none());
        assert!(player.has_item("pistol"));
    }

    #[test]
    fn test_rewards_repeat_under_default_policy() {
        let engine = RulesEngine::new();
        let mut player = PlayerState::new("start");
        let choice = Choice::new("go", "Enter the armory", "armory");
        let target = armory_node();
        let mut roller = ScriptedRoller::new([]);

        for _ in 0..2 {
            let outcome = engine.resolve(&choice, &mut roller);
            engine.apply_transition(&mut player, &choice, &outcome, &target);
        }

        let keycards = player.inventory.iter().filter(|i| i.id == "keycard").count();
        assert_eq!(keycards, 2);
        // Only the grant-once policy keeps claim bookkeeping.
        assert!(player.claimed_rewards.is_empty());
    }

    #[test]
    fn test_rewards_once_per_node_policy() {
        let engine = RulesEngine::new().with_reward_policy(RewardPolicy::OncePerNode);
        let mut player = PlayerState::new("start");
        let choice = Choice::new("go", "Enter the armory", "armory");
        let target = armory_node();
        let mut roller = ScriptedRoller::new([]);

        for _ in 0..3 {
            let outcome = engine.resolve(&choice, &mut roller);
            engine.apply_transition(&mut player, &choice, &outcome, &target);
        }

        let keycards = player.inventory.iter().filter(|i| i.id == "keycard").count();
        assert_eq!(keycards, 1);
        assert!(player.claimed_rewards.contains("armory"));
    }

    #[test]
    fn test_effect_order() {
        let engine = RulesEngine::new();
        let mut player = PlayerState::new("start");
        let choice = Choice::new("dash", "Dash inside", "armory").with_difficulty(10);
        let target = armory_node();
        let mut roller = ScriptedRoller::new([2]);

        let outcome = engine.resolve(&choice, &mut roller);
        let effects = engine.apply_transition(&mut player, &choice, &outcome, &target);

        assert!(matches!(effects[0], Effect::RollMade { .. }));
        assert!(matches!(effects[1], Effect::HpChanged { .. }));
        assert!(matches!(effects[2], Effect::ItemGranted { .. }));
        assert!(matches!(
            effects.last(),
            Some(Effect::MovedTo { node_id }) if node_id == "armory"
        ));
    }
}
