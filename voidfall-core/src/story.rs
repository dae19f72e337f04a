//! Story content types: items, choices, nodes, and the validated graph.
//!
//! A [`StoryGraph`] is immutable once constructed. Construction validates
//! the whole graph — every choice target must resolve to a node and the
//! start node must exist — so a dangling reference is caught at load time
//! rather than mid-playthrough. Cycles are legal: a failed check may loop
//! back through earlier nodes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Fatal content errors found while validating a story graph.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Start node '{0}' does not exist in the graph")]
    MissingStartNode(String),

    #[error("Node '{node}': choice '{choice}' targets unknown node '{target}'")]
    DanglingTarget {
        node: String,
        choice: String,
        target: String,
    },

    #[error("Duplicate node id '{0}'")]
    DuplicateNode(String),

    #[error("Node '{node}': duplicate choice id '{choice}'")]
    DuplicateChoice { node: String, choice: String },

    #[error("Ending node '{0}' must not offer choices")]
    ChoicesOnEnding(String),

    #[error("Invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// What an item is for. Determines which equipment slot it fits, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    Consumable,
    Key,
}

/// An immutable item template. Instances in inventories are clones.
///
/// `value` is damage for weapons, protection for armor, heal amount for
/// consumables, and unused (zero) for keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: ItemKind,
    pub value: i32,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: ItemKind,
        value: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            kind,
            value,
        }
    }
}

/// A player-selectable choice attached to a node.
///
/// A choice with no difficulty (or difficulty zero) succeeds without a
/// roll. A choice with no failure target still rolls when a difficulty is
/// set — both outcomes converge on the success target, but the roll's
/// verdict still drives the penalty rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,
    pub on_success: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    /// Reserved gating metadata. Carried through content but not enforced
    /// by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_item: Option<String>,
}

impl Choice {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        on_success: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            on_success: on_success.into(),
            on_failure: None,
            difficulty: None,
            required_item: None,
        }
    }

    pub fn with_failure(mut self, target: impl Into<String>) -> Self {
        self.on_failure = Some(target.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_required_item(mut self, item_id: impl Into<String>) -> Self {
        self.required_item = Some(item_id.into());
        self
    }

    /// Whether resolving this choice draws a roll. A difficulty of zero
    /// counts as no check at all.
    pub fn requires_roll(&self) -> bool {
        matches!(self.difficulty, Some(d) if d > 0)
    }

    /// Where failure leads. Falls back to the success target, so failure
    /// never blocks progress.
    pub fn failure_target(&self) -> &str {
        self.on_failure.as_deref().unwrap_or(&self.on_success)
    }
}

/// A narrative beat: where the player currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryNode {
    pub id: String,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub rewards: Vec<Item>,
    #[serde(default)]
    pub is_ending: bool,
}

impl StoryNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            choices: Vec::new(),
            rewards: Vec::new(),
            is_ending: false,
        }
    }

    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn with_reward(mut self, item: Item) -> Self {
        self.rewards.push(item);
        self
    }

    pub fn ending(mut self) -> Self {
        self.is_ending = true;
        self
    }

    /// Find a choice on this node by id.
    pub fn choice(&self, id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == id)
    }
}

/// An immutable, validated set of story nodes keyed by id.
///
/// Serializes to the same shape [`StoryGraph::from_json`] reads: `nodes`
/// as a sequence plus the `start` id, so saved graphs reload through the
/// validating constructor.
#[derive(Debug, Clone, Serialize)]
pub struct StoryGraph {
    #[serde(serialize_with = "nodes_as_seq")]
    nodes: HashMap<String, StoryNode>,
    start: String,
}

/// Emit the node map as a sequence, ordered by id for stable output.
fn nodes_as_seq<S>(nodes: &HashMap<String, StoryNode>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut ordered: Vec<&StoryNode> = nodes.values().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));
    serializer.collect_seq(ordered)
}

impl StoryGraph {
    /// Build a graph from nodes and a designated start node, validating
    /// every choice target. Fails fast on the first content error.
    pub fn new(nodes: Vec<StoryNode>, start: impl Into<String>) -> Result<Self, ContentError> {
        let start = start.into();
        let mut map = HashMap::with_capacity(nodes.len());

        for node in nodes {
            if map.contains_key(&node.id) {
                return Err(ContentError::DuplicateNode(node.id));
            }
            map.insert(node.id.clone(), node);
        }

        if !map.contains_key(&start) {
            return Err(ContentError::MissingStartNode(start));
        }

        for node in map.values() {
            if node.is_ending && !node.choices.is_empty() {
                return Err(ContentError::ChoicesOnEnding(node.id.clone()));
            }
            for (i, choice) in node.choices.iter().enumerate() {
                if node.choices[..i].iter().any(|c| c.id == choice.id) {
                    return Err(ContentError::DuplicateChoice {
                        node: node.id.clone(),
                        choice: choice.id.clone(),
                    });
                }
                for target in std::iter::once(choice.on_success.as_str())
                    .chain(choice.on_failure.as_deref())
                {
                    if !map.contains_key(target) {
                        return Err(ContentError::DanglingTarget {
                            node: node.id.clone(),
                            choice: choice.id.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }

        Ok(Self { nodes: map, start })
    }

    /// Load and validate a graph from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        #[derive(Deserialize)]
        struct RawGraph {
            nodes: Vec<StoryNode>,
            start: String,
        }

        let raw: RawGraph = serde_json::from_str(json)?;
        Self::new(raw.nodes, raw.start)
    }

    /// Look up a node by id.
    pub fn get(&self, id: &str) -> Option<&StoryNode> {
        self.nodes.get(id)
    }

    /// Id of the designated start node.
    pub fn start_id(&self) -> &str {
        &self.start
    }

    /// The designated start node.
    pub fn start(&self) -> &StoryNode {
        self.nodes
            .get(&self.start)
            .expect("start node checked at construction")
    }

    /// Iterate all nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
