//! Static decision-tree definitions and the per-locale bundle they ship in.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use super::config;
use super::strings::UiStrings;
use super::types::Vec2;

/// Node classification. Determines how the node is answered, not just how it looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Question,
    Alert,
    Intervention,
    Outcome,
    Reassessment,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Question => "QUESTION",
            NodeKind::Alert => "ALERT",
            NodeKind::Intervention => "INTERVENTION",
            NodeKind::Outcome => "OUTCOME",
            NodeKind::Reassessment => "REASSESSMENT",
        }
    }

    /// Question-like nodes take a graded slider answer.
    pub fn is_graded(self) -> bool {
        matches!(self, NodeKind::Question | NodeKind::Reassessment)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outgoing connections of a node, chosen explicitly per node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exits {
    Branching {
        yes: String,
        no: String,
    },
    Linear {
        next: String,
    },
    #[default]
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeDefinition {
    pub id: String,
    pub kind: NodeKind,
    pub prompt: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub exits: Exits,
    #[serde(default)]
    pub position: Option<Vec2>,
}

impl NodeDefinition {
    /// Layout position, falling back to the canvas center.
    pub fn position_or_default(&self) -> Vec2 {
        self.position
            .unwrap_or(Vec2::new(config::DEFAULT_POSITION_X, config::DEFAULT_POSITION_Y))
    }

    /// Non-empty targets in yes, no, next order.
    pub fn targets(&self) -> Vec<&str> {
        let raw: Vec<&str> = match &self.exits {
            Exits::Branching { yes, no } => vec![yes.as_str(), no.as_str()],
            Exits::Linear { next } => vec![next.as_str()],
            Exits::Terminal => Vec::new(),
        };
        raw.into_iter().filter(|t| !t.is_empty()).collect()
    }

    /// Successor for a graded answer: yes at or above the threshold, no below it.
    pub fn resolve(&self, value: u8) -> Option<&str> {
        let target = match &self.exits {
            Exits::Branching { yes, no } => {
                if value >= config::YES_THRESHOLD {
                    yes
                } else {
                    no
                }
            }
            Exits::Linear { next } => next,
            Exits::Terminal => return None,
        };
        (!target.is_empty()).then_some(target.as_str())
    }

    /// Successor for a single-exit node.
    pub fn next(&self) -> Option<&str> {
        match &self.exits {
            Exits::Linear { next } if !next.is_empty() => Some(next.as_str()),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.targets().is_empty()
    }
}

/// Read-only map of node id to definition. Keeps the declaration order for rendering.
#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    nodes: Vec<NodeDefinition>,
    index: HashMap<String, usize>,
}

impl TreeStore {
    pub fn new(nodes: Vec<NodeDefinition>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        Self { nodes, index }
    }

    pub fn get(&self, id: &str) -> Option<&NodeDefinition> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeDefinition> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Es];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    /// Name shown in the language picker.
    pub fn native_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Es => "Español",
        }
    }

    /// Language the assistant is asked to answer in.
    pub fn language_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Es => "Spanish",
        }
    }
}

impl FromStr for Locale {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "es" | "spanish" | "español" => Ok(Locale::Es),
            other => Err(BundleError::UnknownLocale(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("unknown locale '{0}' (expected 'en' or 'es')")]
    UnknownLocale(String),
    #[error("invalid tree data for locale '{locale}': {source}")]
    Tree {
        locale: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid UI strings for locale '{locale}': {source}")]
    Strings {
        locale: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeFile {
    start_node_id: String,
    nodes: Vec<NodeDefinition>,
}

/// Everything locale-dependent: the tree, its start node and the UI text.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub locale: Locale,
    pub tree: TreeStore,
    pub start_id: String,
    pub strings: UiStrings,
}

impl Bundle {
    /// Load one of the bundles compiled into the binary.
    pub fn load(locale: Locale) -> Result<Self, BundleError> {
        let (tree_json, strings_json) = match locale {
            Locale::En => (
                include_str!("../../data/tree_en.json"),
                include_str!("../../data/strings_en.json"),
            ),
            Locale::Es => (
                include_str!("../../data/tree_es.json"),
                include_str!("../../data/strings_es.json"),
            ),
        };
        Self::from_json(locale, tree_json, strings_json)
    }

    pub fn from_json(locale: Locale, tree_json: &str, strings_json: &str) -> Result<Self, BundleError> {
        let tree: TreeFile = serde_json::from_str(tree_json).map_err(|source| BundleError::Tree {
            locale: locale.code(),
            source,
        })?;
        let strings: UiStrings =
            serde_json::from_str(strings_json).map_err(|source| BundleError::Strings {
                locale: locale.code(),
                source,
            })?;
        Ok(Self {
            locale,
            tree: TreeStore::new(tree.nodes),
            start_id: tree.start_node_id,
            strings,
        })
    }

    /// `None` when the configured start node is missing from the tree.
    pub fn start_node(&self) -> Option<&NodeDefinition> {
        self.tree.get(&self.start_id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn node(id: &str, kind: NodeKind, prompt: &str, exits: Exits, pos: Option<(f64, f64)>) -> NodeDefinition {
        NodeDefinition {
            id: id.to_string(),
            kind,
            prompt: prompt.to_string(),
            detail: None,
            exits,
            position: pos.map(|(x, y)| Vec2::new(x, y)),
        }
    }

    pub fn branching(yes: &str, no: &str) -> Exits {
        Exits::Branching {
            yes: yes.to_string(),
            no: no.to_string(),
        }
    }

    pub fn linear(next: &str) -> Exits {
        Exits::Linear {
            next: next.to_string(),
        }
    }

    /// Q1 -> (Q2 | I1), I1 -> Q2, Q2 -> (O2 | O2), O2 terminal.
    pub fn small_tree() -> TreeStore {
        TreeStore::new(vec![
            node("Q1", NodeKind::Question, "T1", branching("Q2", "I1"), Some((500.0, 50.0))),
            node("Q2", NodeKind::Question, "T2", branching("O2", "O2"), Some((300.0, 150.0))),
            node("I1", NodeKind::Intervention, "Fix it", linear("Q2"), Some((700.0, 150.0))),
            node("O2", NodeKind::Outcome, "Done", Exits::Terminal, Some((500.0, 300.0))),
        ])
    }
}
