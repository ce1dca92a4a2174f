//! Derives the drawable graph (nodes, edges, bounds) from the tree and the audited path.
//!
//! This is a pure function of its inputs. The graph view and the PNG export
//! both draw from the same [`VisualGraph`].

use std::collections::HashMap;

use crate::core::config;
use crate::core::navigation::HistoryStep;
use crate::core::tree::{NodeKind, TreeStore};
use crate::core::types::{Bounds, Rgb, Vec2};

use super::style::{node_style, progress_ring, NodeStyle, ProgressRing};

#[derive(Debug, Clone, PartialEq)]
pub struct VisualNode {
    pub id: String,
    pub kind: NodeKind,
    pub prompt: String,
    pub center: Vec2,
    pub size: f64,
    pub value: Option<u8>,
    pub style: NodeStyle,
    /// Stroke after the active/hover highlight is applied.
    pub stroke: Rgb,
    pub ring: Option<ProgressRing>,
    pub is_active: bool,
    pub is_hovered: bool,
    /// Pulsing halo plus "click" callout on the untouched start node.
    pub start_affordance: bool,
}

impl VisualNode {
    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }

    /// Axis-aligned hit box in graph coordinates.
    pub fn contains(&self, p: Vec2) -> bool {
        let h = self.radius();
        (p.x - self.center.x).abs() <= h && (p.y - self.center.y).abs() <= h
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualEdge {
    pub from_id: String,
    pub to_id: String,
    pub from: Vec2,
    pub to: Vec2,
    pub visited: bool,
    pub color: Rgb,
    pub width: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualGraph {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
    pub bounds: Bounds,
}

impl VisualGraph {
    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Node id to recorded value. A later visit overwrites an earlier one and
/// ungraded visits count as the neutral midpoint.
pub fn value_lookup(history: &[HistoryStep]) -> HashMap<&str, u8> {
    history
        .iter()
        .map(|step| {
            let value = step.answer_value.unwrap_or(config::UNGRADED_VISIT_VALUE);
            (step.node_id.as_str(), value)
        })
        .collect()
}

/// Extent of every node position, padded on all sides.
pub fn compute_bounds(tree: &TreeStore) -> Bounds {
    let pad = config::CANVAS_PADDING;
    let mut positions = tree.iter().map(|n| n.position_or_default());
    let Some(first) = positions.next() else {
        return Bounds {
            min_x: -pad,
            min_y: -pad,
            width: pad * 2.0,
            height: pad * 2.0,
        };
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in positions {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Bounds {
        min_x: min_x - pad,
        min_y: min_y - pad,
        width: max_x - min_x + pad * 2.0,
        height: max_y - min_y + pad * 2.0,
    }
}

pub fn project(
    tree: &TreeStore,
    history: &[HistoryStep],
    current_id: &str,
    start_id: &str,
    hovered: Option<&str>,
) -> VisualGraph {
    let values = value_lookup(history);
    let highlight = Rgb::from_hex(config::HIGHLIGHT);

    let nodes = tree
        .iter()
        .map(|def| {
            let value = values.get(def.id.as_str()).copied();
            let is_active = def.id == current_id;
            let is_hovered = hovered == Some(def.id.as_str());
            let size = if is_active {
                config::NODE_SIZE_ACTIVE
            } else {
                config::NODE_SIZE
            };
            let style = node_style(value);
            VisualNode {
                id: def.id.clone(),
                kind: def.kind,
                prompt: def.prompt.clone(),
                center: def.position_or_default(),
                size,
                value,
                style,
                stroke: if is_active || is_hovered {
                    highlight
                } else {
                    style.stroke
                },
                ring: progress_ring(size / 2.0, value),
                is_active,
                is_hovered,
                start_affordance: def.id == start_id && history.is_empty(),
            }
        })
        .collect();

    let default_pos = Vec2::new(config::DEFAULT_POSITION_X, config::DEFAULT_POSITION_Y);
    let mut edges = Vec::new();
    for def in tree.iter() {
        let value = values.get(def.id.as_str()).copied();
        let visited = value.is_some();
        let from = def.position_or_default();
        for target in def.targets() {
            let to = tree
                .get(target)
                .map(|t| t.position_or_default())
                .unwrap_or(default_pos);
            edges.push(VisualEdge {
                from_id: def.id.clone(),
                to_id: target.to_string(),
                from,
                to,
                visited,
                color: if visited {
                    node_style(value).stroke
                } else {
                    Rgb::from_hex(config::EDGE_IDLE)
                },
                width: if visited {
                    config::EDGE_WIDTH_VISITED
                } else {
                    config::EDGE_WIDTH
                },
                opacity: if visited {
                    config::EDGE_OPACITY_VISITED
                } else {
                    config::EDGE_OPACITY
                },
            });
        }
    }

    VisualGraph {
        nodes,
        edges,
        bounds: compute_bounds(tree),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::fixtures::{node, small_tree};
    use crate::core::tree::Exits;
    use crate::graph::style::value_rgb;

    fn step(id: &str, value: Option<u8>) -> HistoryStep {
        HistoryStep {
            node_id: id.to_string(),
            node_text: String::new(),
            node_kind: NodeKind::Question,
            answer_value: value,
        }
    }

    #[test]
    fn test_bounds_two_nodes() {
        let tree = TreeStore::new(vec![
            node("A", NodeKind::Question, "a", Exits::Terminal, Some((0.0, 0.0))),
            node("B", NodeKind::Outcome, "b", Exits::Terminal, Some((100.0, 100.0))),
        ]);
        assert_eq!(
            compute_bounds(&tree),
            Bounds {
                min_x: -120.0,
                min_y: -120.0,
                width: 340.0,
                height: 340.0
            }
        );
    }

    #[test]
    fn test_bounds_use_default_position() {
        let tree = TreeStore::new(vec![node("A", NodeKind::Alert, "a", Exits::Terminal, None)]);
        let b = compute_bounds(&tree);
        assert_eq!(b.min_x, 380.0);
        assert_eq!(b.min_y, 180.0);
        assert_eq!(b.width, 240.0);
    }

    #[test]
    fn test_last_visit_wins() {
        let history = vec![step("Q1", Some(10)), step("Q2", Some(40)), step("Q1", Some(90))];
        let values = value_lookup(&history);
        assert_eq!(values["Q1"], 90);
        assert_eq!(values["Q2"], 40);
    }

    #[test]
    fn test_ungraded_visit_is_neutral() {
        let history = vec![step("I1", None)];
        assert_eq!(value_lookup(&history)["I1"], 50);
    }

    #[test]
    fn test_project_styles_visited_and_active() {
        let tree = small_tree();
        let history = vec![step("Q1", Some(80))];
        let g = project(&tree, &history, "Q2", "Q1", None);

        let q1 = g.node("Q1").unwrap();
        assert_eq!(q1.value, Some(80));
        assert_eq!(q1.style.stroke, value_rgb(80));
        assert_eq!(q1.stroke, value_rgb(80));
        assert!(q1.ring.is_some());
        assert!(!q1.start_affordance);
        assert_eq!(q1.size, 36.0);

        let q2 = g.node("Q2").unwrap();
        assert!(q2.is_active);
        assert_eq!(q2.size, 42.0);
        assert_eq!(q2.stroke, Rgb::from_hex(0x2DD4BF));
        assert!(q2.ring.is_none());

        let o2 = g.node("O2").unwrap();
        assert_eq!(o2.style, node_style(None));
    }

    #[test]
    fn test_hover_overrides_stroke() {
        let tree = small_tree();
        let g = project(&tree, &[], "Q1", "Q1", Some("O2"));
        let o2 = g.node("O2").unwrap();
        assert!(o2.is_hovered);
        assert_eq!(o2.stroke, Rgb::from_hex(0x2DD4BF));
        assert_eq!(o2.style.stroke, Rgb::from_hex(0x334155));
    }

    #[test]
    fn test_start_affordance_only_before_first_answer() {
        let tree = small_tree();
        let g = project(&tree, &[], "Q1", "Q1", None);
        assert!(g.node("Q1").unwrap().start_affordance);
        assert!(!g.node("Q2").unwrap().start_affordance);

        let g = project(&tree, &[step("Q1", Some(60))], "Q2", "Q1", None);
        assert!(!g.node("Q1").unwrap().start_affordance);
    }

    #[test]
    fn test_edges_follow_source_visit() {
        let tree = small_tree();
        let history = vec![step("Q1", Some(20))];
        let g = project(&tree, &history, "I1", "Q1", None);

        // Q1 (2) + Q2 (2) + I1 (1)
        assert_eq!(g.edges.len(), 5);
        let from_q1: Vec<&VisualEdge> = g.edges.iter().filter(|e| e.from_id == "Q1").collect();
        assert_eq!(from_q1.len(), 2);
        for e in from_q1 {
            assert!(e.visited);
            assert_eq!(e.color, value_rgb(20));
            assert_eq!(e.width, 4.0);
            assert_eq!(e.opacity, 0.7);
        }
        let idle = g.edges.iter().find(|e| e.from_id == "I1").unwrap();
        assert!(!idle.visited);
        assert_eq!(idle.color, Rgb::from_hex(0x1E293B));
        assert_eq!(idle.width, 2.0);
        assert_eq!(idle.opacity, 0.3);
        assert_eq!(idle.from, Vec2::new(700.0, 150.0));
        assert_eq!(idle.to, Vec2::new(300.0, 150.0));
    }

    #[test]
    fn test_node_hit_box() {
        let tree = small_tree();
        let g = project(&tree, &[], "Q1", "Q1", None);
        let q2 = g.node("Q2").unwrap();
        assert!(q2.contains(Vec2::new(317.0, 167.0)));
        assert!(!q2.contains(Vec2::new(320.0, 150.0)));
    }
}
