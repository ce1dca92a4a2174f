//! Navigation state machine: current node plus the audited path of departed steps.
//!
//! Every operation is lenient. A call whose precondition does not hold is
//! ignored and reported as [`Transition::Ignored`], never as an error.

use log::{debug, info, warn};

use super::config;
use super::tree::{NodeKind, TreeStore};

/// Snapshot of a node taken at the moment the user left it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStep {
    pub node_id: String,
    pub node_text: String,
    pub node_kind: NodeKind,
    /// Present only when the step departed from a graded (slider) node.
    pub answer_value: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub current_node_id: String,
    pub history: Vec<HistoryStep>,
    /// Whether the evaluation panel for the current node is shown.
    pub overlay_open: bool,
    /// Set when an advance could not resolve a successor. Further advances
    /// are ignored until the user selects a node, steps back or restarts.
    pub closed: bool,
}

impl NavigationState {
    pub fn new(start_id: &str) -> Self {
        Self {
            current_node_id: start_id.to_string(),
            history: Vec::new(),
            overlay_open: false,
            closed: false,
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Jump straight to a node picked from the graph. History is untouched.
    Select(String),
    /// Leave a graded node, recording the slider value.
    AdvanceWithValue { target: Option<String>, value: u8 },
    /// Leave a single-exit node.
    AdvanceDirect { target: Option<String> },
    StepBack,
    Restart,
    /// Hide the evaluation panel without navigating.
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Selected(String),
    Moved { from: String, to: String },
    /// The step was recorded but no successor resolved.
    Closed { at: String },
    SteppedBack { to: String },
    Restarted,
    Dismissed,
    Ignored(&'static str),
}

/// Owns the navigation state of one session.
#[derive(Debug, Clone)]
pub struct Navigator {
    state: NavigationState,
    start_id: String,
}

impl Navigator {
    pub fn new(start_id: &str) -> Self {
        Self {
            state: NavigationState::new(start_id),
            start_id: start_id.to_string(),
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn start_id(&self) -> &str {
        &self.start_id
    }

    /// Apply one action. `(current_node_id, history)` is updated as a unit.
    pub fn dispatch(&mut self, tree: &TreeStore, action: Action) -> Transition {
        let transition = match action {
            Action::Select(id) => self.select(tree, id),
            Action::AdvanceWithValue { target, value } => {
                self.advance(tree, target, Some(value.min(config::VALUE_MAX)))
            }
            Action::AdvanceDirect { target } => self.advance(tree, target, None),
            Action::StepBack => self.step_back(),
            Action::Restart => self.restart(),
            Action::Dismiss => {
                self.state.overlay_open = false;
                Transition::Dismissed
            }
        };
        match &transition {
            Transition::Ignored(reason) => debug!("navigation no-op: {reason}"),
            other => info!("navigation: {other:?}"),
        }
        transition
    }

    fn select(&mut self, tree: &TreeStore, id: String) -> Transition {
        if !tree.contains(&id) {
            warn!("selecting unknown node '{id}'");
        }
        self.state.current_node_id = id.clone();
        self.state.overlay_open = true;
        self.state.closed = false;
        Transition::Selected(id)
    }

    fn advance(&mut self, tree: &TreeStore, target: Option<String>, value: Option<u8>) -> Transition {
        if self.state.closed {
            return Transition::Ignored("navigation is closed");
        }
        let Some(current) = tree.get(&self.state.current_node_id) else {
            return Transition::Ignored("no current node");
        };

        let from = current.id.clone();
        self.state.history.push(HistoryStep {
            node_id: current.id.clone(),
            node_text: current.prompt.clone(),
            node_kind: current.kind,
            answer_value: value,
        });

        match target.filter(|t| tree.contains(t)) {
            Some(to) => {
                self.state.current_node_id = to.clone();
                self.state.overlay_open = true;
                Transition::Moved { from, to }
            }
            None => {
                self.state.overlay_open = false;
                self.state.closed = true;
                Transition::Closed { at: from }
            }
        }
    }

    fn step_back(&mut self) -> Transition {
        let Some(last) = self.state.history.pop() else {
            return Transition::Ignored("history is empty");
        };
        self.state.current_node_id = last.node_id;
        self.state.closed = false;
        self.state.overlay_open = true;
        Transition::SteppedBack {
            to: self.state.current_node_id.clone(),
        }
    }

    fn restart(&mut self) -> Transition {
        self.state = NavigationState::new(&self.start_id);
        Transition::Restarted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::fixtures::small_tree;

    fn advance_value(target: &str, value: u8) -> Action {
        Action::AdvanceWithValue {
            target: Some(target.to_string()),
            value,
        }
    }

    #[test]
    fn test_advance_with_value_records_step() {
        let tree = small_tree();
        let mut nav = Navigator::new("Q1");
        let t = nav.dispatch(&tree, advance_value("Q2", 70));

        assert_eq!(
            t,
            Transition::Moved {
                from: "Q1".into(),
                to: "Q2".into()
            }
        );
        let s = nav.state();
        assert_eq!(s.current_node_id, "Q2");
        assert_eq!(
            s.history,
            vec![HistoryStep {
                node_id: "Q1".into(),
                node_text: "T1".into(),
                node_kind: NodeKind::Question,
                answer_value: Some(70),
            }]
        );
    }

    #[test]
    fn test_step_back_undoes_advance() {
        let tree = small_tree();
        let mut nav = Navigator::new("Q1");
        nav.dispatch(&tree, advance_value("Q2", 70));
        nav.dispatch(&tree, Action::StepBack);

        assert!(nav.state().history.is_empty());
        assert_eq!(nav.state().current_node_id, "Q1");
    }

    #[test]
    fn test_advance_then_back_is_symmetric() {
        let tree = small_tree();
        let mut nav = Navigator::new("Q1");
        let initial = nav.state().clone();

        nav.dispatch(&tree, advance_value("I1", 20));
        nav.dispatch(
            &tree,
            Action::AdvanceDirect {
                target: Some("Q2".into()),
            },
        );
        nav.dispatch(&tree, advance_value("O2", 90));
        assert_eq!(nav.state().history.len(), 3);

        for _ in 0..3 {
            nav.dispatch(&tree, Action::StepBack);
        }
        assert_eq!(nav.state().current_node_id, initial.current_node_id);
        assert_eq!(nav.state().history, initial.history);
    }

    #[test]
    fn test_terminal_advance_closes_and_keeps_current() {
        let tree = small_tree();
        let mut nav = Navigator::new("Q1");
        nav.dispatch(&tree, Action::Select("O2".into()));
        let t = nav.dispatch(&tree, Action::AdvanceDirect { target: None });

        assert_eq!(t, Transition::Closed { at: "O2".into() });
        let s = nav.state();
        assert_eq!(s.current_node_id, "O2");
        assert!(!s.overlay_open);
        assert!(s.closed);
        assert_eq!(s.history.len(), 1);
        assert_eq!(s.history[0].node_id, "O2");
        assert_eq!(s.history[0].answer_value, None);
    }

    #[test]
    fn test_unknown_target_closes() {
        let tree = small_tree();
        let mut nav = Navigator::new("Q1");
        let t = nav.dispatch(&tree, advance_value("MISSING", 60));
        assert_eq!(t, Transition::Closed { at: "Q1".into() });
        assert_eq!(nav.state().current_node_id, "Q1");
        assert_eq!(nav.state().history.len(), 1);
    }

    #[test]
    fn test_closed_state_ignores_advance_until_select() {
        let tree = small_tree();
        let mut nav = Navigator::new("Q1");
        nav.dispatch(&tree, Action::Select("O2".into()));
        nav.dispatch(&tree, Action::AdvanceDirect { target: None });

        let t = nav.dispatch(&tree, advance_value("Q2", 80));
        assert_eq!(t, Transition::Ignored("navigation is closed"));
        assert_eq!(nav.state().history.len(), 1);

        nav.dispatch(&tree, Action::Select("Q1".into()));
        assert!(nav.state().overlay_open);
        let t = nav.dispatch(&tree, advance_value("Q2", 80));
        assert!(matches!(t, Transition::Moved { .. }));
        assert_eq!(nav.state().history.len(), 2);
    }

    #[test]
    fn test_back_on_empty_history_is_noop() {
        let tree = small_tree();
        let mut nav = Navigator::new("Q1");
        let before = nav.state().clone();
        let t = nav.dispatch(&tree, Action::StepBack);
        assert_eq!(t, Transition::Ignored("history is empty"));
        assert_eq!(nav.state(), &before);
    }

    #[test]
    fn test_advance_without_current_node_is_noop() {
        let tree = small_tree();
        let mut nav = Navigator::new("GONE");
        let t = nav.dispatch(&tree, advance_value("Q2", 10));
        assert_eq!(t, Transition::Ignored("no current node"));
        assert!(nav.state().history.is_empty());
    }

    #[test]
    fn test_select_does_not_touch_history() {
        let tree = small_tree();
        let mut nav = Navigator::new("Q1");
        nav.dispatch(&tree, advance_value("Q2", 55));
        nav.dispatch(&tree, Action::Select("I1".into()));
        assert_eq!(nav.state().history.len(), 1);
        assert_eq!(nav.state().current_node_id, "I1");
        assert!(nav.state().overlay_open);
    }

    #[test]
    fn test_restart_resets_everything() {
        let tree = small_tree();
        let mut nav = Navigator::new("Q1");
        nav.dispatch(&tree, advance_value("Q2", 55));
        nav.dispatch(&tree, Action::Select("O2".into()));
        nav.dispatch(&tree, Action::Restart);
        assert_eq!(nav.state(), &NavigationState::new("Q1"));
    }

    #[test]
    fn test_revisits_push_duplicate_steps() {
        let tree = small_tree();
        let mut nav = Navigator::new("Q1");
        nav.dispatch(&tree, advance_value("Q2", 30));
        nav.dispatch(&tree, Action::Select("Q1".into()));
        nav.dispatch(&tree, advance_value("Q2", 90));
        let ids: Vec<&str> = nav.state().history.iter().map(|h| h.node_id.as_str()).collect();
        assert_eq!(ids, vec!["Q1", "Q1"]);
    }

    #[test]
    fn test_value_is_clamped() {
        let tree = small_tree();
        let mut nav = Navigator::new("Q1");
        nav.dispatch(&tree, advance_value("Q2", 250));
        assert_eq!(nav.state().history[0].answer_value, Some(100));
    }
}
