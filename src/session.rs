//! One diagnostic session: the active bundle, navigation, site context and
//! the assistant conversation, owned by the UI thread.

use log::{debug, info};
use thiserror::Error;

use crate::assistant::dispatcher::{Completion, Job, JobKind, RequestId};
use crate::assistant::{ExplainRequest, SummaryRequest};
use crate::core::chat::{ChatLog, Sender};
use crate::core::navigation::{Action, NavigationState, Navigator, Transition};
use crate::core::site_context::SiteContext;
use crate::core::strings::UiStrings;
use crate::core::tree::{Bundle, Locale, NodeDefinition};
use crate::graph::projection::{project, VisualGraph};
use crate::report::summary::build_payload;
use crate::report::text_report::{render_chat_transcript, render_report};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("start node '{start}' is missing from the '{locale}' tree")]
    MissingStartNode { start: String, locale: &'static str },
}

pub struct Session {
    bundle: Bundle,
    navigator: Navigator,
    site: SiteContext,
    chat: ChatLog,

    next_request: RequestId,
    in_flight: usize,
    /// Newest explanation id whose reply has been shown.
    latest_explanation_shown: RequestId,
    /// Last id issued before the most recent restart.
    restart_floor: RequestId,
}

impl Session {
    pub fn start(bundle: Bundle, site: SiteContext) -> Result<Self, SessionError> {
        if bundle.start_node().is_none() {
            return Err(SessionError::MissingStartNode {
                start: bundle.start_id.clone(),
                locale: bundle.locale.code(),
            });
        }
        info!(
            "session started: locale {}, {} nodes, start {}",
            bundle.locale.code(),
            bundle.tree.len(),
            bundle.start_id
        );
        let navigator = Navigator::new(&bundle.start_id);
        Ok(Self {
            bundle,
            navigator,
            site,
            chat: ChatLog::new(),
            next_request: 0,
            in_flight: 0,
            latest_explanation_shown: 0,
            restart_floor: 0,
        })
    }

    pub fn locale(&self) -> Locale {
        self.bundle.locale
    }

    pub fn strings(&self) -> &UiStrings {
        &self.bundle.strings
    }

    pub fn site(&self) -> &SiteContext {
        &self.site
    }

    pub fn state(&self) -> &NavigationState {
        self.navigator.state()
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn current_node(&self) -> Option<&NodeDefinition> {
        self.bundle.tree.get(&self.navigator.state().current_node_id)
    }

    /// Restart also begins a new conversation; replies still in flight
    /// from the previous audit are dropped when they arrive.
    pub fn dispatch(&mut self, action: Action) -> Transition {
        let restart = matches!(action, Action::Restart);
        let transition = self.navigator.dispatch(&self.bundle.tree, action);
        if restart {
            self.chat.clear();
            self.restart_floor = self.next_request;
            info!("conversation cleared for new audit");
        }
        transition
    }

    pub fn projection(&self, hovered: Option<&str>) -> VisualGraph {
        let state = self.navigator.state();
        project(
            &self.bundle.tree,
            &state.history,
            &state.current_node_id,
            self.navigator.start_id(),
            hovered,
        )
    }

    pub fn text_report(&self) -> String {
        render_report(
            &self.bundle.strings.app_title,
            &self.site,
            &self.navigator.state().history,
        )
    }

    pub fn chat_transcript(&self) -> String {
        render_chat_transcript(self.chat.messages(), &self.bundle.strings)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    fn next_id(&mut self) -> RequestId {
        self.next_request += 1;
        self.next_request
    }

    /// Log the question and build a job bound to the current node.
    /// `None` for blank input or when no node is current.
    pub fn request_explanation(&mut self, query: &str) -> Option<Job> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let node = self.current_node()?.clone();
        self.chat.push(Sender::User, query);
        let id = self.next_id();
        self.in_flight += 1;
        Some(Job::Explain {
            id,
            request: ExplainRequest {
                query: query.to_string(),
                node,
                locale: self.bundle.locale,
                site: self.site.clone(),
                strings: self.bundle.strings.assistant.clone(),
            },
        })
    }

    /// `None` until at least one step has been recorded.
    pub fn request_summary(&mut self) -> Option<Job> {
        let history = &self.navigator.state().history;
        if history.is_empty() {
            return None;
        }
        let payload = build_payload(history, &self.site);
        let id = self.next_id();
        self.in_flight += 1;
        Some(Job::Summary {
            id,
            request: SummaryRequest {
                payload,
                locale: self.bundle.locale,
                strings: self.bundle.strings.assistant.clone(),
            },
        })
    }

    /// Record a finished reply. Returns whether it was appended to the chat.
    pub fn complete(&mut self, done: Completion) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if done.id <= self.restart_floor {
            debug!("dropping reply {} issued before restart", done.id);
            return false;
        }
        if done.kind == JobKind::Explain {
            if done.id < self.latest_explanation_shown {
                debug!(
                    "dropping stale explanation {} (newer {} already shown)",
                    done.id, self.latest_explanation_shown
                );
                return false;
            }
            self.latest_explanation_shown = done.id;
        }
        self.chat.push(Sender::Assistant, done.text);
        true
    }
}
