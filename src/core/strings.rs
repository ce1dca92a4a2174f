//! Localized UI text, deserialized from the embedded per-locale JSON.

use serde::Deserialize;

use super::tree::NodeKind;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiStrings {
    pub lang_code: String,
    pub app_title: String,
    pub app_subtitle: String,
    pub data_unavailable: String,
    pub select_language: String,
    pub node_kinds: NodeKindLabels,
    pub ranking: RankingScale,
    pub tutorial: TutorialStrings,
    pub chat: ChatStrings,
    pub node: NodePanelStrings,
    pub path: PathStrings,
    pub legend: LegendStrings,
    pub assistant: AssistantStrings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeKindLabels {
    pub question: String,
    pub reassessment: String,
    pub alert: String,
    pub intervention: String,
    pub outcome: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingLabel {
    pub label: String,
    pub desc: String,
}

/// Five Likert buckets covering 0..=100.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingScale {
    pub no_strong: RankingLabel,
    pub no_weak: RankingLabel,
    pub neutral: RankingLabel,
    pub yes_weak: RankingLabel,
    pub yes_strong: RankingLabel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TutorialStep {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TutorialStrings {
    pub skip: String,
    pub back: String,
    pub next: String,
    pub finish: String,
    pub close: String,
    pub steps: Vec<TutorialStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStrings {
    pub title: String,
    pub context_label: String,
    pub placeholder: String,
    pub user: String,
    pub ai: String,
    pub typing: String,
    pub error: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePanelStrings {
    pub show_details: String,
    pub hide_details: String,
    pub yes: String,
    pub no: String,
    #[serde(rename = "continue")]
    pub submit: String,
    pub back: String,
    pub restart: String,
    pub export: String,
    pub end_node_message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStrings {
    pub summary: String,
    pub empty: String,
    pub view_summary_button: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendStrings {
    pub title: String,
    pub question: String,
    pub alert: String,
    pub intervention: String,
    pub outcome: String,
    pub graph_view: String,
    pub export_png: String,
}

/// Fallback texts and headers used by the assistant boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantStrings {
    pub sources_header: String,
    pub format_error: String,
    pub technical_error: String,
    pub summary_failed: String,
    pub summary_service_error: String,
}

impl UiStrings {
    pub fn kind_label(&self, kind: NodeKind) -> &str {
        match kind {
            NodeKind::Question => &self.node_kinds.question,
            NodeKind::Reassessment => &self.node_kinds.reassessment,
            NodeKind::Alert => &self.node_kinds.alert,
            NodeKind::Intervention => &self.node_kinds.intervention,
            NodeKind::Outcome => &self.node_kinds.outcome,
        }
    }

    /// Likert bucket for a slider value: <20, <45, <55, <80, rest.
    pub fn ranking(&self, value: u8) -> &RankingLabel {
        let scale = &self.ranking;
        match value {
            0..=19 => &scale.no_strong,
            20..=44 => &scale.no_weak,
            45..=54 => &scale.neutral,
            55..=79 => &scale.yes_weak,
            _ => &scale.yes_strong,
        }
    }
}
