//! Payload for the AI strategic summary: the numbered path plus a site block.

use crate::core::navigation::HistoryStep;
use crate::core::site_context::SiteContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPayload {
    pub path_text: String,
    pub site_block: String,
}

/// `"{i}. {text} (Score: {value|N/A}%)"`, one line per step.
pub fn path_summary(history: &[HistoryStep]) -> String {
    history
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let score = step
                .answer_value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            format!("{}. {} (Score: {}%)", i + 1, step.node_text, score)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn site_block(site: &SiteContext) -> String {
    format!(
        "\nCONTEXT AUDIT:\n- Location: {}, {}, {}\n- Species: {}\n- Stage: {}%\n- Impact: {}",
        site.specific_location,
        site.region,
        site.country,
        site.species.join(", "),
        site.invasion_stage,
        site.impact_level.as_str()
    )
}

pub fn build_payload(history: &[HistoryStep], site: &SiteContext) -> SummaryPayload {
    SummaryPayload {
        path_text: path_summary(history),
        site_block: site_block(site),
    }
}
