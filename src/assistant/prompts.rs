//! System instructions sent with each assistant request, and citation formatting.

use std::collections::HashSet;

use crate::core::site_context::SiteContext;
use crate::core::tree::{Locale, NodeDefinition};
use crate::report::summary::SummaryPayload;

use super::Citation;

/// User turn sent with the summary request.
pub const SUMMARY_REQUEST: &str = "Generate my Strategic Action Plan based on this diagnostic audit.";

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

pub fn site_summary(site: &SiteContext) -> String {
    let species = site.species.join(", ");
    let land_use = site.land_use.active().join(", ");
    format!(
        "\nCHARACTERIZATION OF THE INVASION SITE (CONTEXT):\n\
- Country: {}\n\
- Specific Place: {}\n\
- Region: {}\n\
- Involved Species: {}\n\
- Invasion Stage: {}% (0: Initial arrival, 100: Massive invasion)\n\
- Land Use Context: {}\n\
- Socio-Economic Impact Level: {}\n\
- Expert Notes: {}",
        or_default(&site.country, "Unknown"),
        or_default(&site.specific_location, "Not specified"),
        or_default(&site.region, "Unknown"),
        or_default(&species, "General conifer species"),
        site.invasion_stage,
        or_default(&land_use, "Not specified"),
        site.impact_level.as_str(),
        or_default(&site.additional_notes, "None"),
    )
}

pub fn explanation_instruction(node: &NodeDefinition, locale: Locale, site: &SiteContext) -> String {
    let mut context_lines = vec![
        format!("- Node ID: {}", node.id),
        format!("- Node Type: {}", node.kind),
        format!("- Node Text: \"{}\"", node.prompt),
    ];
    if let Some(detail) = node.detail.as_deref().filter(|d| !d.is_empty()) {
        context_lines.push(format!("- Node Details: \"{detail}\""));
    }

    format!(
        "You are a Senior Strategic Consultant in ecological governance and invasive species management.\n\
Your goal is to provide high-level technical nuances, localized legal/administrative advice, and evidence-based ecological insights.\n\
The user is navigating an audit tree for conifer invasion. Use the provided site context to tailor every word.\n\
If the user asks about regulations, prioritize known frameworks for the specified country ({country}).\n\
The current diagnostic step is:\n\
{context}\n\
\n\
Site Context provided:\n\
{site}\n\
\n\
Tone: Professional, expert, actionable.\n\
Search grounding: Use Google Search to find specific regional conifer management plans or recent biological data for this area.\n\
IMPORTANT: You MUST respond in {language}.",
        country = site.country,
        context = context_lines.join("\n"),
        site = site_summary(site),
        language = locale.language_name(),
    )
}

pub fn summary_instruction(payload: &SummaryPayload, locale: Locale) -> String {
    format!(
        "You are a Lead Governance Auditor.\n\
The user has completed a diagnostic path. Based on the site context and their answers (scores), provide a 3-point Strategic Action Plan.\n\
Identify the main governance bottleneck based on their path (Ecological, Legal, or Financial).\n\
Tone: Executive, concise, authoritative.\n\
Response Language: {language}.\n\
\n\
SITE CONTEXT:\n\
{site}\n\
\n\
DIAGNOSTIC PATH TAKEN:\n\
{path}",
        language = locale.language_name(),
        site = payload.site_block,
        path = payload.path_text,
    )
}

/// `- title: uri` lines, first occurrence of each uri only.
pub fn format_sources(citations: &[Citation]) -> Vec<String> {
    let mut seen = HashSet::new();
    citations
        .iter()
        .filter(|c| !c.uri.is_empty() && seen.insert(c.uri.as_str()))
        .map(|c| {
            let title = c.title.as_deref().filter(|t| !t.is_empty()).unwrap_or("Untitled");
            format!("- {}: {}", title, c.uri)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::site_context::LandUse;
    use crate::core::tree::fixtures::node;
    use crate::core::tree::{Exits, NodeKind};

    #[test]
    fn test_site_summary_fallbacks() {
        let text = site_summary(&SiteContext::default());
        assert!(text.contains("- Country: Unknown\n"));
        assert!(text.contains("- Specific Place: Not specified\n"));
        assert!(text.contains("- Involved Species: General conifer species\n"));
        assert!(text.contains("- Land Use Context: Not specified\n"));
        assert!(text.ends_with("- Expert Notes: None"));
    }

    #[test]
    fn test_site_summary_land_use_keys() {
        let site = SiteContext {
            land_use: LandUse {
                forestry: true,
                agriculture: true,
                ..LandUse::default()
            },
            ..SiteContext::default()
        };
        assert!(site_summary(&site).contains("- Land Use Context: forestry, agriculture\n"));
    }

    #[test]
    fn test_explanation_embeds_node_and_language() {
        let mut n = node("Q5", NodeKind::Question, "Is there funding?", Exits::Terminal, None);
        n.detail = Some("Budget lines".into());
        let site = SiteContext {
            country: "Chile".into(),
            ..SiteContext::default()
        };
        let text = explanation_instruction(&n, Locale::Es, &site);
        assert!(text.contains("- Node ID: Q5\n- Node Type: QUESTION\n- Node Text: \"Is there funding?\"\n- Node Details: \"Budget lines\""));
        assert!(text.contains("frameworks for the specified country (Chile)."));
        assert!(text.ends_with("IMPORTANT: You MUST respond in Spanish."));
    }

    #[test]
    fn test_explanation_omits_missing_detail() {
        let n = node("O1", NodeKind::Outcome, "Done", Exits::Terminal, None);
        let text = explanation_instruction(&n, Locale::En, &SiteContext::default());
        assert!(!text.contains("Node Details"));
    }

    #[test]
    fn test_summary_instruction_layout() {
        let payload = SummaryPayload {
            path_text: "1. A (Score: 10%)".into(),
            site_block: "\nCONTEXT AUDIT:".into(),
        };
        let text = summary_instruction(&payload, Locale::En);
        assert!(text.contains("Response Language: English.\n\nSITE CONTEXT:\n\nCONTEXT AUDIT:\n\nDIAGNOSTIC PATH TAKEN:\n1. A (Score: 10%)"));
    }

    #[test]
    fn test_sources_deduplicated_by_uri() {
        let citations = vec![
            Citation {
                uri: "https://a.example".into(),
                title: Some("A".into()),
            },
            Citation {
                uri: "https://a.example".into(),
                title: Some("A again".into()),
            },
            Citation {
                uri: "https://b.example".into(),
                title: None,
            },
            Citation {
                uri: String::new(),
                title: Some("no uri".into()),
            },
        ];
        assert_eq!(
            format_sources(&citations),
            vec!["- A: https://a.example", "- Untitled: https://b.example"]
        );
    }
}
