//! Plain-text audit report and the dated export file names.
//!
//! The report body is a pure function of its inputs; dates only ever
//! appear in file names.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::core::chat::{ChatMessage, Sender};
use crate::core::navigation::HistoryStep;
use crate::core::site_context::SiteContext;
use crate::core::strings::UiStrings;

const RULE_WIDTH: usize = 20;

pub fn render_report(title: &str, site: &SiteContext, history: &[HistoryStep]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, title, site, history);
    out
}

fn write_report(
    out: &mut String,
    title: &str,
    site: &SiteContext,
    history: &[HistoryStep],
) -> std::fmt::Result {
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out)?;
    writeln!(out, "SITE CHARACTERIZATION:")?;
    writeln!(out, "- Country: {}", site.country)?;
    writeln!(out, "- Specific Place: {}", site.specific_location)?;
    writeln!(out, "- Region: {}", site.region)?;
    writeln!(out, "- Species: {}", site.species.join(", "))?;
    writeln!(out, "- Stage: {}%", site.invasion_stage)?;
    writeln!(out, "- Impact: {}", site.impact_level.as_str())?;
    writeln!(out)?;
    writeln!(out, "DIAGNOSTIC PATH:")?;
    for (i, step) in history.iter().enumerate() {
        writeln!(out, "[{}] ({}) {}", i + 1, step.node_id, step.node_text)?;
        if let Some(value) = step.answer_value {
            writeln!(out, "    Score: {value}%")?;
        }
    }
    Ok(())
}

/// Conversation transcript, one block per message.
pub fn render_chat_transcript(messages: &[ChatMessage], strings: &UiStrings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", strings.app_title, strings.chat.title);
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    for msg in messages {
        let who = match msg.sender {
            Sender::User => &strings.chat.user,
            Sender::Assistant => &strings.chat.ai,
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "[{}] {}:", msg.timestamp.format("%H:%M"), who);
        let _ = writeln!(out, "{}", msg.text);
    }
    out
}

pub fn report_filename(date: NaiveDate) -> String {
    format!("Diagnostic_Report_{}.txt", date.format("%Y-%m-%d"))
}

pub fn network_filename(date: NaiveDate) -> String {
    format!("Diagnostic_Network_{}.png", date.format("%Y-%m-%d"))
}

pub fn chat_filename(date: NaiveDate) -> String {
    format!("Diagnostic_Chat_{}.txt", date.format("%Y-%m-%d"))
}

/// Today's date in UTC, used for export names.
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}
