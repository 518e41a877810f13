//! Output formatting utilities

use crate::application::DispatchResult;
use crate::domain::Entry;

const PREVIEW_CHARS: usize = 48;

fn preview(entry: &Entry) -> String {
    let text = [
        &entry.raw_thoughts,
        &entry.gratitude,
        &entry.tasks,
        &entry.pain_points,
    ]
    .into_iter()
    .flatten()
    .map(|s| s.trim())
    .find(|s| !s.is_empty())
    .unwrap_or("");

    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

/// Format a list of entries for display
pub fn format_entry_list(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return "No entries found".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&format!(
            "{}  #{:<5} {}\n",
            entry.date.format("%d-%m-%Y"),
            entry.id,
            preview(entry)
        ));
    }
    output
}

/// Format a dispatch result: one section per aspect, then the summary
pub fn format_dispatch_result(result: &DispatchResult) -> String {
    let mut output = String::new();

    for (aspect, response) in &result.aspect_responses {
        output.push_str(&format!("[{}]\n{}\n\n", aspect, response.trim()));
    }

    if let Some(safety) = &result.safety {
        let verdict = if safety.flagged { "FLAGGED" } else { "ok" };
        output.push_str(&format!("Safety: {}\n\n", verdict));
    }

    output.push_str(&format!("[summary]\n{}\n", result.summary.trim()));
    output
}
