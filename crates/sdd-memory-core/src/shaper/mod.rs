//! Response Shaper.
//!
//! Turns raw `Observation`/graph results into the text a tool contract
//! returns: detail-level expansion, token budgeting, and the trailing
//! footer every non-error response carries (spec.md §4.4).

use crate::model::{DetailLevel, Observation};
use crate::tokens::{estimate_tokens, token_footer};

const STANDARD_SNIPPET_CHARS: usize = 500;
const BUDGET_CAPPED_MARKER: &str = "⚡ Budget-capped";
const TRUNCATED_MARKER: &str = "[…truncated by token budget]";

/// Cuts `text` at the last paragraph boundary (`\n\n`, falling back to
/// `\n`) at or before `max_chars`. Falls back to a hard char cut if no
/// boundary exists.
fn truncate_at_boundary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    if let Some(idx) = head.rfind("\n\n") {
        return head[..idx].to_string();
    }
    if let Some(idx) = head.rfind('\n') {
        return head[..idx].to_string();
    }
    head
}

/// Renders a single observation's body per detail level.
pub fn render_body(observation: &Observation, level: DetailLevel) -> String {
    match level {
        DetailLevel::Summary => String::new(),
        DetailLevel::Standard => truncate_at_boundary(&observation.content, STANDARD_SNIPPET_CHARS),
        DetailLevel::Full => observation.content.clone(),
    }
}

/// One formatted line (or block) for an observation, at the given
/// detail level, sans trailing footer.
pub fn render_observation(observation: &Observation, level: DetailLevel) -> String {
    let header = format!(
        "#{} [{}] {}{}",
        observation.id,
        observation.kind,
        observation.title,
        observation.topic_key.as_ref().map(|k| format!(" (topic_key: {k})")).unwrap_or_default(),
    );
    match level {
        DetailLevel::Summary => header,
        _ => {
            let body = render_body(observation, level);
            if body.is_empty() {
                header
            } else {
                format!("{header}\n{body}")
            }
        }
    }
}

/// Incremental build strategy (Search, Context): append items one by
/// one, tracking running token estimate, stop before exceeding budget.
/// `max_tokens` of 0 means unbounded.
pub fn build_incremental(observations: &[Observation], level: DetailLevel, max_tokens: usize, list_limit: usize) -> String {
    let total_available = observations.len();
    let mut lines = Vec::new();
    let mut running_tokens = 0usize;
    let mut budget_capped = false;
    let mut shown = 0usize;

    for observation in observations {
        if list_limit > 0 && shown >= list_limit {
            break;
        }
        let rendered = render_observation(observation, level);
        let candidate_tokens = estimate_tokens(&rendered);
        if max_tokens > 0 && running_tokens + candidate_tokens > max_tokens && !lines.is_empty() {
            budget_capped = true;
            break;
        }
        running_tokens += candidate_tokens;
        lines.push(rendered);
        shown += 1;
    }

    let mut out = lines.join("\n\n");
    if budget_capped {
        out.push_str(&format!("\n\n{BUDGET_CAPPED_MARKER}"));
    }
    if shown < total_available {
        out.push_str(&format!("\n\n📊 Showing {shown} of {total_available}"));
    }
    append_footer(out, level)
}

/// Post-hoc truncation strategy (Timeline, graph report): assemble the
/// full body, cut at a line boundary past 50% of budget if it
/// overflows `max_tokens`.
pub fn build_post_hoc(full_text: String, level: DetailLevel, max_tokens: usize) -> String {
    let estimated = estimate_tokens(&full_text);
    if max_tokens == 0 || estimated <= max_tokens {
        return append_footer(full_text, level);
    }

    let target_chars = (max_tokens * 4) / 2; // past the 50% mark, in chars
    let lines: Vec<&str> = full_text.split('\n').collect();
    let mut out = String::new();
    for line in &lines {
        if out.chars().count() + line.chars().count() > target_chars && !out.is_empty() {
            break;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }
    out.push_str(&format!("\n\n{TRUNCATED_MARKER}"));
    append_footer(out, level)
}

/// Truncates whole sections from the bottom of `priority` up (lowest
/// priority dropped first) before ever cutting mid-section, for
/// section-structured reports like the graph report.
pub fn build_sectioned(sections: &[(&str, String)], level: DetailLevel, max_tokens: usize) -> String {
    if max_tokens == 0 {
        let joined = sections.iter().map(|(_, body)| body.clone()).collect::<Vec<_>>().join("\n\n");
        return append_footer(joined, level);
    }

    let mut kept: Vec<&(&str, String)> = Vec::new();
    let mut running_tokens = 0usize;
    let mut dropped_any = false;
    for section in sections {
        let section_tokens = estimate_tokens(&section.1);
        if running_tokens + section_tokens > max_tokens && !kept.is_empty() {
            dropped_any = true;
            continue;
        }
        running_tokens += section_tokens;
        kept.push(section);
    }

    let mut joined = kept.iter().map(|(_, body)| body.clone()).collect::<Vec<_>>().join("\n\n");
    if dropped_any {
        joined.push_str(&format!("\n\n{TRUNCATED_MARKER}"));
    }
    append_footer(joined, level)
}

fn append_footer(mut body: String, level: DetailLevel) -> String {
    let tokens = estimate_tokens(&body);
    if level == DetailLevel::Summary {
        body.push_str("\n\n(summary view — pass detail_level: \"standard\" or \"full\" for more)");
    }
    body.push_str(&format!("\n\n{}", token_footer(tokens)));
    body
}
