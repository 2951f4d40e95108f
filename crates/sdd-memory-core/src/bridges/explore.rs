//! Explore bridge: used by a pre-pipeline exploration contract.
//! Structured sections merge independently — a non-empty incoming
//! section overrides its predecessor, an empty one leaves the existing
//! section untouched.

use crate::model::{observation_types, Scope};
use crate::storage::Storage;
use crate::util::slugify;

const SECTION_ORDER: &[&str] = &["Goals", "Constraints", "Preferences", "Unknowns", "Decisions", "Context"];

/// The six structured sections an exploration observation is built
/// from. Each is `None` when the caller did not touch it this round.
#[derive(Debug, Clone, Default)]
pub struct ExploreSections {
    pub goals: Option<String>,
    pub constraints: Option<String>,
    pub preferences: Option<String>,
    pub unknowns: Option<String>,
    pub decisions: Option<String>,
    pub context: Option<String>,
}

impl ExploreSections {
    fn as_pairs(&self) -> [(&'static str, &Option<String>); 6] {
        [
            ("Goals", &self.goals),
            ("Constraints", &self.constraints),
            ("Preferences", &self.preferences),
            ("Unknowns", &self.unknowns),
            ("Decisions", &self.decisions),
            ("Context", &self.context),
        ]
    }

    /// Merges `self` (incoming) over `existing`: a non-empty incoming
    /// value wins; an absent or blank one falls back to `existing`.
    pub fn merge(&self, existing: &ExploreSections) -> ExploreSections {
        let pick = |incoming: &Option<String>, prior: &Option<String>| -> Option<String> {
            match incoming {
                Some(text) if !text.trim().is_empty() => Some(text.clone()),
                _ => prior.clone(),
            }
        };
        ExploreSections {
            goals: pick(&self.goals, &existing.goals),
            constraints: pick(&self.constraints, &existing.constraints),
            preferences: pick(&self.preferences, &existing.preferences),
            unknowns: pick(&self.unknowns, &existing.unknowns),
            decisions: pick(&self.decisions, &existing.decisions),
            context: pick(&self.context, &existing.context),
        }
    }

    pub fn to_markdown(&self) -> String {
        self.as_pairs()
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|text| format!("## {name}\n{text}")))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn from_markdown(markdown: &str) -> ExploreSections {
        let mut out = ExploreSections::default();
        let mut current: Option<&'static str> = None;
        let mut buffer = String::new();

        let flush = |out: &mut ExploreSections, current: Option<&'static str>, buffer: &str| {
            let Some(name) = current else { return };
            let text = buffer.trim().to_string();
            match name {
                "Goals" => out.goals = Some(text),
                "Constraints" => out.constraints = Some(text),
                "Preferences" => out.preferences = Some(text),
                "Unknowns" => out.unknowns = Some(text),
                "Decisions" => out.decisions = Some(text),
                "Context" => out.context = Some(text),
                _ => {}
            }
        };

        for line in markdown.lines() {
            if let Some(heading) = line.strip_prefix("## ") {
                flush(&mut out, current, &buffer);
                buffer.clear();
                current = SECTION_ORDER.iter().find(|s| **s == heading.trim()).copied();
            } else {
                buffer.push_str(line);
                buffer.push('\n');
            }
        }
        flush(&mut out, current, &buffer);
        out
    }
}

/// Merges `sections` into whatever exploration observation already
/// exists at `topic_key = "explore/<slug(title)>"`, and upserts it.
pub fn on_explore_update(storage: Option<&Storage>, title: &str, sections: &ExploreSections) {
    let Some(storage) = storage else {
        return;
    };
    let topic_key = format!("explore/{}", slugify(title));

    let existing = match storage.find_by_topic_key(&topic_key, None, Scope::Project) {
        Ok(existing) => existing,
        Err(err) => {
            tracing::warn!(error = %err, "explore bridge lookup failed, continuing pipeline");
            return;
        }
    };
    let existing_sections = existing.map(|o| ExploreSections::from_markdown(&o.content)).unwrap_or_default();
    let merged = sections.merge(&existing_sections);

    let params = crate::model::AddObservationParams {
        session_id: None,
        kind: observation_types::EXPLORE.to_string(),
        title: format!("Explore: {title}"),
        content: merged.to_markdown(),
        project: None,
        scope: Scope::Project,
        namespace: None,
        topic_key: Some(topic_key),
    };
    if let Err(err) = storage.add_observation(params) {
        tracing::warn!(error = %err, "explore bridge write failed, continuing pipeline");
    }
}
