//! ADR bridge: one observation per architecture decision record id,
//! overwritten whenever that ADR is re-rendered.

use crate::bridges::{summarize_artifact, write_bridge_observation};
use crate::model::observation_types;
use crate::storage::Storage;

pub fn on_adr_rendered(storage: Option<&Storage>, adr_id: &str, markdown: &str) {
    let topic_key = format!("adr/{adr_id}");
    let title = format!("ADR {adr_id}");
    let content = summarize_artifact(&format!("ADR {adr_id} recorded"), markdown);
    write_bridge_observation(storage, topic_key, title, observation_types::ARCHITECTURE, content, None);
}
