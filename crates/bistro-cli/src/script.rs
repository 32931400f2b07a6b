//! Edit scripts: a JSON array of canvas commands and drop gestures.
//!
//! ```json
//! [
//!   { "op": "add_block", "kind": "header", "position": 0 },
//!   { "op": "add_block", "kind": "menu", "position": 1 },
//!   { "drop": { "gesture": "…", "item": { "source": "existing", "index": 1 },
//!               "zone": { "index": 0 } } },
//!   { "op": "undo" }
//! ]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use bistro_canvas::{CanvasCommand, DropEvent};
use bistro_client::EditSession;
use serde::Deserialize;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Drop { drop: DropEvent },
    Command(CanvasCommand),
}

/// Counts from one replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub changed: usize,
}

pub fn parse(text: &str) -> Result<Vec<Step>> {
    serde_json::from_str(text).context("edit script is not a JSON array of steps")
}

pub fn load(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading edit script {}", path.display()))?;
    parse(&text)
}

/// Apply `steps` in order, stopping at the first one that fails.
pub fn replay(session: &EditSession, steps: Vec<Step>) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for (n, step) in steps.into_iter().enumerate() {
        let changed = match step {
            Step::Drop { drop } => session.drop_block(&drop),
            Step::Command(command) => session.dispatch(command).map(|e| e.changed),
        }
        .with_context(|| format!("step {n} failed"))?;

        debug!(step = n, changed, "replayed");
        summary.steps += 1;
        if changed {
            summary.changed += 1;
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bistro_canvas::BlockKind;
    use bistro_client::{MemoryWebsiteRemote, TracingNotifier};
    use bistro_types::RestaurantId;

    use super::*;

    fn session() -> EditSession {
        EditSession::new(
            RestaurantId::new(),
            Arc::new(MemoryWebsiteRemote::new()),
            Arc::new(TracingNotifier),
        )
    }

    #[test]
    fn test_parse_mixed_steps() {
        let steps = parse(
            r#"[
                { "op": "add_block", "kind": "header", "position": 0 },
                { "drop": { "gesture": "0190a5b2-7c3e-7def-8abc-0123456789ab",
                            "item": { "source": "new", "kind": "footer" },
                            "zone": { "index": 1 } } },
                { "op": "redo" }
            ]"#,
        )
        .unwrap();
        assert_eq!(steps.len(), 3);
        assert!(matches!(steps[1], Step::Drop { .. }));
        assert_eq!(steps[2], Step::Command(CanvasCommand::Redo));
    }

    #[test]
    fn test_replay_counts_changes() {
        let session = session();
        let steps = parse(
            r#"[
                { "op": "add_block", "kind": "header", "position": 0 },
                { "op": "add_block", "kind": "menu", "position": 1 },
                { "op": "reorder_blocks", "source": 0, "target": 1 },
                { "op": "reorder_blocks", "source": 1, "target": 1 },
                { "op": "undo" }
            ]"#,
        )
        .unwrap();

        let summary = replay(&session, steps).unwrap();
        assert_eq!(summary, ReplaySummary { steps: 5, changed: 4 });
        let kinds: Vec<_> = session.blocks().iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BlockKind::Header, BlockKind::Menu]);
    }

    #[test]
    fn test_replay_stops_at_failing_step() {
        let session = session();
        let steps = parse(
            r#"[
                { "op": "add_block", "kind": "hero", "position": 0 },
                { "op": "add_block", "kind": "menu", "position": 7 },
                { "op": "add_block", "kind": "footer", "position": 1 }
            ]"#,
        )
        .unwrap();

        let err = replay(&session, steps).unwrap_err();
        assert!(err.to_string().contains("step 1"));
        assert_eq!(session.blocks().len(), 1);
    }

    #[test]
    fn test_bad_script_is_reported() {
        assert!(parse(r#"{ "op": "undo" }"#).is_err());
        assert!(parse(r#"[{ "op": "fly" }]"#).is_err());
    }
}
