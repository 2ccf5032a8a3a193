//! `hookmux status` and `hookmux guard`.
//!
//! `status` runs on every status-line redraw, so it stays cheap: one store
//! scan, at most one `list-panes`, and it stops at the first pane needing
//! attention.

use hookmux_core::{PaneState, PaneStore};
use hookmux_tmux::{TmuxCommandRunner, TmuxError, list_window_panes, live_pane_ids};

use crate::cli::StatusOpts;

/// What the status line shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Summary {
    /// Some pane waits on a permission decision or a question.
    Attention,
    /// Agents are tracked, none blocked.
    Active,
    Nothing,
}

/// Entry point for `hookmux status`. Errors render as nothing.
pub fn cmd_status(store: impl PaneStore, tmux: impl TmuxCommandRunner, opts: &StatusOpts) {
    let summary = summarize(&store, &tmux).unwrap_or_else(|e| {
        tracing::warn!("status scan failed: {e:#}");
        Summary::Nothing
    });
    print!("{}", render(summary, opts));
}

/// Scan all records, collecting those whose pane is gone.
pub fn summarize(store: &impl PaneStore, tmux: &impl TmuxCommandRunner) -> anyhow::Result<Summary> {
    let records = store.scan()?;
    if records.is_empty() {
        return Ok(Summary::Nothing);
    }

    let live = match live_pane_ids(tmux) {
        Ok(ids) => Some(ids),
        // Server gone: every record is stale.
        Err(TmuxError::NoServer) => Some(Default::default()),
        Err(e) => {
            tracing::debug!("liveness unknown, skipping collection: {e}");
            None
        }
    };

    let mut summary = Summary::Nothing;
    for (pane_id, state) in records {
        if live.as_ref().is_some_and(|ids| !ids.contains(&pane_id)) {
            tracing::debug!("collecting record of vanished pane {pane_id}");
            if let Err(e) = store.clear(&pane_id) {
                tracing::warn!("failed to collect {pane_id}: {e}");
            }
            continue;
        }
        if state.needs_attention() {
            return Ok(Summary::Attention);
        }
        summary = Summary::Active;
    }
    Ok(summary)
}

pub fn render(summary: Summary, opts: &StatusOpts) -> String {
    match summary {
        Summary::Attention => opts.attention_format.clone(),
        Summary::Active => opts.active_format.clone(),
        Summary::Nothing => String::new(),
    }
}

/// Entry point for `hookmux guard`: `true` means intercept the key.
pub fn cmd_guard(
    store: impl PaneStore,
    tmux: impl TmuxCommandRunner,
    window: Option<&str>,
) -> bool {
    match find_pending(&store, &tmux, window) {
        Ok(found) => found.is_some(),
        Err(e) => {
            tracing::debug!("guard: {e:#}");
            false
        }
    }
}

/// First pane of the window, in pane-index order, awaiting the operator.
///
/// Several pending panes in one window is not expected; the lowest index
/// wins.
pub fn find_pending(
    store: &impl PaneStore,
    tmux: &impl TmuxCommandRunner,
    window: Option<&str>,
) -> anyhow::Result<Option<(String, PaneState)>> {
    for pane in list_window_panes(tmux, window)? {
        match store.read_state(&pane.pane_id)? {
            Some(state) if state.needs_attention() => return Ok(Some((pane.pane_id, state))),
            _ => {}
        }
    }
    Ok(None)
}
