//! `hookmux respond <1|2|3|focus>`: act on the pending pane of the window.

use hookmux_core::{PaneState, PaneStore, Response};
use hookmux_tmux::{TmuxCommandRunner, select_pane, send_keys};

use crate::cli::RelayKey;
use crate::reporter::find_pending;
use crate::tracker::Tracker;

/// What `respond` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayAction {
    /// No pane in the window awaits a decision.
    Nothing,
    /// A permission response was written for the blocked hook.
    Responded { pane_id: String, response: Response },
    /// The option was typed into the agent's own menu.
    Typed { pane_id: String, keys: &'static str },
    Focused { pane_id: String },
}

impl RelayKey {
    fn digit(self) -> Option<&'static str> {
        match self {
            Self::One => Some("1"),
            Self::Two => Some("2"),
            Self::Three => Some("3"),
            Self::Focus => None,
        }
    }

    /// 1 allows once, 2 allows "always", 3 denies.
    fn permission_response(self) -> Option<Response> {
        match self {
            Self::One => Some(Response::Allow),
            Self::Two => Some(Response::Always),
            Self::Three => Some(Response::Deny),
            Self::Focus => None,
        }
    }
}

/// Entry point for `hookmux respond`.
pub fn cmd_respond<S: PaneStore, R: TmuxCommandRunner>(
    tracker: &Tracker<S, R>,
    key: RelayKey,
    window: Option<&str>,
) -> anyhow::Result<RelayAction> {
    let Some((pane_id, state)) = find_pending(tracker.store(), tracker.tmux(), window)? else {
        tracing::debug!("respond {key:?}: nothing pending");
        return Ok(RelayAction::Nothing);
    };

    let action = match (key.permission_response(), key.digit(), state) {
        (None, _, _) => {
            select_pane(tracker.tmux(), &pane_id)?;
            RelayAction::Focused { pane_id }
        }
        (Some(response), _, PaneState::Permission) => {
            tracker.store().write_response(&pane_id, response)?;
            // Optimistic; the blocked hook sets running again when it wakes.
            tracker.transition(&pane_id, PaneState::Running)?;
            RelayAction::Responded { pane_id, response }
        }
        (Some(_), Some(keys), PaneState::Question) => {
            send_keys(tracker.tmux(), &pane_id, keys)?;
            tracker.transition(&pane_id, PaneState::Running)?;
            RelayAction::Typed { pane_id, keys }
        }
        _ => RelayAction::Nothing,
    };
    tracing::info!("respond {key:?}: {action:?}");
    Ok(action)
}
