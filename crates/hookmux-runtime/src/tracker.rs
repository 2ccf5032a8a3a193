//! Tracker: state transitions over the store, plus the best-effort tmux
//! side effects (pane option, status refresh, messages).

use hookmux_core::{PaneDetail, PaneState, PaneStore};
use hookmux_tmux::{
    TmuxCommandRunner, display_message, refresh_status, set_state_option, unset_state_option,
};

pub struct Tracker<S, R> {
    store: S,
    tmux: R,
}

impl<S: PaneStore, R: TmuxCommandRunner> Tracker<S, R> {
    pub fn new(store: S, tmux: R) -> Self {
        Self { store, tmux }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tmux(&self) -> &R {
        &self.tmux
    }

    /// Record `state`. Leaving an attention state drops the detail.
    pub fn transition(&self, pane_id: &str, state: PaneState) -> anyhow::Result<()> {
        self.store.write_state(pane_id, state)?;
        if !state.needs_attention() {
            self.store.clear_detail(pane_id)?;
        }
        self.show(pane_id, Some(state));
        Ok(())
    }

    /// Enter an attention state. The detail is written first so that any
    /// reader seeing the state also finds its detail.
    pub fn await_operator(
        &self,
        pane_id: &str,
        state: PaneState,
        detail: &PaneDetail,
    ) -> anyhow::Result<()> {
        debug_assert!(state.needs_attention());
        self.store.write_detail(pane_id, detail)?;
        self.store.write_state(pane_id, state)?;
        self.show(pane_id, Some(state));
        Ok(())
    }

    /// Drop the pane's record and indicator.
    pub fn forget(&self, pane_id: &str) -> anyhow::Result<()> {
        self.store.clear(pane_id)?;
        self.show(pane_id, None);
        Ok(())
    }

    pub fn notify(&self, pane_id: &str, message: &str) {
        if let Err(e) = display_message(&self.tmux, pane_id, message) {
            tracing::debug!("notify {pane_id} failed: {e}");
        }
    }

    fn show(&self, pane_id: &str, state: Option<PaneState>) {
        let result = match state {
            Some(s) => set_state_option(&self.tmux, pane_id, s.as_str()),
            None => unset_state_option(&self.tmux, pane_id),
        };
        if let Err(e) = result.and_then(|()| refresh_status(&self.tmux)) {
            tracing::debug!("indicator update for {pane_id} failed: {e}");
        }
    }
}
