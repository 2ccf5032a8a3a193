//! hookmux-tmux: tmux IO boundary.
//! Subprocess execution, pane listing and liveness, and the handful of
//! control commands the tracker issues (user options, messages, keys).

pub mod control;
pub mod error;
pub mod executor;
pub mod pane_info;

pub use control::{
    STATE_OPTION, display_message, refresh_status, select_pane, send_keys, set_state_option,
    unset_state_option,
};
pub use error::TmuxError;
pub use executor::{TmuxCommandRunner, TmuxExecutor};
pub use pane_info::{
    LIST_PANES_FORMAT, TmuxPaneInfo, list_window_panes, live_pane_ids,
    pane_exists, parse_list_panes_output,
};
