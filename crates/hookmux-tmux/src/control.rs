//! Control commands: pane user option, status refresh, messages, keys.

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

/// Pane user option carrying the tracked state, for use in
/// `pane-border-format` or `window-status-format`.
pub const STATE_OPTION: &str = "@hookmux_state";

pub fn set_state_option(
    runner: &impl TmuxCommandRunner,
    pane_id: &str,
    value: &str,
) -> Result<(), TmuxError> {
    runner.run(&["set-option", "-p", "-t", pane_id, STATE_OPTION, value])?;
    Ok(())
}

pub fn unset_state_option(runner: &impl TmuxCommandRunner, pane_id: &str) -> Result<(), TmuxError> {
    runner.run(&["set-option", "-p", "-u", "-t", pane_id, STATE_OPTION])?;
    Ok(())
}

/// Redraw status lines of all clients so the indicator updates before the
/// next `status-interval` tick.
pub fn refresh_status(runner: &impl TmuxCommandRunner) -> Result<(), TmuxError> {
    runner.run(&["refresh-client", "-S"])?;
    Ok(())
}

/// Show a message on clients viewing the session of `pane_id`.
pub fn display_message(
    runner: &impl TmuxCommandRunner,
    pane_id: &str,
    message: &str,
) -> Result<(), TmuxError> {
    // Literal '#' would otherwise be expanded as a format.
    let escaped = message.replace('#', "##");
    runner.run(&["display-message", "-t", pane_id, &escaped])?;
    Ok(())
}

/// Type `text` into the pane literally, then press Enter.
pub fn send_keys(runner: &impl TmuxCommandRunner, pane_id: &str, text: &str) -> Result<(), TmuxError> {
    runner.run(&["send-keys", "-t", pane_id, "-l", text])?;
    runner.run(&["send-keys", "-t", pane_id, "Enter"])?;
    Ok(())
}

pub fn select_pane(runner: &impl TmuxCommandRunner, pane_id: &str) -> Result<(), TmuxError> {
    runner.run(&["select-pane", "-t", pane_id])?;
    Ok(())
}
