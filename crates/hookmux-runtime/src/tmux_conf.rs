//! `hookmux tmux-conf`: tmux.conf snippet for the status indicator and the
//! F-key responder.

use crate::cli::TmuxConfOpts;

/// F-key and the `respond` argument it sends while a decision is pending.
const KEY_BINDINGS: &[(&str, &str)] = &[("F1", "1"), ("F2", "2"), ("F3", "3"), ("F4", "focus")];

pub fn render(opts: &TmuxConfOpts) -> String {
    let bin = &opts.bin;
    let mut out = String::new();
    out.push_str("# hookmux: Claude Code pane state\n");
    out.push_str(&format!("set -g status-interval {}\n", opts.interval));
    out.push_str(&format!("set -ga status-right ' #({bin} status)'\n"));
    for (key, arg) in KEY_BINDINGS {
        // Outside a pending window the key reaches the application unchanged.
        out.push_str(&format!(
            "bind -n {key} if-shell '{bin} guard -t \"#{{window_id}}\"' \
             'run-shell \"{bin} respond {arg} -t #{{window_id}}\"' 'send-keys {key}'\n"
        ));
    }
    out
}
