//! CLI definition using clap derive.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use hookmux_core::FileStore;
use hookmux_tmux::TmuxExecutor;

#[derive(Parser)]
#[command(
    name = "hookmux",
    version,
    about = "Claude Code pane-state tracker for the tmux status line"
)]
pub struct Cli {
    /// Directory of per-pane state files
    /// (default: $XDG_RUNTIME_DIR/hookmux or /tmp/hookmux-$USER)
    #[arg(long, global = true, env = "HOOKMUX_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// tmux binary
    #[arg(long, global = true, env = "HOOKMUX_TMUX", default_value = "tmux")]
    pub tmux_bin: String,

    /// tmux server socket path (passed as `-S`)
    #[arg(long, global = true, env = "HOOKMUX_TMUX_SOCKET")]
    pub tmux_socket: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, env = "HOOKMUX_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn store(&self) -> FileStore {
        FileStore::new(self.state_dir.clone().unwrap_or_else(default_state_dir))
    }

    pub fn tmux(&self) -> TmuxExecutor {
        let exec = TmuxExecutor::new(self.tmux_bin.clone());
        match &self.tmux_socket {
            Some(path) => exec.with_socket_path(path.clone()),
            None => exec,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Record an agent lifecycle event (called from Claude Code hooks)
    Hook(HookOpts),
    /// Status-line indicator (for `#(hookmux status)`)
    Status(StatusOpts),
    /// Exit 0 when a pane in the window awaits a decision, 1 otherwise
    Guard(WindowOpts),
    /// Answer the pending pane of the current window
    Respond(RespondOpts),
    /// List tracked panes
    List(ListOpts),
    /// Write hook configuration into Claude Code settings.json
    SetupHooks(SetupHooksOpts),
    /// Print a tmux.conf snippet wiring the status line and F-keys
    TmuxConf(TmuxConfOpts),
}

#[derive(clap::Args)]
pub struct HookOpts {
    /// Event name: start, submit, permission, question, tool-done, idle, stop, end
    pub event: String,

    /// Pane the agent runs in
    #[arg(long, env = "TMUX_PANE")]
    pub pane: Option<String>,

    /// Seconds to wait for a permission decision
    #[arg(long, env = "HOOKMUX_PERMISSION_TIMEOUT", default_value = "300")]
    pub timeout_secs: u64,

    /// Response poll interval in milliseconds
    #[arg(long, default_value = "500")]
    pub poll_ms: u64,
}

impl HookOpts {
    /// Pane id, treating an empty `TMUX_PANE` as unset.
    pub fn pane_id(&self) -> Option<&str> {
        self.pane.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(10))
    }
}

#[derive(clap::Args)]
pub struct StatusOpts {
    /// Rendered when a pane needs attention
    #[arg(long, default_value = "#[fg=yellow,bold,blink]◉#[default]")]
    pub attention_format: String,

    /// Rendered when agents are tracked but none needs attention
    #[arg(long, default_value = "#[fg=colour244]●#[default]")]
    pub active_format: String,
}

#[derive(clap::Args)]
pub struct WindowOpts {
    /// Window target (default: the current window)
    #[arg(long, short = 't')]
    pub window: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RelayKey {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
    #[value(name = "3")]
    Three,
    Focus,
}

#[derive(clap::Args)]
pub struct RespondOpts {
    pub key: RelayKey,

    #[command(flatten)]
    pub window: WindowOpts,
}

#[derive(clap::Args)]
pub struct ListOpts {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct SetupHooksOpts {
    /// "user" (~/.claude/settings.json) or "project" (.claude/settings.json)
    #[arg(long, default_value = "user")]
    pub scope: String,

    /// hookmux binary to call from the hooks (default: this executable)
    #[arg(long)]
    pub bin: Option<String>,

    /// Permission wait in seconds, mirrored into the hook timeout
    #[arg(long, default_value = "300")]
    pub timeout_secs: u64,
}

#[derive(clap::Args)]
pub struct TmuxConfOpts {
    /// hookmux binary referenced by the snippet
    #[arg(long, default_value = "hookmux")]
    pub bin: String,

    /// status-interval in seconds
    #[arg(long, default_value = "3")]
    pub interval: u32,
}

/// Global options that take a value, as spelled on the command line.
const GLOBAL_VALUE_FLAGS: &[&str] = &["--state-dir", "--tmux-bin", "--tmux-socket", "--log-file"];

/// Whether argv names the `hook` subcommand. Used when parsing failed, to
/// keep hook invocations from failing the agent.
pub fn is_hook_invocation<I, T>(args: I) -> bool
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString>,
{
    let mut args = args.into_iter().skip(1).map(Into::into);
    while let Some(arg) = args.next() {
        let Some(arg) = arg.to_str() else {
            return false;
        };
        if GLOBAL_VALUE_FLAGS.contains(&arg) {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return arg == "hook";
    }
    false
}

/// Per-user state directory under the runtime dir, else under /tmp.
pub fn default_state_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_RUNTIME_DIR").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir).join("hookmux");
    }
    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/hookmux-{user}"))
}
