use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HookmuxError;

// ─── Pane state ───────────────────────────────────────────────────

/// Lifecycle state of the agent running in a pane.
///
/// A pane with no recorded state has no tracked agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneState {
    Idle,
    Running,
    Permission,
    Question,
}

impl PaneState {
    pub const ALL: [Self; 4] = [Self::Idle, Self::Running, Self::Permission, Self::Question];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Permission => "permission",
            Self::Question => "question",
        }
    }

    /// The agent is blocked on an operator decision.
    pub fn needs_attention(self) -> bool {
        matches!(self, Self::Permission | Self::Question)
    }
}

impl fmt::Display for PaneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaneState {
    type Err = HookmuxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "running" => Ok(Self::Running),
            "permission" => Ok(Self::Permission),
            "question" => Ok(Self::Question),
            other => Err(HookmuxError::UnknownState(other.to_string())),
        }
    }
}

// ─── Hook events ──────────────────────────────────────────────────

/// Lifecycle events delivered by the agent's hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    Start,
    Submit,
    Permission,
    Question,
    ToolDone,
    Idle,
    Stop,
    End,
}

impl HookEvent {
    pub const ALL: [Self; 8] = [
        Self::Start,
        Self::Submit,
        Self::Permission,
        Self::Question,
        Self::ToolDone,
        Self::Idle,
        Self::Stop,
        Self::End,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Submit => "submit",
            Self::Permission => "permission",
            Self::Question => "question",
            Self::ToolDone => "tool-done",
            Self::Idle => "idle",
            Self::Stop => "stop",
            Self::End => "end",
        }
    }

    /// Parse an event name. Unknown names yield `None` so callers can ignore
    /// events added by newer agent versions.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name.trim())
    }

    /// Events whose hook call carries a JSON payload on stdin.
    pub fn reads_payload(self) -> bool {
        matches!(self, Self::Permission | Self::Question)
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Operator response ────────────────────────────────────────────

/// Operator decision for a pending permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Response {
    /// Allow this request once.
    Allow,
    /// Allow, chosen from the "always" menu entry. Delivered to the agent as
    /// a plain allow; kept distinct for the log.
    Always,
    Deny,
}

impl Response {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Always => "always",
            Self::Deny => "deny",
        }
    }

    pub fn is_allow(self) -> bool {
        matches!(self, Self::Allow | Self::Always)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Response {
    type Err = HookmuxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "always" => Ok(Self::Always),
            "deny" => Ok(Self::Deny),
            other => Err(HookmuxError::UnknownResponse(other.to_string())),
        }
    }
}

// ─── Detail ───────────────────────────────────────────────────────

/// Payload attached to a pane while it waits on the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaneDetail {
    Permission {
        tool_name: String,
        summary: String,
        since: DateTime<Utc>,
    },
    Question {
        message: String,
        since: DateTime<Utc>,
    },
}

impl PaneDetail {
    pub fn since(&self) -> DateTime<Utc> {
        match self {
            Self::Permission { since, .. } | Self::Question { since, .. } => *since,
        }
    }

    /// One-line human description, e.g. `Bash: git push --force`.
    pub fn headline(&self) -> String {
        match self {
            Self::Permission {
                tool_name, summary, ..
            } => {
                if summary.is_empty() {
                    tool_name.clone()
                } else {
                    format!("{tool_name}: {summary}")
                }
            }
            Self::Question { message, .. } => message.clone(),
        }
    }
}

/// Ordering key for tmux pane ids: `%2` sorts before `%10`. Ids that are not
/// of the `%N` form sort last, by name.
pub fn pane_sort_key(pane_id: &str) -> (u64, &str) {
    let n = pane_id
        .strip_prefix('%')
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or(u64::MAX);
    (n, pane_id)
}
