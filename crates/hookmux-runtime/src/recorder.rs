//! `hookmux hook <event>`: apply an agent lifecycle event to the pane record.
//!
//! `permission` blocks until the operator answers through `hookmux respond`,
//! the pane disappears, or the timeout elapses, and prints the decision JSON
//! only when an answer arrived. Every other event prints nothing.

use std::io::Read;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hookmux_core::{HookEvent, PaneDetail, PaneState, PaneStore, Response};
use hookmux_tmux::{TmuxCommandRunner, pane_exists};
use serde_json::{Value, json};
use tokio::time::Instant;

use crate::cli::HookOpts;
use crate::context::{single_line, truncate_display};
use crate::tracker::Tracker;

/// Longest argument summary kept in a permission detail.
const SUMMARY_MAX_CHARS: usize = 120;

pub const DENY_MESSAGE: &str = "Denied via tmux hotkey";

/// Bounds of the permission wait.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

/// How a permission wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Responded(Response),
    TimedOut,
    PaneGone,
    Interrupted,
}

/// Entry point for `hookmux hook`.
pub async fn cmd_hook<S: PaneStore, R: TmuxCommandRunner>(
    store: S,
    tmux: R,
    opts: &HookOpts,
) -> anyhow::Result<()> {
    let Some(pane_id) = opts.pane_id() else {
        tracing::debug!("hook {}: not inside a tmux pane, ignoring", opts.event);
        return Ok(());
    };
    let Some(event) = HookEvent::parse(&opts.event) else {
        tracing::debug!("hook: unknown event {:?}, ignoring", opts.event);
        return Ok(());
    };

    let payload = if event.reads_payload() {
        read_payload(std::io::stdin().lock())
    } else {
        Value::Null
    };

    let policy = WaitPolicy {
        timeout: opts.timeout(),
        poll_interval: opts.poll_interval(),
    };
    let tracker = Tracker::new(store, tmux);
    if let Some(output) = handle_event(&tracker, pane_id, event, &payload, policy).await? {
        println!("{output}");
    }
    Ok(())
}

/// Parse the hook's stdin. Anything unreadable becomes `null`.
pub fn read_payload(mut input: impl Read) -> Value {
    let mut raw = String::new();
    if let Err(e) = input.read_to_string(&mut raw) {
        tracing::debug!("hook payload unreadable: {e}");
        return Value::Null;
    }
    if raw.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::debug!("hook payload is not JSON: {e}");
        Value::Null
    })
}

/// Apply one event. Returns the JSON to print on stdout, if any.
pub async fn handle_event<S: PaneStore, R: TmuxCommandRunner>(
    tracker: &Tracker<S, R>,
    pane_id: &str,
    event: HookEvent,
    payload: &Value,
    policy: WaitPolicy,
) -> anyhow::Result<Option<Value>> {
    tracing::debug!("{pane_id}: {event}");
    match event {
        HookEvent::Start | HookEvent::Stop => tracker.transition(pane_id, PaneState::Idle)?,
        HookEvent::Submit => tracker.transition(pane_id, PaneState::Running)?,
        HookEvent::ToolDone => {
            // The permission handler owns the way out of `permission`.
            if tracker.store().read_state(pane_id)? != Some(PaneState::Permission) {
                tracker.transition(pane_id, PaneState::Running)?;
            }
        }
        HookEvent::Idle => {
            tracker.transition(pane_id, PaneState::Idle)?;
            tracker.notify(pane_id, "Claude is ready for input");
        }
        HookEvent::End => tracker.forget(pane_id)?,
        HookEvent::Question => {
            let detail = question_detail(payload, Utc::now());
            tracker.await_operator(pane_id, PaneState::Question, &detail)?;
            tracker.notify(pane_id, &format!("Claude asks: {}", detail.headline()));
        }
        HookEvent::Permission => return handle_permission(tracker, pane_id, payload, policy).await,
    }
    Ok(None)
}

async fn handle_permission<S: PaneStore, R: TmuxCommandRunner>(
    tracker: &Tracker<S, R>,
    pane_id: &str,
    payload: &Value,
    policy: WaitPolicy,
) -> anyhow::Result<Option<Value>> {
    let detail = permission_detail(payload, Utc::now());

    if let Some(stale) = tracker.store().try_read_response(pane_id)? {
        tracing::info!("{pane_id}: discarding stale response {stale}");
    }
    tracker.await_operator(pane_id, PaneState::Permission, &detail)?;
    tracker.notify(
        pane_id,
        &format!("Claude needs permission: {}", detail.headline()),
    );

    let waited = wait_for_response(tracker, pane_id, policy).await;
    // Leave `permission` however the wait ended; a claimed answer is still
    // delivered if this fails.
    if let Err(e) = tracker.transition(pane_id, PaneState::Running) {
        tracing::warn!("{pane_id}: failed to leave permission state: {e:#}");
    }

    match waited? {
        WaitOutcome::Responded(response) => {
            tracing::info!("{pane_id}: {} -> {response}", detail.headline());
            Ok(Some(decision_output(response)))
        }
        other => {
            tracing::info!("{pane_id}: no decision ({other:?}), deferring to agent prompt");
            Ok(None)
        }
    }
}

/// Poll for the operator's response, re-checking pane liveness each round.
pub async fn wait_for_response<S: PaneStore, R: TmuxCommandRunner>(
    tracker: &Tracker<S, R>,
    pane_id: &str,
    policy: WaitPolicy,
) -> anyhow::Result<WaitOutcome> {
    wait_until_answered(tracker, pane_id, policy, shutdown_signal()).await
}

/// The wait loop; resolving `shutdown` ends it with `Interrupted`.
async fn wait_until_answered<S: PaneStore, R: TmuxCommandRunner>(
    tracker: &Tracker<S, R>,
    pane_id: &str,
    policy: WaitPolicy,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<WaitOutcome> {
    let deadline = Instant::now() + policy.timeout;
    tokio::pin!(shutdown);

    loop {
        if let Some(response) = tracker.store().try_read_response(pane_id)? {
            return Ok(WaitOutcome::Responded(response));
        }
        if !pane_exists(tracker.tmux(), pane_id) {
            return Ok(WaitOutcome::PaneGone);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(WaitOutcome::TimedOut);
        }

        let nap = policy.poll_interval.min(deadline - now);
        tokio::select! {
            _ = tokio::time::sleep(nap) => {}
            _ = &mut shutdown => return Ok(WaitOutcome::Interrupted),
        }
    }
}

/// Resolves on Ctrl-C or SIGTERM; never resolves if handlers can't be installed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => ctrl_c.await,
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}

/// Hook stdout for a permission decision.
pub fn decision_output(response: Response) -> Value {
    let decision = if response.is_allow() {
        json!({ "behavior": "allow" })
    } else {
        json!({ "behavior": "deny", "message": DENY_MESSAGE })
    };
    json!({
        "hookSpecificOutput": {
            "hookEventName": "PermissionRequest",
            "decision": decision,
        }
    })
}

pub fn permission_detail(payload: &Value, now: DateTime<Utc>) -> PaneDetail {
    let tool_name = payload["tool_name"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string();
    let summary = summarize_tool_input(&tool_name, &payload["tool_input"]);
    PaneDetail::Permission {
        tool_name,
        summary,
        since: now,
    }
}

pub fn question_detail(payload: &Value, now: DateTime<Utc>) -> PaneDetail {
    let message = payload["message"]
        .as_str()
        .or_else(|| payload["tool_input"]["questions"][0]["question"].as_str())
        .map(single_line)
        .unwrap_or_default();
    PaneDetail::Question {
        message,
        since: now,
    }
}

/// Short, single-line description of a tool call's arguments.
///
/// Picks the one argument that identifies the call (`command` for Bash, a
/// path, URL or pattern for the rest) and falls back to compact JSON.
pub fn summarize_tool_input(tool_name: &str, input: &Value) -> String {
    const KEYS: &[&str] = &["command", "file_path", "path", "notebook_path", "url", "pattern", "query"];

    let picked = if tool_name == "Bash" {
        input["command"].as_str().map(str::to_string)
    } else {
        KEYS.iter()
            .find_map(|k| input[*k].as_str())
            .map(str::to_string)
    };

    let raw = match picked {
        Some(s) => s,
        None => match input {
            Value::Null => String::new(),
            Value::Object(map) if map.is_empty() => String::new(),
            other => other.to_string(),
        },
    };
    truncate_display(&single_line(&raw), SUMMARY_MAX_CHARS)
}
