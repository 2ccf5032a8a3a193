//! Generate and merge Claude Code hook configuration for hookmux.

use std::path::PathBuf;

use serde_json::{Value, json};

use crate::cli::SetupHooksOpts;

/// Claude Code hook type, optional matcher, and the hookmux event it feeds.
const HOOK_BINDINGS: &[(&str, Option<&str>, &str)] = &[
    ("SessionStart", None, "start"),
    ("UserPromptSubmit", None, "submit"),
    ("PermissionRequest", Some("*"), "permission"),
    ("PreToolUse", Some("AskUserQuestion"), "question"),
    ("PostToolUse", Some("*"), "tool-done"),
    ("Notification", Some("idle_prompt"), "idle"),
    ("Stop", None, "stop"),
    ("SessionEnd", None, "end"),
];

/// Extra seconds granted to the permission hook beyond our own wait, so the
/// agent never kills a hook that is about to answer.
const PERMISSION_TIMEOUT_SLACK: u64 = 30;

/// Resolve the settings.json path based on scope.
pub fn settings_path(scope: &str) -> anyhow::Result<PathBuf> {
    match scope {
        "project" => Ok(PathBuf::from(".claude/settings.json")),
        "user" => {
            let home = std::env::var("HOME")
                .map_err(|_| anyhow::anyhow!("HOME not set; cannot resolve user scope"))?;
            Ok(PathBuf::from(home).join(".claude/settings.json"))
        }
        _ => anyhow::bail!("invalid scope: {scope:?} (expected \"project\" or \"user\")"),
    }
}

/// Binary the hooks call: `--bin`, else this executable, else `hookmux` on PATH.
pub fn resolve_bin(explicit: Option<&str>) -> String {
    if let Some(bin) = explicit {
        return bin.to_string();
    }
    std::env::current_exe()
        .ok()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "hookmux".to_string())
}

/// Single-quote a path for a shell command string when it needs it.
fn shell_quote(path: &str) -> String {
    if path.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"' || c == '\\') {
        format!("'{}'", path.replace('\'', "'\\''"))
    } else {
        path.to_string()
    }
}

/// Hook groups keyed by Claude Code hook type.
pub fn generate_hooks_config(bin: &str, permission_wait_secs: u64) -> serde_json::Map<String, Value> {
    let quoted = shell_quote(bin);
    let mut hooks = serde_json::Map::new();

    for (hook_type, matcher, event) in HOOK_BINDINGS {
        let mut command = json!({
            "type": "command",
            "command": format!("{quoted} hook {event}"),
        });
        if *event == "permission" {
            command["timeout"] = json!(permission_wait_secs + PERMISSION_TIMEOUT_SLACK);
        }
        let mut group = json!({ "hooks": [command] });
        if let Some(m) = matcher {
            group["matcher"] = json!(m);
        }
        hooks.insert((*hook_type).to_string(), json!([group]));
    }
    hooks
}

/// Whether a hook group was written by a previous `setup-hooks`.
fn is_ours(group: &Value) -> bool {
    group["hooks"].as_array().is_some_and(|cmds| {
        cmds.iter().any(|c| {
            c["command"]
                .as_str()
                .is_some_and(|s| s.contains("hookmux") && s.contains(" hook "))
        })
    })
}

/// Merge generated groups into `settings`, replacing earlier hookmux groups
/// and keeping everything else.
pub fn merge_hooks(settings: &mut Value, generated: serde_json::Map<String, Value>) -> anyhow::Result<()> {
    let obj = settings
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("settings.json is not a JSON object"))?;
    let hooks = obj
        .entry("hooks")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("settings.json \"hooks\" is not an object"))?;

    for (hook_type, groups) in generated {
        let slot = hooks.entry(hook_type).or_insert_with(|| json!([]));
        let existing = slot
            .as_array_mut()
            .ok_or_else(|| anyhow::anyhow!("hook list is not an array"))?;
        existing.retain(|g| !is_ours(g));
        if let Value::Array(new) = groups {
            existing.extend(new);
        }
    }
    Ok(())
}

/// Apply hook configuration to the settings file (merge, not overwrite).
pub fn apply_hooks(opts: &SetupHooksOpts) -> anyhow::Result<PathBuf> {
    let path = settings_path(&opts.scope)?;
    let bin = resolve_bin(opts.bin.as_deref());

    let mut settings: Value = if path.exists() {
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)?
    } else {
        json!({})
    };
    merge_hooks(&mut settings, generate_hooks_config(&bin, opts.timeout_secs))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let output = serde_json::to_string_pretty(&settings)?;
    std::fs::write(&path, format!("{output}\n"))?;
    tracing::info!("hooks written to {}", path.display());

    Ok(path)
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_binding_is_generated() {
        let config = generate_hooks_config("/usr/local/bin/hookmux", 300);
        for (hook_type, matcher, event) in HOOK_BINDINGS {
            let groups = config[*hook_type].as_array().expect("array");
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0]["matcher"].as_str(), *matcher);
            let cmd = groups[0]["hooks"][0]["command"].as_str().expect("cmd");
            assert_eq!(cmd, format!("/usr/local/bin/hookmux hook {event}"));
        }
    }

    #[test]
    fn permission_timeout_exceeds_wait() {
        let config = generate_hooks_config("hookmux", 120);
        assert_eq!(config["PermissionRequest"][0]["hooks"][0]["timeout"], 150);
        assert!(config["Stop"][0]["hooks"][0].get("timeout").is_none());
    }

    #[test]
    fn path_with_spaces_is_quoted() {
        let config = generate_hooks_config("/opt/my tools/hookmux", 300);
        let cmd = config["Stop"][0]["hooks"][0]["command"].as_str().expect("cmd");
        assert_eq!(cmd, "'/opt/my tools/hookmux' hook stop");
    }

    #[test]
    fn path_with_quote_is_escaped() {
        let config = generate_hooks_config("/it's/hookmux", 300);
        let cmd = config["Stop"][0]["hooks"][0]["command"].as_str().expect("cmd");
        assert!(cmd.contains("'\\''"), "got: {cmd}");
    }

    #[test]
    fn merge_keeps_foreign_hooks_and_replaces_ours() {
        let mut settings = json!({
            "model": "opus",
            "hooks": {
                "Stop": [
                    { "hooks": [ { "type": "command", "command": "say done" } ] },
                    { "hooks": [ { "type": "command", "command": "/old/hookmux hook stop" } ] }
                ]
            }
        });
        merge_hooks(&mut settings, generate_hooks_config("/new/hookmux", 300)).expect("merge");
        merge_hooks(&mut settings, generate_hooks_config("/new/hookmux", 300)).expect("idempotent");

        assert_eq!(settings["model"], "opus");
        let stop = settings["hooks"]["Stop"].as_array().expect("array");
        assert_eq!(stop.len(), 2);
        assert_eq!(stop[0]["hooks"][0]["command"], "say done");
        assert_eq!(stop[1]["hooks"][0]["command"], "/new/hookmux hook stop");
        assert_eq!(settings["hooks"]["SessionEnd"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn merge_rejects_non_object() {
        let mut settings = json!([1, 2]);
        assert!(merge_hooks(&mut settings, generate_hooks_config("hookmux", 300)).is_err());
    }

    #[test]
    fn settings_path_scopes() {
        assert_eq!(
            settings_path("project").expect("ok"),
            PathBuf::from(".claude/settings.json")
        );
        assert!(settings_path("invalid").is_err());
    }

    #[test]
    fn resolve_bin_explicit() {
        assert_eq!(resolve_bin(Some("/custom/hookmux")), "/custom/hookmux");
    }
}
