//! TmuxPaneInfo, list-panes format string, parser, and liveness queries.

use std::collections::HashSet;

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

/// Tab-delimited format string for `tmux list-panes -F`.
pub const LIST_PANES_FORMAT: &str = "#{pane_id}\t#{pane_index}\t#{window_id}";

/// The pane fields the tracker needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TmuxPaneInfo {
    pub pane_id: String,
    pub pane_index: u32,
    pub window_id: String,
}

/// Panes of one window, in pane-index order.
///
/// `target` is any tmux window target (`@3`, `work:1`, a pane id). With
/// `None`, tmux resolves the current window of the invoking client, which is
/// what a `run-shell` from a key binding sees.
pub fn list_window_panes(
    runner: &impl TmuxCommandRunner,
    target: Option<&str>,
) -> Result<Vec<TmuxPaneInfo>, TmuxError> {
    let mut args = vec!["list-panes"];
    if let Some(t) = target {
        args.extend(["-t", t]);
    }
    args.extend(["-F", LIST_PANES_FORMAT]);
    let output = runner.run(&args)?;
    let mut panes = parse_list_panes_output(&output)?;
    panes.sort_by_key(|p| p.pane_index);
    Ok(panes)
}

/// Ids of all live panes.
pub fn live_pane_ids(runner: &impl TmuxCommandRunner) -> Result<HashSet<String>, TmuxError> {
    let output = runner.run(&["list-panes", "-a", "-F", "#{pane_id}"])?;
    Ok(output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Whether `pane_id` still exists. Any failure to ask counts as gone.
pub fn pane_exists(runner: &impl TmuxCommandRunner, pane_id: &str) -> bool {
    match runner.run(&["display-message", "-p", "-t", pane_id, "#{pane_id}"]) {
        Ok(out) => out.trim() == pane_id,
        Err(e) => {
            tracing::debug!("pane {pane_id} not reachable: {e}");
            false
        }
    }
}

/// Parse the raw output of `tmux list-panes -F <FORMAT>`.
pub fn parse_list_panes_output(output: &str) -> Result<Vec<TmuxPaneInfo>, TmuxError> {
    let mut panes = Vec::new();
    for (idx, line) in output.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        panes.push(parse_line(line, idx + 1)?);
    }
    Ok(panes)
}

fn parse_line(line: &str, line_num: usize) -> Result<TmuxPaneInfo, TmuxError> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 3 {
        return Err(TmuxError::ParseError {
            line_num,
            detail: format!(
                "expected at least 3 tab-separated fields, got {}",
                parts.len()
            ),
        });
    }

    let pane_id = parts[0].trim();
    if !pane_id.starts_with('%') {
        return Err(TmuxError::ParseError {
            line_num,
            detail: format!("not a pane id: {pane_id:?}"),
        });
    }

    Ok(TmuxPaneInfo {
        pane_id: pane_id.to_string(),
        pane_index: parts[1].trim().parse().unwrap_or(u32::MAX),
        window_id: parts[2].trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockRunner {
        output: Result<String, ()>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl MockRunner {
        fn ok(output: &str) -> Self {
            Self {
                output: Ok(output.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                output: Err(()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl TmuxCommandRunner for MockRunner {
        fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
            self.calls
                .lock()
                .expect("lock")
                .push(args.iter().map(|s| s.to_string()).collect());
            match &self.output {
                Ok(s) => Ok(s.clone()),
                Err(()) => Err(TmuxError::CommandFailed("can't find pane".into())),
            }
        }
    }

    #[test]
    fn parse_single_line() {
        let pane = parse_line("%3\t1\t@2", 1).expect("should parse");
        assert_eq!(pane.pane_id, "%3");
        assert_eq!(pane.pane_index, 1);
        assert_eq!(pane.window_id, "@2");
    }

    #[test]
    fn parse_ignores_extra_fields_and_bad_index() {
        let pane = parse_line("%0\tx\t@0\textra", 1).expect("should parse");
        assert_eq!(pane.window_id, "@0");
        assert_eq!(pane.pane_index, u32::MAX);
    }

    #[test]
    fn parse_too_few_fields_error() {
        assert!(parse_line("%0\t0", 1).is_err());
    }

    #[test]
    fn parse_rejects_non_pane_id() {
        let err = parse_line("@0\t0\t@0", 4).expect_err("not a pane");
        assert!(matches!(err, TmuxError::ParseError { line_num: 4, .. }));
    }

    #[test]
    fn parse_empty_output() {
        assert!(parse_list_panes_output("\n\n").expect("parse").is_empty());
    }

    #[test]
    fn window_panes_sorted_by_index_and_targeted() {
        let runner = MockRunner::ok("%7\t2\t@1\n%4\t0\t@1\n%5\t1\t@1\n");
        let panes = list_window_panes(&runner, Some("@1")).expect("list");
        let ids: Vec<_> = panes.iter().map(|p| p.pane_id.as_str()).collect();
        assert_eq!(ids, vec!["%4", "%5", "%7"]);

        let calls = runner.calls.lock().expect("lock");
        assert_eq!(calls[0][..3], ["list-panes", "-t", "@1"]);
    }

    #[test]
    fn window_panes_without_target_uses_current_window() {
        let runner = MockRunner::ok("");
        list_window_panes(&runner, None).expect("list");
        let calls = runner.calls.lock().expect("lock");
        assert!(!calls[0].contains(&"-t".to_string()));
    }

    #[test]
    fn live_ids_collects_set() {
        let runner = MockRunner::ok("%1\n%2\n\n%10\n");
        let ids = live_pane_ids(&runner).expect("ids");
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("%10"));
    }

    #[test]
    fn pane_exists_checks_echoed_id() {
        assert!(pane_exists(&MockRunner::ok("%3\n"), "%3"));
        assert!(!pane_exists(&MockRunner::ok("%4\n"), "%3"));
        assert!(!pane_exists(&MockRunner::failing(), "%3"));
    }
}
