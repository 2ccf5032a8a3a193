//! In-process tmux and store stand-ins for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use hookmux_core::{HookmuxError, MemoryStore, PaneDetail, PaneState, PaneStore, Response};
use hookmux_tmux::{LIST_PANES_FORMAT, TmuxCommandRunner, TmuxError};

/// Simulated server: an ordered list of `(pane_id, window_id)`. The first
/// pane's window is the "current" window. Every command is recorded.
pub struct MockTmux {
    panes: Mutex<Vec<(String, String)>>,
    calls: Mutex<Vec<String>>,
    server_down: AtomicBool,
    fail_control: AtomicBool,
}

impl MockTmux {
    pub fn with_panes(panes: &[(&str, &str)]) -> Self {
        Self {
            panes: Mutex::new(
                panes
                    .iter()
                    .map(|(p, w)| (p.to_string(), w.to_string()))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
            server_down: AtomicBool::new(false),
            fail_control: AtomicBool::new(false),
        }
    }

    pub fn kill(&self, pane_id: &str) {
        self.panes.lock().expect("lock").retain(|(p, _)| p != pane_id);
    }

    pub fn server_down(&self, down: bool) {
        self.server_down.store(down, Ordering::SeqCst);
    }

    /// Make every non-query command fail.
    pub fn fail_control(&self, fail: bool) {
        self.fail_control.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    /// Recorded commands starting with `prefix`.
    pub fn calls_starting(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn rows(&self, window: Option<&str>) -> String {
        let panes = self.panes.lock().expect("lock");
        let current = panes.first().map(|(_, w)| w.clone()).unwrap_or_default();
        let window = window.unwrap_or(&current);
        let mut out = String::new();
        let mut index = 0;
        for (pane, win) in panes.iter() {
            if win == window {
                out.push_str(&format!("{pane}\t{index}\t{win}\n"));
                index += 1;
            }
        }
        out
    }
}

fn flag_value<'a>(args: &[&'a str], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| *a == flag)
        .and_then(|i| args.get(i + 1).copied())
}

impl TmuxCommandRunner for MockTmux {
    fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
        self.calls.lock().expect("lock").push(args.join(" "));
        if self.server_down.load(Ordering::SeqCst) {
            return Err(TmuxError::NoServer);
        }

        match args.first().copied() {
            Some("list-panes") if args.contains(&"-a") => {
                let panes = self.panes.lock().expect("lock");
                Ok(panes.iter().map(|(p, _)| format!("{p}\n")).collect())
            }
            Some("list-panes") => {
                assert_eq!(args.last().copied(), Some(LIST_PANES_FORMAT));
                Ok(self.rows(flag_value(args, "-t")))
            }
            Some("display-message") if args.contains(&"-p") => {
                let target = flag_value(args, "-t").unwrap_or_default();
                let live = self
                    .panes
                    .lock()
                    .expect("lock")
                    .iter()
                    .any(|(p, _)| p == target);
                if live {
                    Ok(format!("{target}\n"))
                } else {
                    Err(TmuxError::CommandFailed(format!("can't find pane: {target}")))
                }
            }
            _ if self.fail_control.load(Ordering::SeqCst) => {
                Err(TmuxError::CommandFailed("no current client".into()))
            }
            _ => Ok(String::new()),
        }
    }
}

/// MemoryStore with injectable IO failures.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    response_reads: AtomicUsize,
    /// `try_read_response` calls from this one on (1-based) fail.
    fail_response_read_from: Option<usize>,
    /// Once a response has been claimed, every write fails.
    fail_writes_after_claim: bool,
    claimed: AtomicBool,
}

impl FlakyStore {
    pub fn failing_response_read(from_call: usize) -> Self {
        Self {
            fail_response_read_from: Some(from_call),
            ..Self::default()
        }
    }

    pub fn failing_writes_after_claim() -> Self {
        Self {
            fail_writes_after_claim: true,
            ..Self::default()
        }
    }

    fn check_write(&self) -> Result<(), HookmuxError> {
        if self.fail_writes_after_claim && self.claimed.load(Ordering::SeqCst) {
            return Err(eio());
        }
        Ok(())
    }
}

fn eio() -> HookmuxError {
    HookmuxError::Io(std::io::Error::other("injected EIO"))
}

impl PaneStore for FlakyStore {
    fn write_state(&self, pane_id: &str, state: PaneState) -> Result<(), HookmuxError> {
        self.check_write()?;
        self.inner.write_state(pane_id, state)
    }
    fn read_state(&self, pane_id: &str) -> Result<Option<PaneState>, HookmuxError> {
        self.inner.read_state(pane_id)
    }
    fn write_detail(&self, pane_id: &str, detail: &PaneDetail) -> Result<(), HookmuxError> {
        self.check_write()?;
        self.inner.write_detail(pane_id, detail)
    }
    fn read_detail(&self, pane_id: &str) -> Result<Option<PaneDetail>, HookmuxError> {
        self.inner.read_detail(pane_id)
    }
    fn clear_detail(&self, pane_id: &str) -> Result<(), HookmuxError> {
        self.check_write()?;
        self.inner.clear_detail(pane_id)
    }
    fn write_response(&self, pane_id: &str, response: Response) -> Result<(), HookmuxError> {
        self.inner.write_response(pane_id, response)
    }
    fn try_read_response(&self, pane_id: &str) -> Result<Option<Response>, HookmuxError> {
        let call = self.response_reads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_response_read_from.is_some_and(|from| call >= from) {
            return Err(eio());
        }
        let response = self.inner.try_read_response(pane_id)?;
        if response.is_some() {
            self.claimed.store(true, Ordering::SeqCst);
        }
        Ok(response)
    }
    fn clear(&self, pane_id: &str) -> Result<(), HookmuxError> {
        self.check_write()?;
        self.inner.clear(pane_id)
    }
    fn scan(&self) -> Result<Vec<(String, PaneState)>, HookmuxError> {
        self.inner.scan()
    }
}
