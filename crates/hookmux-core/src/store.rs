//! PaneStore trait and the file-backed implementation.
//!
//! Layout under the store directory, one set per pane:
//!
//! ```text
//! %3            state, plain text ("permission")
//! %3.detail     single-line JSON PaneDetail
//! %3.response   plain text ("allow" | "always" | "deny")
//! ```
//!
//! Every write is a whole-file replace (temp file + rename), so readers see
//! either the previous content or the new one. Missing, empty or unparsable
//! files read as absent.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::HookmuxError;
use crate::types::{PaneDetail, PaneState, Response, pane_sort_key};

const DETAIL_SUFFIX: &str = ".detail";
const RESPONSE_SUFFIX: &str = ".response";

/// Temp and claim files older than this belong to a killed writer.
const LEFTOVER_MAX_AGE: Duration = Duration::from_secs(60);

/// Key-value contract for pane records.
///
/// Assumes a single writer per pane at any time; no locking is provided.
pub trait PaneStore: Send + Sync {
    fn write_state(&self, pane_id: &str, state: PaneState) -> Result<(), HookmuxError>;
    fn read_state(&self, pane_id: &str) -> Result<Option<PaneState>, HookmuxError>;

    fn write_detail(&self, pane_id: &str, detail: &PaneDetail) -> Result<(), HookmuxError>;
    fn read_detail(&self, pane_id: &str) -> Result<Option<PaneDetail>, HookmuxError>;
    fn clear_detail(&self, pane_id: &str) -> Result<(), HookmuxError>;

    fn write_response(&self, pane_id: &str, response: Response) -> Result<(), HookmuxError>;
    /// Read and delete the pending response, if any.
    fn try_read_response(&self, pane_id: &str) -> Result<Option<Response>, HookmuxError>;

    /// Remove every file of a pane. Absent records are not an error.
    fn clear(&self, pane_id: &str) -> Result<(), HookmuxError>;

    /// All panes with a recorded state, ordered by pane id.
    fn scan(&self) -> Result<Vec<(String, PaneState)>, HookmuxError>;
}

impl<T: PaneStore + ?Sized> PaneStore for &T {
    fn write_state(&self, pane_id: &str, state: PaneState) -> Result<(), HookmuxError> {
        (**self).write_state(pane_id, state)
    }
    fn read_state(&self, pane_id: &str) -> Result<Option<PaneState>, HookmuxError> {
        (**self).read_state(pane_id)
    }
    fn write_detail(&self, pane_id: &str, detail: &PaneDetail) -> Result<(), HookmuxError> {
        (**self).write_detail(pane_id, detail)
    }
    fn read_detail(&self, pane_id: &str) -> Result<Option<PaneDetail>, HookmuxError> {
        (**self).read_detail(pane_id)
    }
    fn clear_detail(&self, pane_id: &str) -> Result<(), HookmuxError> {
        (**self).clear_detail(pane_id)
    }
    fn write_response(&self, pane_id: &str, response: Response) -> Result<(), HookmuxError> {
        (**self).write_response(pane_id, response)
    }
    fn try_read_response(&self, pane_id: &str) -> Result<Option<Response>, HookmuxError> {
        (**self).try_read_response(pane_id)
    }
    fn clear(&self, pane_id: &str) -> Result<(), HookmuxError> {
        (**self).clear(pane_id)
    }
    fn scan(&self) -> Result<Vec<(String, PaneState)>, HookmuxError> {
        (**self).scan()
    }
}

/// Reject ids that cannot be used as a plain file name in the store
/// directory. tmux pane ids (`%12`) always pass.
pub fn validate_pane_id(pane_id: &str) -> Result<(), HookmuxError> {
    let bad = pane_id.is_empty()
        || pane_id.contains(['/', '\\', '.', '\0'])
        || pane_id.chars().any(char::is_whitespace);
    if bad {
        return Err(HookmuxError::InvalidPaneId(pane_id.to_string()));
    }
    Ok(())
}

// ─── FileStore ────────────────────────────────────────────────────

/// Store backed by a directory of small files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, pane_id: &str, suffix: &str) -> Result<PathBuf, HookmuxError> {
        validate_pane_id(pane_id)?;
        Ok(self.dir.join(format!("{pane_id}{suffix}")))
    }

    fn ensure_dir(&self) -> Result<(), HookmuxError> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(&self.dir)?;
        Ok(())
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), HookmuxError> {
        self.ensure_dir()?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = self
            .dir
            .join(format!(".{name}.{}.tmp", std::process::id()));
        fs::write(&tmp, contents)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

fn read_trimmed(path: &Path) -> Result<Option<String>, HookmuxError> {
    match fs::read_to_string(path) {
        Ok(s) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                Ok(Some(s.to_string()))
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn is_leftover(name: &str) -> bool {
    name.starts_with('.') && (name.ends_with(".tmp") || name.ends_with(".claim"))
}

/// Best effort: a young file may still be in use by a live writer.
fn remove_if_stale(path: &Path) {
    let age = fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| SystemTime::now().duration_since(t).ok());
    if age.is_some_and(|age| age > LEFTOVER_MAX_AGE) {
        tracing::debug!("removing leftover {}", path.display());
        if let Err(e) = fs::remove_file(path) {
            tracing::debug!("failed to remove {}: {e}", path.display());
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<(), HookmuxError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl PaneStore for FileStore {
    fn write_state(&self, pane_id: &str, state: PaneState) -> Result<(), HookmuxError> {
        let path = self.path(pane_id, "")?;
        self.write_atomic(&path, state.as_str())
    }

    fn read_state(&self, pane_id: &str) -> Result<Option<PaneState>, HookmuxError> {
        let path = self.path(pane_id, "")?;
        let Some(raw) = read_trimmed(&path)? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                tracing::debug!("ignoring state file for {pane_id}: {e}");
                Ok(None)
            }
        }
    }

    fn write_detail(&self, pane_id: &str, detail: &PaneDetail) -> Result<(), HookmuxError> {
        let path = self.path(pane_id, DETAIL_SUFFIX)?;
        let json = serde_json::to_string(detail)?;
        self.write_atomic(&path, &json)
    }

    fn read_detail(&self, pane_id: &str) -> Result<Option<PaneDetail>, HookmuxError> {
        let path = self.path(pane_id, DETAIL_SUFFIX)?;
        let Some(raw) = read_trimmed(&path)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(detail) => Ok(Some(detail)),
            Err(e) => {
                tracing::debug!("ignoring detail file for {pane_id}: {e}");
                Ok(None)
            }
        }
    }

    fn clear_detail(&self, pane_id: &str) -> Result<(), HookmuxError> {
        remove_if_exists(&self.path(pane_id, DETAIL_SUFFIX)?)
    }

    fn write_response(&self, pane_id: &str, response: Response) -> Result<(), HookmuxError> {
        let path = self.path(pane_id, RESPONSE_SUFFIX)?;
        self.write_atomic(&path, response.as_str())
    }

    fn try_read_response(&self, pane_id: &str) -> Result<Option<Response>, HookmuxError> {
        let path = self.path(pane_id, RESPONSE_SUFFIX)?;
        // Claim the file by renaming it away first so a response is consumed once.
        let claim = self.dir.join(format!(
            ".{pane_id}{RESPONSE_SUFFIX}.{}.claim",
            std::process::id()
        ));
        match fs::rename(&path, &claim) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let raw = read_trimmed(&claim);
        remove_if_exists(&claim)?;
        let Some(raw) = raw? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(response) => Ok(Some(response)),
            Err(e) => {
                tracing::warn!("discarding response for {pane_id}: {e}");
                Ok(None)
            }
        }
    }

    fn clear(&self, pane_id: &str) -> Result<(), HookmuxError> {
        remove_if_exists(&self.path(pane_id, RESPONSE_SUFFIX)?)?;
        remove_if_exists(&self.path(pane_id, DETAIL_SUFFIX)?)?;
        remove_if_exists(&self.path(pane_id, "")?)
    }

    fn scan(&self) -> Result<Vec<(String, PaneState)>, HookmuxError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut panes = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if is_leftover(name) {
                remove_if_stale(&entry.path());
                continue;
            }
            // Suffix files carry a '.'
            if validate_pane_id(name).is_err() {
                continue;
            }
            if let Some(state) = self.read_state(name)? {
                panes.push((name.to_string(), state));
            }
        }
        panes.sort_by(|a, b| pane_sort_key(&a.0).cmp(&pane_sort_key(&b.0)));
        Ok(panes)
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use crate::memory::MemoryStore;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        State(u8, PaneState),
        Respond(u8, Response),
        Take(u8),
        Clear(u8),
    }

    fn arb_state() -> impl Strategy<Value = PaneState> {
        prop::sample::select(PaneState::ALL.to_vec())
    }

    fn arb_response() -> impl Strategy<Value = Response> {
        prop_oneof![
            Just(Response::Allow),
            Just(Response::Always),
            Just(Response::Deny)
        ]
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..4, arb_state()).prop_map(|(p, s)| Op::State(p, s)),
            (0u8..4, arb_response()).prop_map(|(p, r)| Op::Respond(p, r)),
            (0u8..4).prop_map(Op::Take),
            (0u8..4).prop_map(Op::Clear),
        ]
    }

    proptest! {
        /// The file store behaves exactly like the in-memory one.
        #[test]
        fn file_store_matches_memory_store(ops in prop::collection::vec(arb_op(), 1..40)) {
            let tmp = tempfile::tempdir().expect("tempdir");
            let files = FileStore::new(tmp.path().join("state"));
            let memory = MemoryStore::new();

            for op in ops {
                match op {
                    Op::State(p, s) => {
                        let id = format!("%{p}");
                        files.write_state(&id, s).expect("write");
                        memory.write_state(&id, s).expect("write");
                    }
                    Op::Respond(p, r) => {
                        let id = format!("%{p}");
                        files.write_response(&id, r).expect("write");
                        memory.write_response(&id, r).expect("write");
                    }
                    Op::Take(p) => {
                        let id = format!("%{p}");
                        prop_assert_eq!(
                            files.try_read_response(&id).expect("take"),
                            memory.try_read_response(&id).expect("take")
                        );
                        // Consumed exactly once.
                        prop_assert_eq!(files.try_read_response(&id).expect("take"), None);
                        prop_assert_eq!(memory.try_read_response(&id).expect("take"), None);
                    }
                    Op::Clear(p) => {
                        let id = format!("%{p}");
                        files.clear(&id).expect("clear");
                        memory.clear(&id).expect("clear");
                    }
                }
                prop_assert_eq!(files.scan().expect("scan"), memory.scan().expect("scan"));
            }
        }

        #[test]
        fn tmux_pane_ids_are_valid(n in any::<u32>()) {
            let id = format!("%{n}");
            prop_assert!(validate_pane_id(&id).is_ok());
        }
    }
}
