//! In-memory PaneStore, same contract as FileStore.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::HookmuxError;
use crate::store::{PaneStore, validate_pane_id};
use crate::types::{PaneDetail, PaneState, Response, pane_sort_key};

#[derive(Debug, Default)]
struct Records {
    states: HashMap<String, PaneState>,
    details: HashMap<String, PaneDetail>,
    responses: HashMap<String, Response>,
}

/// Store that lives for the duration of one process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Total number of stored entries of any kind.
    pub fn len(&self) -> usize {
        let r = self.lock();
        r.states.len() + r.details.len() + r.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PaneStore for MemoryStore {
    fn write_state(&self, pane_id: &str, state: PaneState) -> Result<(), HookmuxError> {
        validate_pane_id(pane_id)?;
        self.lock().states.insert(pane_id.to_string(), state);
        Ok(())
    }

    fn read_state(&self, pane_id: &str) -> Result<Option<PaneState>, HookmuxError> {
        validate_pane_id(pane_id)?;
        Ok(self.lock().states.get(pane_id).copied())
    }

    fn write_detail(&self, pane_id: &str, detail: &PaneDetail) -> Result<(), HookmuxError> {
        validate_pane_id(pane_id)?;
        self.lock()
            .details
            .insert(pane_id.to_string(), detail.clone());
        Ok(())
    }

    fn read_detail(&self, pane_id: &str) -> Result<Option<PaneDetail>, HookmuxError> {
        validate_pane_id(pane_id)?;
        Ok(self.lock().details.get(pane_id).cloned())
    }

    fn clear_detail(&self, pane_id: &str) -> Result<(), HookmuxError> {
        validate_pane_id(pane_id)?;
        self.lock().details.remove(pane_id);
        Ok(())
    }

    fn write_response(&self, pane_id: &str, response: Response) -> Result<(), HookmuxError> {
        validate_pane_id(pane_id)?;
        self.lock().responses.insert(pane_id.to_string(), response);
        Ok(())
    }

    fn try_read_response(&self, pane_id: &str) -> Result<Option<Response>, HookmuxError> {
        validate_pane_id(pane_id)?;
        Ok(self.lock().responses.remove(pane_id))
    }

    fn clear(&self, pane_id: &str) -> Result<(), HookmuxError> {
        validate_pane_id(pane_id)?;
        let mut r = self.lock();
        r.states.remove(pane_id);
        r.details.remove(pane_id);
        r.responses.remove(pane_id);
        Ok(())
    }

    fn scan(&self) -> Result<Vec<(String, PaneState)>, HookmuxError> {
        let mut panes: Vec<(String, PaneState)> = self
            .lock()
            .states
            .iter()
            .map(|(id, state)| (id.clone(), *state))
            .collect();
        panes.sort_by(|a, b| pane_sort_key(&a.0).cmp(&pane_sort_key(&b.0)));
        Ok(panes)
    }
}
