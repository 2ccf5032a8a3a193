//! hookmux-core: pane record types and the key-value store that every
//! short-lived `hookmux` invocation shares.
//!
//! No tmux or process IO lives here; see `hookmux-tmux` for that boundary.

pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use error::HookmuxError;
pub use memory::MemoryStore;
pub use store::{FileStore, PaneStore, validate_pane_id};
pub use types::{HookEvent, PaneDetail, PaneState, Response, pane_sort_key};
