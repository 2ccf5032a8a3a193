//! `hookmux list`: print tracked panes.

use chrono::{DateTime, Utc};
use hookmux_core::{PaneDetail, PaneState, PaneStore};
use serde::Serialize;

use crate::context::relative_age;

#[derive(Debug, Serialize)]
pub struct ListedPane {
    pub pane_id: String,
    pub state: PaneState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<PaneDetail>,
}

pub fn collect(store: &impl PaneStore) -> anyhow::Result<Vec<ListedPane>> {
    store
        .scan()?
        .into_iter()
        .map(|(pane_id, state)| -> anyhow::Result<ListedPane> {
            let detail = if state.needs_attention() {
                store.read_detail(&pane_id)?
            } else {
                None
            };
            Ok(ListedPane {
                pane_id,
                state,
                detail,
            })
        })
        .collect()
}

/// One aligned line per pane: `%3  permission  Bash: git push  2m`.
pub fn format_table(panes: &[ListedPane], now: DateTime<Utc>) -> Vec<String> {
    let id_width = panes.iter().map(|p| p.pane_id.len()).max().unwrap_or(0);
    panes
        .iter()
        .map(|p| {
            let mut line = format!("{:<id_width$}  {:<10}", p.pane_id, p.state.as_str());
            if let Some(detail) = &p.detail {
                line.push_str(&format!(
                    "  {}  {}",
                    detail.headline(),
                    relative_age(detail.since(), now)
                ));
            }
            line.trim_end().to_string()
        })
        .collect()
}

/// Entry point for `hookmux list`.
pub fn cmd_list(store: impl PaneStore, json: bool) -> anyhow::Result<()> {
    let panes = collect(&store)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&panes)?);
    } else if panes.is_empty() {
        println!("no tracked panes");
    } else {
        for line in format_table(&panes, Utc::now()) {
            println!("{line}");
        }
    }
    Ok(())
}
