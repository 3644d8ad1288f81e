//! Workspace explorer: find structure documents below a directory and
//! summarise them.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::structure::doc::BINARY_EXTENSION;
use crate::structure::{StructureDoc, StructureSummary};

/// One document found by [`scan_workspace`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorerEntry {
    pub path: Utf8PathBuf,
    /// Summary of the document, or why it could not be loaded.
    pub summary: Result<StructureSummary, String>,
}

impl ExplorerEntry {
    pub fn is_ok(&self) -> bool {
        self.summary.is_ok()
    }
}

fn is_document(path: &Utf8Path) -> bool {
    if path.file_name() == Some(DEFAULT_CONFIG_FILE) {
        return false;
    }
    matches!(path.extension(), Some("json") | Some(BINARY_EXTENSION))
}

/// Walk `root` for `*.json` / `*.nhdl` documents and summarise each one.
///
/// Documents are loaded in parallel; entries come back sorted by path.
/// Documents that fail to load are reported, not skipped.
pub fn scan_workspace(root: &Utf8Path) -> Result<Vec<ExplorerEntry>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.with_context(|| format!("Walk {}", root))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
            continue;
        };
        if is_document(&path) {
            paths.push(path);
        }
    }
    debug!(count = paths.len(), %root, "scanning documents");

    let mut entries: Vec<ExplorerEntry> = paths
        .into_par_iter()
        .map(|path| {
            let summary = StructureDoc::load(&path)
                .map(|doc| doc.structure.summary())
                .map_err(|e| format!("{:#}", e));
            ExplorerEntry { path, summary }
        })
        .collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}
