//! One editor instance: a structure, the canvas it is projected onto and the
//! bookkeeping that spans frames.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use crate::canvas::Canvas;
use crate::projection::{FrameReport, NodeOwner, ProjectionPass};
use crate::structure::{Structure, StructureDoc};

static NEXT_EDITOR: AtomicU64 = AtomicU64::new(1);

/// First of `<stem>.json`, `<stem>_2.json`, `<stem>_3.json`, ... in `dir`
/// that does not exist yet.
pub fn free_document_path(dir: &Utf8Path, stem: &str) -> Utf8PathBuf {
    let first = dir.join(format!("{}.json", stem));
    if !first.exists() {
        return first;
    }
    (2u32..)
        .map(|n| dir.join(format!("{}_{}.json", stem, n)))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

#[derive(Debug)]
pub struct StructureEditor {
    label: String,
    structure: Option<Structure>,
    path: Option<Utf8PathBuf>,
    pass: ProjectionPass,
    first_frame: bool,
    dirty: bool,
    selection: Vec<NodeOwner>,
    last_report: FrameReport,
}

impl StructureEditor {
    /// Create an editor for `structure`. Every editor gets a process-unique
    /// label, which also scopes its canvas state.
    pub fn new(structure: Option<Structure>) -> Self {
        let n = NEXT_EDITOR.fetch_add(1, Ordering::Relaxed);
        Self {
            label: format!("Editor_{}", n),
            structure,
            path: None,
            pass: ProjectionPass::new(),
            first_frame: true,
            dirty: false,
            selection: Vec::new(),
            last_report: FrameReport::default(),
        }
    }

    /// Open a structure document.
    pub fn open(path: &Utf8Path) -> Result<Self> {
        let doc = StructureDoc::load(path)?;
        info!(%path, "opened structure");
        let mut editor = Self::new(Some(doc.structure));
        editor.path = Some(path.to_path_buf());
        Ok(editor)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Tab title: structure name, marked when modified.
    pub fn title(&self) -> String {
        let name = self
            .structure
            .as_ref()
            .map(|s| s.type_name().to_string())
            .unwrap_or_else(|| "(empty)".to_string());
        if self.dirty {
            format!("{}*", name)
        } else {
            name
        }
    }

    pub fn structure(&self) -> Option<&Structure> {
        self.structure.as_ref()
    }

    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_report(&self) -> &FrameReport {
        &self.last_report
    }

    pub fn pass(&self) -> &ProjectionPass {
        &self.pass
    }

    /// Graph objects behind the canvas nodes selected during the last frame.
    pub fn selection(&self) -> &[NodeOwner] {
        &self.selection
    }

    /// Draw one frame onto `canvas`.
    ///
    /// The view is fitted to the content on the first frame only.
    pub fn gui<C: Canvas>(&mut self, canvas: &mut C) -> &FrameReport {
        canvas.begin(&self.label);
        let report = self.pass.draw(self.structure.as_mut(), canvas);
        if self.first_frame {
            canvas.navigate_to_content();
            self.first_frame = false;
        }
        self.selection = canvas
            .selected_nodes()
            .into_iter()
            .filter_map(|n| self.pass.id_map().owner_of(n).cloned())
            .collect();
        canvas.end();

        if !report.connected.is_empty() {
            self.dirty = true;
        }
        self.last_report = report;
        &self.last_report
    }

    /// Save to the path the structure was opened from.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .context("Structure has no file path yet; use save as")?;
        self.save_as(&path)
    }

    /// Save to the editor's own path, or into `dir` under a file name no
    /// other document uses yet. Returns where the structure went.
    pub fn save_in(&mut self, dir: &Utf8Path) -> Result<Utf8PathBuf> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => {
                let stem = self
                    .structure
                    .as_ref()
                    .map(|s| s.type_name())
                    .unwrap_or("structure");
                free_document_path(dir, stem)
            }
        };
        self.save_as(&path)?;
        Ok(path)
    }

    pub fn save_as(&mut self, path: &Utf8Path) -> Result<()> {
        let structure = self.structure.as_ref().context("Editor has no structure")?;
        StructureDoc::new(structure.clone()).save(path)?;
        info!(%path, "saved structure");
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }
}
