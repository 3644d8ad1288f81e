#![cfg(feature = "egui")]

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use crate::canvas::CanvasState;
use crate::config::{EditorConfig, Theme};
use crate::editor::StructureEditor;
use crate::explorer::{ExplorerEntry, scan_workspace};
use crate::logging::LogBuffer;
use crate::samples;
use crate::structure::{collect_instance_paths, resolve_instance_path};

/// One open editor with the canvas state that belongs to it.
#[derive(Debug)]
pub struct EditorTab {
    pub editor: StructureEditor,
    pub canvas: CanvasState,
}

impl EditorTab {
    pub fn new(editor: StructureEditor) -> Self {
        Self {
            editor,
            canvas: CanvasState::default(),
        }
    }
}

/// Which side windows are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panels {
    pub explorer: bool,
    pub inspector: bool,
    pub logs: bool,
}

impl Default for Panels {
    fn default() -> Self {
        Self {
            explorer: true,
            inspector: true,
            logs: true,
        }
    }
}

/// Interactive editor application: explorer, inspector, logs and one tab per
/// open structure.
pub struct EditorApp {
    pub config: EditorConfig,
    pub config_path: Utf8PathBuf,
    pub logs: LogBuffer,
    pub tabs: Vec<EditorTab>,
    pub active: usize,
    pub explorer: Vec<ExplorerEntry>,
    pub panels: Panels,
    /// Last user-facing error, shown in the status line until dismissed.
    pub status: Option<String>,
    pub(super) theme_applied: Option<Theme>,
}

impl EditorApp {
    pub fn new(config: EditorConfig, config_path: Utf8PathBuf, logs: LogBuffer) -> Self {
        let mut app = Self {
            config,
            config_path,
            logs,
            tabs: Vec::new(),
            active: 0,
            explorer: Vec::new(),
            panels: Panels::default(),
            status: None,
            theme_applied: None,
        };
        app.rescan();
        app
    }

    pub fn active_tab(&self) -> Option<&EditorTab> {
        self.tabs.get(self.active)
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut EditorTab> {
        self.tabs.get_mut(self.active)
    }

    fn push_tab(&mut self, editor: StructureEditor) {
        self.tabs.push(EditorTab::new(editor));
        self.active = self.tabs.len() - 1;
    }

    pub fn close_tab(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.tabs.remove(index);
        }
        if self.active >= self.tabs.len() {
            self.active = self.tabs.len().saturating_sub(1);
        }
    }

    pub fn rescan(&mut self) {
        match scan_workspace(&self.config.workspace) {
            Ok(entries) => self.explorer = entries,
            Err(e) => self.report_error(e.context("Workspace scan failed")),
        }
    }

    pub fn open_sample(&mut self, name: &str) {
        let built = samples::sample(name)
            .with_context(|| format!("Unknown sample '{}'", name))
            .and_then(|r| r.with_context(|| format!("Failed to build sample '{}'", name)));
        match built {
            Ok(structure) => {
                info!(sample = name, "new structure from sample");
                self.push_tab(StructureEditor::new(Some(structure)));
            }
            Err(e) => self.report_error(e),
        }
    }

    pub fn open_path(&mut self, path: &Utf8Path) {
        if let Some(i) = self.tabs.iter().position(|t| t.editor.path() == Some(path)) {
            self.active = i;
            return;
        }
        match StructureEditor::open(path) {
            Ok(editor) => self.push_tab(editor),
            Err(e) => self.report_error(e),
        }
    }

    /// Open a nested instance of the active structure in its own tab.
    pub fn open_instance(&mut self, path: &[String]) {
        let nested = self
            .active_tab()
            .and_then(|t| t.editor.structure())
            .and_then(|root| resolve_instance_path(root, path))
            .cloned();
        match nested {
            Some(structure) => self.push_tab(StructureEditor::new(Some(structure))),
            None => warn!(path = %path.join("/"), "instance not found"),
        }
    }

    /// Instance paths below the active structure, for the hierarchy view.
    pub fn active_hierarchy(&self) -> Vec<Vec<String>> {
        self.active_tab()
            .and_then(|t| t.editor.structure())
            .map(collect_instance_paths)
            .unwrap_or_default()
    }

    /// Save the active structure; structures without a file go to the
    /// workspace under a free name derived from their type name.
    pub fn save_active(&mut self) {
        let workspace = self.config.workspace.clone();
        let Some(tab) = self.active_tab_mut() else {
            return;
        };
        match tab.editor.save_in(&workspace) {
            Ok(_) => self.rescan(),
            Err(e) => self.report_error(e),
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.config.theme = theme;
        if let Err(e) = self.config.save(&self.config_path) {
            self.report_error(e);
        }
    }

    pub(super) fn report_error(&mut self, e: anyhow::Error) {
        warn!("{:#}", e);
        self.status = Some(format!("{:#}", e));
    }
}
