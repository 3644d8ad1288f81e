//! Interactive structure editor application (feature = "egui").
//!
//! Menu bar, explorer/hierarchy/inspector side panel, logs panel and one tab
//! per open structure. Each tab draws its [`StructureEditor`] through an
//! [`EguiCanvas`].
//!
//! [`StructureEditor`]: crate::editor::StructureEditor
//! [`EguiCanvas`]: crate::canvas::EguiCanvas

#![cfg(feature = "egui")]

mod state;
mod ui;

pub use state::{EditorApp, EditorTab, Panels};
