//! NodalHDL structure editor.
//!
//! This crate loads hardware-description structures (ports, nodes,
//! substructure instances and nets) and projects them onto a node canvas
//! once per UI frame via [`projection::ProjectionPass`]. Confirmed
//! link-creation gestures on the canvas become `connect` calls on the
//! structure.
//!
//! The binary `nodal-editor` runs the projection headless and prints JSON.

pub mod canvas;
pub mod config;
pub mod editor;
pub mod explorer;
pub mod graph;
pub mod logging;
pub mod projection;
pub mod samples;
pub mod structure;

// The interactive application lives behind the `egui` feature flag and is
// launched by demos/structure_editor.rs.
#[cfg(feature = "egui")]
pub mod app;
