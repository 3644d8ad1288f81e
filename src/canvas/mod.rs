//! Node canvas seam.
//!
//! [`Canvas`] is the retained-id, immediate-mode drawing interface the
//! projection pass talks to: editor/node/column/pin regions are opened and
//! closed in strict nesting order every frame, links are drawn between pin
//! ids, and link-creation gestures are polled between `begin_create` and
//! `end_create`.
//!
//! Implementations:
//! - [`RecordingCanvas`] logs every call; used headless (CLI) and in tests.
//! - `EguiCanvas` (feature = "egui") draws into an `egui::Ui`.

use serde::{Deserialize, Serialize};

#[cfg(feature = "egui")]
mod egui_canvas;
pub mod geometry;
mod recording;

#[cfg(feature = "egui")]
pub use egui_canvas::{CanvasState, EguiCanvas};
pub use recording::{DrawOp, RecordingCanvas};

/// Canvas id of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Canvas id of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PinId(pub u64);

/// Canvas id of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinKind {
    Input,
    Output,
}

/// Pin column inside a node: inputs on the left, outputs on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Inputs,
    Outputs,
}

pub trait Canvas {
    fn begin(&mut self, editor_id: &str);
    fn end(&mut self);

    fn begin_node(&mut self, id: NodeId, title: &str);
    fn end_node(&mut self);

    fn begin_column(&mut self, column: Column);
    fn end_column(&mut self);

    fn begin_pin(&mut self, id: PinId, kind: PinKind, label: &str);
    fn end_pin(&mut self);

    fn link(&mut self, id: LinkId, start: PinId, end: PinId);

    /// Returns true while a link-creation gesture is in progress. `end_create`
    /// must follow whenever this returned true.
    fn begin_create(&mut self) -> bool;
    /// Both pins of the in-progress gesture, once the pointer is over a
    /// second pin.
    fn query_new_link(&mut self) -> Option<(PinId, PinId)>;
    /// True only when the user confirmed the gesture this frame.
    fn accept_new_item(&mut self) -> bool;
    fn reject_new_item(&mut self);
    fn end_create(&mut self);

    /// Fit the view to everything drawn.
    fn navigate_to_content(&mut self);

    /// Nodes the user currently has selected.
    fn selected_nodes(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn with_node<R>(&mut self, id: NodeId, title: &str, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        self.begin_node(id, title);
        let r = f(self);
        self.end_node();
        r
    }

    fn with_column<R>(&mut self, column: Column, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        self.begin_column(column);
        let r = f(self);
        self.end_column();
        r
    }

    fn with_pin(&mut self, id: PinId, kind: PinKind, label: &str)
    where
        Self: Sized,
    {
        self.begin_pin(id, kind, label);
        self.end_pin();
    }
}
