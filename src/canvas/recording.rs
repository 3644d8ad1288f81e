use serde::{Deserialize, Serialize};

use super::{Canvas, Column, LinkId, NodeId, PinId, PinKind};

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Begin { editor: String },
    End,
    BeginNode { id: NodeId, title: String },
    EndNode,
    BeginColumn { column: Column },
    EndColumn,
    BeginPin { id: PinId, kind: PinKind, label: String },
    EndPin,
    Link { id: LinkId, start: PinId, end: PinId },
    BeginCreate,
    AcceptNewItem,
    RejectNewItem,
    EndCreate,
    NavigateToContent,
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    start: PinId,
    end: Option<PinId>,
    confirmed: bool,
}

/// A canvas that draws nothing and records every call.
///
/// A single link-creation gesture and a node selection can be scripted to
/// stand in for user input.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
    gesture: Option<Gesture>,
    selection: Vec<NodeId>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a gesture dragged from `start` and held over `end`. With
    /// `confirmed` the gesture is released on the next `accept_new_item`.
    pub fn script_link(&mut self, start: PinId, end: PinId, confirmed: bool) {
        self.gesture = Some(Gesture {
            start,
            end: Some(end),
            confirmed,
        });
    }

    /// Script a gesture that has left `start` but is not over another pin.
    pub fn script_drag(&mut self, start: PinId) {
        self.gesture = Some(Gesture {
            start,
            end: None,
            confirmed: false,
        });
    }

    pub fn gesture_pending(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn select(&mut self, nodes: Vec<NodeId>) {
        self.selection = nodes;
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn nodes(&self) -> Vec<(NodeId, &str)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::BeginNode { id, title } => Some((*id, title.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn pins(&self) -> Vec<(PinId, PinKind, &str)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::BeginPin { id, kind, label } => Some((*id, *kind, label.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn links(&self) -> Vec<(LinkId, PinId, PinId)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Link { id, start, end } => Some((*id, *start, *end)),
                _ => None,
            })
            .collect()
    }

    /// Labels of the pins placed in `column` of `node`, in drawing order.
    pub fn column_pins(&self, node: NodeId, column: Column) -> Vec<&str> {
        let mut out = Vec::new();
        let mut in_node = false;
        let mut current: Option<Column> = None;
        for op in &self.ops {
            match op {
                DrawOp::BeginNode { id, .. } => in_node = *id == node,
                DrawOp::EndNode => in_node = false,
                DrawOp::BeginColumn { column } => current = Some(*column),
                DrawOp::EndColumn => current = None,
                DrawOp::BeginPin { label, .. } if in_node && current == Some(column) => {
                    out.push(label.as_str())
                }
                _ => {}
            }
        }
        out
    }

    pub fn navigate_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::NavigateToContent))
            .count()
    }

    /// Whether every begin call was closed by its matching end call, in order.
    pub fn is_balanced(&self) -> bool {
        let mut stack = Vec::new();
        for op in &self.ops {
            let closes = match op {
                DrawOp::Begin { .. } => {
                    stack.push("editor");
                    continue;
                }
                DrawOp::BeginNode { .. } => {
                    stack.push("node");
                    continue;
                }
                DrawOp::BeginColumn { .. } => {
                    stack.push("column");
                    continue;
                }
                DrawOp::BeginPin { .. } => {
                    stack.push("pin");
                    continue;
                }
                DrawOp::BeginCreate => {
                    stack.push("create");
                    continue;
                }
                DrawOp::End => "editor",
                DrawOp::EndNode => "node",
                DrawOp::EndColumn => "column",
                DrawOp::EndPin => "pin",
                DrawOp::EndCreate => "create",
                _ => continue,
            };
            if stack.pop() != Some(closes) {
                return false;
            }
        }
        stack.is_empty()
    }
}

impl Canvas for RecordingCanvas {
    fn begin(&mut self, editor_id: &str) {
        self.ops.push(DrawOp::Begin {
            editor: editor_id.to_string(),
        });
    }

    fn end(&mut self) {
        self.ops.push(DrawOp::End);
    }

    fn begin_node(&mut self, id: NodeId, title: &str) {
        self.ops.push(DrawOp::BeginNode {
            id,
            title: title.to_string(),
        });
    }

    fn end_node(&mut self) {
        self.ops.push(DrawOp::EndNode);
    }

    fn begin_column(&mut self, column: Column) {
        self.ops.push(DrawOp::BeginColumn { column });
    }

    fn end_column(&mut self) {
        self.ops.push(DrawOp::EndColumn);
    }

    fn begin_pin(&mut self, id: PinId, kind: PinKind, label: &str) {
        self.ops.push(DrawOp::BeginPin {
            id,
            kind,
            label: label.to_string(),
        });
    }

    fn end_pin(&mut self) {
        self.ops.push(DrawOp::EndPin);
    }

    fn link(&mut self, id: LinkId, start: PinId, end: PinId) {
        self.ops.push(DrawOp::Link { id, start, end });
    }

    fn begin_create(&mut self) -> bool {
        if self.gesture.is_none() {
            return false;
        }
        self.ops.push(DrawOp::BeginCreate);
        true
    }

    fn query_new_link(&mut self) -> Option<(PinId, PinId)> {
        let g = self.gesture?;
        g.end.map(|end| (g.start, end))
    }

    fn accept_new_item(&mut self) -> bool {
        let confirmed = self.gesture.is_some_and(|g| g.confirmed);
        if confirmed {
            self.ops.push(DrawOp::AcceptNewItem);
        }
        confirmed
    }

    fn reject_new_item(&mut self) {
        self.ops.push(DrawOp::RejectNewItem);
    }

    fn end_create(&mut self) {
        self.ops.push(DrawOp::EndCreate);
        // A released gesture is over; an unconfirmed one stays held.
        if self.gesture.is_some_and(|g| g.confirmed) {
            self.gesture = None;
        }
    }

    fn navigate_to_content(&mut self) {
        self.ops.push(DrawOp::NavigateToContent);
    }

    fn selected_nodes(&self) -> Vec<NodeId> {
        self.selection.clone()
    }
}
