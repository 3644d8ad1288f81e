//! egui implementation of [`Canvas`] (feature = "egui").
//!
//! egui is immediate mode, so everything that must survive between frames
//! (node positions, pan/zoom, selection, the link being dragged and a
//! pending fit request) lives in [`CanvasState`], owned by the editor tab.
//! [`EguiCanvas`] borrows that state plus the `Ui` for one frame.
//!
//! Nodes are laid out when they close (`end_node`), because their size
//! depends on every pin label. Links are buffered and painted in `end`, once
//! every pin position of the frame is known.

#![cfg(feature = "egui")]

use std::collections::HashMap;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};
use eframe::egui::epaint::CubicBezierShape;

use super::geometry::{self, Bounds};
use super::{Canvas, Column, LinkId, NodeId, PinId, PinKind};

const NODE_MIN_WIDTH: f32 = 120.0;
const HEADER_HEIGHT: f32 = 24.0;
const ROW_HEIGHT: f32 = 20.0;
const PAD: f32 = 8.0;
const PIN_RADIUS: f32 = 5.0;
const FONT_SIZE: f32 = 13.0;
const SLOT_WIDTH: f32 = 260.0;
const SLOT_GAP: f32 = 24.0;
const ZOOM_RANGE: (f32, f32) = (0.2, 4.0);

/// Canvas state that persists across frames for one editor.
#[derive(Debug, Clone)]
pub struct CanvasState {
    pub pan: Vec2,
    pub zoom: f32,
    /// World-space top-left corner of every node seen so far.
    positions: HashMap<NodeId, Pos2>,
    selected: Vec<NodeId>,
    link_drag: Option<PinId>,
    fit_pending: bool,
    /// Next free y (world) in each initial placement column.
    slot_fill: [f32; 3],
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            positions: HashMap::new(),
            selected: Vec::new(),
            link_drag: None,
            fit_pending: false,
            slot_fill: [0.0; 3],
        }
    }
}

impl CanvasState {
    pub fn is_dragging_link(&self) -> bool {
        self.link_drag.is_some()
    }
}

#[derive(Debug, Clone)]
struct PinRow {
    id: PinId,
    kind: PinKind,
    label: String,
}

#[derive(Debug, Clone)]
struct NodeBuilder {
    id: NodeId,
    title: String,
    column: Option<Column>,
    pending: Option<PinRow>,
    inputs: Vec<PinRow>,
    outputs: Vec<PinRow>,
    /// Pins declared outside any column.
    free: Vec<PinRow>,
}

/// One frame of drawing into an `egui::Ui`.
pub struct EguiCanvas<'a> {
    ui: &'a mut egui::Ui,
    state: &'a mut CanvasState,
    id_scope: egui::Id,
    area: Rect,
    node: Option<NodeBuilder>,
    node_bounds: Vec<Rect>,
    pins: Vec<(PinId, Pos2)>,
    links: Vec<(LinkId, PinId, PinId)>,
    released: bool,
    gesture_ok: Option<bool>,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(ui: &'a mut egui::Ui, state: &'a mut CanvasState) -> Self {
        let id_scope = ui.id();
        let area = ui.available_rect_before_wrap();
        Self {
            ui,
            state,
            id_scope,
            area,
            node: None,
            node_bounds: Vec::new(),
            pins: Vec::new(),
            links: Vec::new(),
            released: false,
            gesture_ok: None,
        }
    }

    /// Whether the pointer was released during this frame.
    pub fn released(&self) -> bool {
        self.released
    }

    fn to_screen(&self, world: Pos2) -> Pos2 {
        self.area.min + self.state.pan + world.to_vec2() * self.state.zoom
    }

    fn pin_pos(&self, pin: PinId) -> Option<Pos2> {
        self.pins.iter().find(|(id, _)| *id == pin).map(|(_, p)| *p)
    }

    fn hovered_pin(&self, except: PinId) -> Option<PinId> {
        let pos = self.ui.input(|i| i.pointer.hover_pos())?;
        let radius = (PIN_RADIUS + 4.0) * self.state.zoom.max(1.0);
        geometry::find_pin_at(
            (pos.x, pos.y),
            self.pins
                .iter()
                .filter(|(id, _)| *id != except)
                .map(|(id, p)| (*id, (p.x, p.y))),
            radius,
        )
    }

    fn handle_view_input(&mut self, background: &egui::Response) {
        if background.dragged() {
            self.state.pan += background.drag_delta();
        }
        if background.clicked() {
            self.state.selected.clear();
        }
        let scroll_y = self.ui.input(|i| i.raw_scroll_delta.y);
        if scroll_y.abs() > 0.0 && background.hovered() {
            let old_zoom = self.state.zoom;
            let new_zoom = (old_zoom * (1.0 + scroll_y * 0.001)).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
            if (new_zoom - old_zoom).abs() > f32::EPSILON {
                let cursor = background.hover_pos().unwrap_or(self.area.center());
                let world = (cursor - self.area.min - self.state.pan) / old_zoom;
                self.state.zoom = new_zoom;
                self.state.pan = cursor - self.area.min - world * new_zoom;
            }
        }
    }

    /// Initial world position for a node that has never been shown: free
    /// input-pin nodes to the left, free output-pin nodes to the right,
    /// instances in between, stacked top to bottom.
    fn place_new_node(&mut self, node: &NodeBuilder, world_height: f32) -> Pos2 {
        let slot = match (node.inputs.is_empty() && node.outputs.is_empty(), node.free.first()) {
            (true, Some(pin)) if pin.kind == PinKind::Input => 0,
            (true, Some(_)) => 2,
            _ => 1,
        };
        let y = self.state.slot_fill[slot];
        self.state.slot_fill[slot] += world_height + SLOT_GAP;
        Pos2::new(slot as f32 * SLOT_WIDTH, y)
    }

    fn paint_pin(&mut self, row: &PinRow, pos: Pos2, label_align: Align2, font: &FontId) {
        let z = self.state.zoom;
        let dark = self.ui.visuals().dark_mode;
        let text_color = if dark { Color32::from_gray(220) } else { Color32::from_gray(30) };
        let pin_color = match row.kind {
            PinKind::Input => Color32::from_rgb(90, 160, 230),
            PinKind::Output => Color32::from_rgb(230, 150, 70),
        };
        let painter = self.ui.painter_at(self.area);
        painter.circle_filled(pos, PIN_RADIUS * z, pin_color);

        let offset = Vec2::new((PIN_RADIUS + PAD * 0.5) * z, 0.0);
        let label_pos = if label_align == Align2::RIGHT_CENTER {
            pos - offset
        } else {
            pos + offset
        };
        painter.text(label_pos, label_align, &row.label, font.clone(), text_color);

        let hit = Rect::from_center_size(pos, Vec2::splat((PIN_RADIUS + 4.0) * 2.0 * z));
        let resp = self
            .ui
            .interact(hit, self.id_scope.with(("pin", row.id.0)), Sense::drag());
        if resp.hovered() {
            painter.circle_stroke(pos, (PIN_RADIUS + 2.0) * z, Stroke::new(1.5, pin_color));
        }
        if resp.drag_started() {
            self.state.link_drag = Some(row.id);
        }
        self.pins.push((row.id, pos));
    }

    fn layout_node(&mut self, node: NodeBuilder) {
        let z = self.state.zoom;
        let font = FontId::proportional(FONT_SIZE * z);
        let painter = self.ui.painter_at(self.area);
        let measure = |text: &str| {
            painter
                .layout_no_wrap(text.to_string(), font.clone(), Color32::WHITE)
                .size()
                .x
        };

        let title_w = measure(&node.title);
        let col_w = |rows: &[PinRow]| rows.iter().map(|r| measure(&r.label)).fold(0.0, f32::max);
        let left_w = col_w(&node.inputs);
        let right_w = col_w(&node.outputs);
        let free_w = col_w(&node.free);
        let width = (NODE_MIN_WIDTH * z)
            .max(title_w + 2.0 * PAD * z)
            .max(left_w + right_w + 3.0 * PAD * z + 4.0 * PIN_RADIUS * z)
            .max(free_w + 2.0 * PAD * z + 2.0 * PIN_RADIUS * z);
        let column_rows = node.inputs.len().max(node.outputs.len());
        let rows = column_rows + node.free.len();
        let height = HEADER_HEIGHT * z + rows as f32 * ROW_HEIGHT * z + PAD * z;

        let world_origin = match self.state.positions.get(&node.id) {
            Some(p) => *p,
            None => {
                let p = self.place_new_node(&node, height / z);
                self.state.positions.insert(node.id, p);
                p
            }
        };
        let rect = Rect::from_min_size(self.to_screen(world_origin), Vec2::new(width, height));
        let header = Rect::from_min_size(rect.min, Vec2::new(width, HEADER_HEIGHT * z));

        // Header is the drag handle and the click target for selection.
        let resp = self.ui.interact(
            header,
            self.id_scope.with(("node", node.id.0)),
            Sense::click_and_drag(),
        );
        if resp.clicked() || resp.drag_started() {
            let additive = self.ui.input(|i| i.modifiers.ctrl || i.modifiers.shift);
            if !additive {
                self.state.selected.clear();
            }
            if !self.state.selected.contains(&node.id) {
                self.state.selected.push(node.id);
            }
        }
        if resp.dragged() {
            let delta = resp.drag_delta() / z;
            if let Some(p) = self.state.positions.get_mut(&node.id) {
                *p += delta;
            }
        }

        let dark = self.ui.visuals().dark_mode;
        let (body, head, title_color) = if dark {
            (Color32::from_gray(45), Color32::from_rgb(60, 70, 90), Color32::from_gray(235))
        } else {
            (Color32::from_gray(245), Color32::from_rgb(200, 215, 235), Color32::from_gray(20))
        };
        painter.rect_filled(rect, 6.0 * z, body);
        painter.rect_filled(header, 6.0 * z, head);
        let border = if self.state.selected.contains(&node.id) {
            Stroke::new(2.5, Color32::from_rgb(0, 120, 255))
        } else {
            Stroke::new(1.0, Color32::from_gray(120))
        };
        painter.rect_stroke(rect, 6.0 * z, border, egui::StrokeKind::Outside);
        painter.text(
            header.left_center() + Vec2::new(PAD * z, 0.0),
            Align2::LEFT_CENTER,
            &node.title,
            font.clone(),
            title_color,
        );

        let row_y = |i: usize| header.bottom() + PAD * 0.5 * z + (i as f32 + 0.5) * ROW_HEIGHT * z;
        for (i, row) in node.inputs.iter().enumerate() {
            self.paint_pin(row, Pos2::new(rect.left(), row_y(i)), Align2::LEFT_CENTER, &font);
        }
        for (i, row) in node.outputs.iter().enumerate() {
            self.paint_pin(row, Pos2::new(rect.right(), row_y(i)), Align2::RIGHT_CENTER, &font);
        }
        // Free pins face the interior of the structure: an input port feeds
        // the instances to its right, an output port collects from its left.
        for (i, row) in node.free.iter().enumerate() {
            let y = row_y(column_rows + i);
            match row.kind {
                PinKind::Input => {
                    self.paint_pin(row, Pos2::new(rect.right(), y), Align2::RIGHT_CENTER, &font)
                }
                PinKind::Output => {
                    self.paint_pin(row, Pos2::new(rect.left(), y), Align2::LEFT_CENTER, &font)
                }
            }
        }

        let world_rect = Rect::from_min_size(world_origin, rect.size() / z);
        self.node_bounds.push(world_rect);
    }

    fn paint_link(&self, start: Pos2, end: Pos2, stroke: Stroke) {
        let pts = geometry::link_control_points((start.x, start.y), (end.x, end.y), self.state.zoom, 50.0);
        let points = pts.map(|(x, y)| Pos2::new(x, y));
        let shape = CubicBezierShape::from_points_stroke(points, false, Color32::TRANSPARENT, stroke);
        self.ui.painter_at(self.area).add(shape);
    }

    fn apply_fit(&mut self) {
        let Some(content) = self.node_bounds.iter().copied().reduce(|a, b| a.union(b)) else {
            return;
        };
        let fit = geometry::fit_to_content(
            Bounds::new((content.min.x, content.min.y), (content.max.x, content.max.y)),
            Bounds::new((self.area.min.x, self.area.min.y), (self.area.max.x, self.area.max.y)),
            40.0,
            (ZOOM_RANGE.0, 1.5),
        );
        if let Some((zoom, (px, py))) = fit {
            self.state.zoom = zoom;
            self.state.pan = Vec2::new(px, py);
            self.ui.ctx().request_repaint();
        }
        self.state.fit_pending = false;
    }
}

impl Canvas for EguiCanvas<'_> {
    fn begin(&mut self, editor_id: &str) {
        self.id_scope = self.ui.id().with(editor_id);
        self.area = self.ui.available_rect_before_wrap();
        let background = self
            .ui
            .interact(self.area, self.id_scope.with("background"), Sense::click_and_drag());
        self.handle_view_input(&background);
        self.released = self.ui.input(|i| i.pointer.any_released());
        let fill = if self.ui.visuals().dark_mode {
            Color32::from_gray(28)
        } else {
            Color32::from_gray(232)
        };
        self.ui.painter_at(self.area).rect_filled(self.area, 0.0, fill);
    }

    fn end(&mut self) {
        let link_stroke = Stroke::new(2.0 * self.state.zoom.max(0.5), Color32::from_rgb(120, 140, 170));
        for (_, a, b) in &self.links {
            if let (Some(pa), Some(pb)) = (self.pin_pos(*a), self.pin_pos(*b)) {
                self.paint_link(pa, pb, link_stroke);
            }
        }

        if let Some(src) = self.state.link_drag {
            let pointer = self.ui.input(|i| i.pointer.latest_pos());
            if let (Some(from), Some(to)) = (self.pin_pos(src), pointer) {
                let color = match self.gesture_ok {
                    Some(true) => Color32::from_rgb(80, 190, 100),
                    Some(false) => Color32::from_rgb(220, 80, 80),
                    None => Color32::from_gray(150),
                };
                self.paint_link(from, to, Stroke::new(2.0, color));
            }
            if self.released {
                self.state.link_drag = None;
            }
        }

        if self.state.fit_pending {
            self.apply_fit();
        }
        self.ui.allocate_rect(self.area, Sense::hover());
    }

    fn begin_node(&mut self, id: NodeId, title: &str) {
        self.node = Some(NodeBuilder {
            id,
            title: title.to_string(),
            column: None,
            pending: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            free: Vec::new(),
        });
    }

    fn end_node(&mut self) {
        if let Some(node) = self.node.take() {
            self.layout_node(node);
        }
    }

    fn begin_column(&mut self, column: Column) {
        if let Some(node) = self.node.as_mut() {
            node.column = Some(column);
        }
    }

    fn end_column(&mut self) {
        if let Some(node) = self.node.as_mut() {
            node.column = None;
        }
    }

    fn begin_pin(&mut self, id: PinId, kind: PinKind, label: &str) {
        if let Some(node) = self.node.as_mut() {
            node.pending = Some(PinRow {
                id,
                kind,
                label: label.to_string(),
            });
        }
    }

    fn end_pin(&mut self) {
        if let Some(node) = self.node.as_mut() {
            if let Some(row) = node.pending.take() {
                match node.column {
                    Some(Column::Inputs) => node.inputs.push(row),
                    Some(Column::Outputs) => node.outputs.push(row),
                    None => node.free.push(row),
                }
            }
        }
    }

    fn link(&mut self, id: LinkId, start: PinId, end: PinId) {
        self.links.push((id, start, end));
    }

    fn begin_create(&mut self) -> bool {
        self.gesture_ok = None;
        self.state.link_drag.is_some()
    }

    fn query_new_link(&mut self) -> Option<(PinId, PinId)> {
        let src = self.state.link_drag?;
        self.hovered_pin(src).map(|dst| (src, dst))
    }

    fn accept_new_item(&mut self) -> bool {
        self.gesture_ok = Some(true);
        self.released
    }

    fn reject_new_item(&mut self) {
        self.gesture_ok = Some(false);
    }

    fn end_create(&mut self) {
        if self.released {
            self.state.link_drag = None;
        }
    }

    fn navigate_to_content(&mut self) {
        self.state.fit_pending = true;
    }

    fn selected_nodes(&self) -> Vec<NodeId> {
        self.state.selected.clone()
    }
}
