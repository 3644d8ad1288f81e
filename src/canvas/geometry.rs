//! Toolkit-independent canvas geometry: link curves, pin hit-testing and
//! view fitting. Points are `(x, y)` tuples so the helpers can be tested
//! without a GUI backend.

use super::PinId;

pub type Point = (f32, f32);

/// Axis-aligned rectangle given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f32 {
        self.max.0 - self.min.0
    }

    pub fn height(&self) -> f32 {
        self.max.1 - self.min.1
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: (self.min.0.min(other.min.0), self.min.1.min(other.min.1)),
            max: (self.max.0.max(other.max.0), self.max.1.max(other.max.1)),
        }
    }
}

/// Control points of the cubic bezier drawn for a link.
///
/// Control points extend horizontally from both ends, by half the horizontal
/// distance but at least `min_offset * zoom`. Very short links collapse to a
/// straight segment to avoid zig-zags.
pub fn link_control_points(start: Point, end: Point, zoom: f32, min_offset: f32) -> [Point; 4] {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let threshold = 10.0 * zoom;
    if dx * dx + dy * dy < threshold * threshold {
        return [start, start, end, end];
    }
    let offset = (dx.abs() * 0.5).max(min_offset * zoom);
    [
        start,
        (start.0 + offset, start.1),
        (end.0 - offset, end.1),
        end,
    ]
}

/// First pin whose center lies within `hit_radius` of `pos`.
pub fn find_pin_at<I>(pos: Point, pins: I, hit_radius: f32) -> Option<PinId>
where
    I: IntoIterator<Item = (PinId, Point)>,
{
    let r2 = hit_radius * hit_radius;
    pins.into_iter()
        .find(|(_, (x, y))| {
            let dx = pos.0 - x;
            let dy = pos.1 - y;
            dx * dx + dy * dy <= r2
        })
        .map(|(id, _)| id)
}

/// Zoom and pan that center `content` (world space) inside `viewport`
/// (screen space) with `margin` pixels on every side, using the mapping
/// `screen = viewport.min + pan + world * zoom`.
///
/// Returns `None` for empty content.
pub fn fit_to_content(
    content: Bounds,
    viewport: Bounds,
    margin: f32,
    zoom_range: (f32, f32),
) -> Option<(f32, Point)> {
    let cw = content.width();
    let ch = content.height();
    if cw <= 0.0 && ch <= 0.0 {
        return None;
    }
    let vw = (viewport.width() - 2.0 * margin).max(1.0);
    let vh = (viewport.height() - 2.0 * margin).max(1.0);
    let zx = if cw > 0.0 { vw / cw } else { f32::INFINITY };
    let zy = if ch > 0.0 { vh / ch } else { f32::INFINITY };
    let zoom = zx.min(zy).clamp(zoom_range.0, zoom_range.1);
    let pan = (
        (viewport.width() - cw * zoom) * 0.5 - content.min.0 * zoom,
        (viewport.height() - ch * zoom) * 0.5 - content.min.1 * zoom,
    );
    Some((zoom, pan))
}
