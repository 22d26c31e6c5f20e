use std::time::Instant;

use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Vec2};

// Reel tuneables (all GUI-thread driven)
const REEL_GAP_PX: f32 = 12.0; // gap between tiles
const REEL_OMEGA: f32 = 14.0; // responsiveness (larger = snappier)
const REEL_SNAP_EPS: f32 = 0.15; // when |target - pos| < eps, snap current
const REEL_SCROLL_SENS: f32 = 0.01; // indices per scroll-point
const REEL_SCROLL_CLAMP: f32 = 3.0; // cap per-frame scroll adjustment
const REEL_MOTION_EPS: f32 = 0.0005;

const HEIGHT_OMEGA: f32 = 8.0; // container height easing
const HEIGHT_EPS: f32 = 0.5;

/// Snap-aligned reel motion: a fractional position eased toward a target
/// index, settling on item boundaries. Kept free of any drawing code so the
/// snap/settle contract is testable without a UI context.
///
/// The settled index is the only thing observers see; in-flight positions
/// are opaque to them.
#[derive(Debug)]
pub struct ReelMotion {
    len: usize,
    pos: f32,
    target: f32,
    settled: usize,
    changed: Option<usize>,
    snap_hold: u8,
}

impl ReelMotion {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            pos: 0.0,
            target: 0.0,
            settled: 0,
            changed: None,
            snap_hold: 0,
        }
    }

    fn max_index(&self) -> f32 {
        self.len.saturating_sub(1) as f32
    }

    /// Resize the reel (e.g. when the slide list is rebuilt). Indices are
    /// clamped into range; no selection notification fires.
    pub fn set_len(&mut self, len: usize) {
        if len == self.len {
            return;
        }
        self.len = len;
        let max = self.max_index();
        self.pos = self.pos.clamp(0.0, max);
        self.target = self.target.clamp(0.0, max);
        self.settled = self.settled.min(self.len.saturating_sub(1));
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Settled selection; never reflects an in-flight drag.
    pub fn selected(&self) -> usize {
        self.settled
    }

    /// Fractional position, for layout only.
    pub fn pos(&self) -> f32 {
        self.pos
    }

    /// Scroll to a snap point. `immediate` kills the animation and settles
    /// synchronously; used for deep-link restoration so nothing visibly
    /// animates on load.
    pub fn scroll_to(&mut self, index: usize, immediate: bool) {
        if self.len == 0 {
            return;
        }
        let target = index.min(self.len - 1) as f32;
        self.target = target;
        self.snap_hold = 0;
        if immediate {
            self.pos = target;
            self.settle();
        }
    }

    /// Native previous/next snap operation.
    pub fn step(&mut self, delta: isize) {
        if self.len == 0 {
            return;
        }
        let next = self.settled as isize + delta;
        let next = next.clamp(0, self.len as isize - 1) as usize;
        self.scroll_to(next, false);
    }

    /// Drag input, in index units (pixel delta / tile stride).
    pub fn drag_by(&mut self, index_delta: f32) {
        self.target = (self.target + index_delta).clamp(0.0, self.max_index());
    }

    /// Wheel input, in scroll points.
    pub fn scroll_by(&mut self, points: f32) {
        let applied = (points * REEL_SCROLL_SENS).clamp(-REEL_SCROLL_CLAMP, REEL_SCROLL_CLAMP);
        self.target = (self.target + applied).clamp(0.0, self.max_index());
    }

    /// Defer snapping for a couple of frames; called while a drag is live so
    /// the reel does not fight the pointer.
    pub fn hold_snap(&mut self) {
        self.snap_hold = 2;
    }

    /// Advance the animation by `dt` seconds. Returns true while still in
    /// motion (callers keep repainting until it settles).
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.len == 0 {
            return false;
        }
        self.target = self.target.clamp(0.0, self.max_index());

        let alpha = 1.0 - (-REEL_OMEGA * dt).exp();
        self.pos += (self.target - self.pos) * alpha;
        self.pos = self.pos.clamp(0.0, self.max_index());

        if (self.target - self.pos).abs() < REEL_SNAP_EPS {
            if self.snap_hold > 0 {
                self.snap_hold -= 1;
            } else {
                // Momentum has died down: settle on the nearest boundary.
                self.target = self.target.round().clamp(0.0, self.max_index());
                self.settle();
            }
        }

        (self.target - self.pos).abs() > REEL_MOTION_EPS
    }

    fn settle(&mut self) {
        let index = self.target.round().clamp(0.0, self.max_index()) as usize;
        if index != self.settled {
            self.settled = index;
            self.changed = Some(index);
        }
    }

    /// The settled-selection notification: fires exactly once per settle,
    /// whether the index moved by drag, wheel, click or programmatic scroll.
    pub fn take_selection_change(&mut self) -> Option<usize> {
        self.changed.take()
    }
}

/// Smoothly eased container height, used by the main carousel when the
/// selected entry's image set changes aspect ratio.
#[derive(Debug)]
pub struct HeightSpring {
    current: f32,
    target: f32,
}

impl HeightSpring {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target.max(0.0);
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn tick(&mut self, dt: f32) -> bool {
        let alpha = 1.0 - (-HEIGHT_OMEGA * dt).exp();
        self.current += (self.target - self.current) * alpha;
        if (self.target - self.current).abs() < HEIGHT_EPS {
            self.current = self.target;
        }
        (self.target - self.current).abs() > 0.0
    }
}

/// One tile of a carousel. Textures load lazily, so a tile may not have one
/// yet; a placeholder is drawn until it does.
#[derive(Clone)]
pub struct Tile {
    pub texture: Option<egui::TextureHandle>,
}

pub struct CarouselOptions {
    /// Clicking a tile scrolls to it (thumbnail behavior).
    pub select_on_click: bool,
    /// Outline the settled tile.
    pub highlight_selected: bool,
}

pub struct CarouselResponse {
    /// Settled selection changed this frame.
    pub selection_changed: Option<usize>,
    /// Screen rect of the settled tile, for overlaying per-slide actions.
    pub snapped_rect: Option<Rect>,
}

/// A horizontally scrollable, snap-to-center strip of tiles. Used twice:
/// once for the thumbnail selector and once for the main image viewer.
pub struct Carousel {
    motion: ReelMotion,
    tile_size: Vec2,
    last_tick: Instant,
}

impl Carousel {
    pub fn new(tile_size: Vec2) -> Self {
        Self {
            motion: ReelMotion::new(0),
            tile_size,
            last_tick: Instant::now(),
        }
    }

    pub fn set_tile_size(&mut self, tile_size: Vec2) {
        self.tile_size = tile_size;
    }

    pub fn selected(&self) -> usize {
        self.motion.selected()
    }

    pub fn scroll_to(&mut self, index: usize, immediate: bool) {
        self.motion.scroll_to(index, immediate);
    }

    pub fn step(&mut self, delta: isize) {
        self.motion.step(delta);
    }

    pub fn set_len(&mut self, len: usize) {
        self.motion.set_len(len);
    }

    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        tiles: &[Tile],
        opts: &CarouselOptions,
    ) -> CarouselResponse {
        self.motion.set_len(tiles.len());

        let desired = Vec2::new(ui.available_width(), self.tile_size.y + REEL_GAP_PX);
        let (rect, _) = ui.allocate_exact_size(desired, Sense::hover());
        let painter = ui.painter_at(rect);

        let now = Instant::now();
        let dt = (now - self.last_tick).as_secs_f32().min(0.25);
        self.last_tick = now;

        if tiles.is_empty() {
            return CarouselResponse {
                selection_changed: None,
                snapped_rect: None,
            };
        }

        let stride = self.tile_size.x + REEL_GAP_PX;
        let center = rect.center();

        // Wheel scroll while hovering the strip.
        if ui.rect_contains_pointer(rect) {
            let scroll = ui.input(|i| i.raw_scroll_delta);
            let points = scroll.x + scroll.y;
            if points != 0.0 {
                self.motion.scroll_by(-points);
                self.motion.hold_snap();
            }
        }

        // Visible window around the fractional position.
        let half_span = rect.width() / (2.0 * stride) + 1.0;
        let first = (self.motion.pos() - half_span).floor().max(0.0) as usize;
        let last = ((self.motion.pos() + half_span).ceil() as usize).min(tiles.len() - 1);

        let mut drag_dx = 0.0f32;
        let mut clicked: Option<usize> = None;

        for (i, tile) in tiles.iter().enumerate().take(last + 1).skip(first) {
            let cx = center.x + (i as f32 - self.motion.pos()) * stride;
            let tile_rect = Rect::from_center_size(Pos2::new(cx, center.y), self.tile_size);
            if !rect.intersects(tile_rect) {
                continue;
            }

            let resp = ui.allocate_rect(tile_rect, Sense::click_and_drag());
            if resp.dragged() {
                drag_dx += resp.drag_delta().x;
            }
            if resp.clicked() {
                clicked = Some(i);
            }

            painter.rect_filled(tile_rect, Rounding::same(4.0), Color32::from_gray(24));
            if let Some(texture) = tile.texture.as_ref() {
                let size = texture.size_vec2();
                let scale = (self.tile_size.x / size.x)
                    .min(self.tile_size.y / size.y)
                    .min(1.0);
                let fitted = Rect::from_center_size(tile_rect.center(), size * scale);
                painter.image(
                    texture.id(),
                    fitted,
                    Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }

            if opts.highlight_selected && i == self.motion.selected() {
                painter.rect_stroke(
                    tile_rect.expand(2.0),
                    Rounding::same(4.0),
                    Stroke::new(2.0, Color32::LIGHT_BLUE),
                );
            }
        }

        if drag_dx != 0.0 {
            self.motion.drag_by(-drag_dx / stride);
            self.motion.hold_snap();
        }
        if let Some(i) = clicked {
            if opts.select_on_click {
                self.motion.scroll_to(i, false);
            }
        }

        if self.motion.tick(dt) {
            ui.ctx().request_repaint();
        }

        let selected = self.motion.selected();
        let snapped_cx = center.x + (selected as f32 - self.motion.pos()) * stride;
        let snapped_rect =
            Rect::from_center_size(Pos2::new(snapped_cx, center.y), self.tile_size);

        CarouselResponse {
            selection_changed: self.motion.take_selection_change(),
            snapped_rect: Some(snapped_rect),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn run_until_settled(motion: &mut ReelMotion) {
        for _ in 0..600 {
            if !motion.tick(DT) {
                return;
            }
        }
        panic!("reel never settled");
    }

    #[test]
    fn starts_settled_on_first_item_without_notification() {
        let mut motion = ReelMotion::new(5);
        assert_eq!(motion.selected(), 0);
        assert_eq!(motion.take_selection_change(), None);
    }

    #[test]
    fn immediate_scroll_settles_synchronously() {
        let mut motion = ReelMotion::new(4);
        motion.scroll_to(2, true);
        assert_eq!(motion.selected(), 2);
        assert_eq!(motion.take_selection_change(), Some(2));
        // Exactly once per settle.
        assert_eq!(motion.take_selection_change(), None);
    }

    #[test]
    fn animated_scroll_settles_after_ticks() {
        let mut motion = ReelMotion::new(4);
        motion.scroll_to(3, false);
        assert_eq!(motion.selected(), 0, "selection must not change mid-flight");
        run_until_settled(&mut motion);
        assert_eq!(motion.selected(), 3);
        assert_eq!(motion.take_selection_change(), Some(3));
    }

    #[test]
    fn step_clamps_at_edges() {
        let mut motion = ReelMotion::new(3);
        motion.step(-1);
        run_until_settled(&mut motion);
        assert_eq!(motion.selected(), 0);

        motion.scroll_to(2, true);
        motion.take_selection_change();
        motion.step(1);
        run_until_settled(&mut motion);
        assert_eq!(motion.selected(), 2);
        assert_eq!(motion.take_selection_change(), None);
    }

    #[test]
    fn drag_settles_on_nearest_boundary() {
        let mut motion = ReelMotion::new(10);
        motion.drag_by(2.4);
        run_until_settled(&mut motion);
        assert_eq!(motion.selected(), 2);

        motion.take_selection_change();
        motion.drag_by(0.6);
        run_until_settled(&mut motion);
        assert_eq!(motion.selected(), 3);
        assert_eq!(motion.take_selection_change(), Some(3));
    }

    #[test]
    fn drag_past_the_edge_clamps() {
        let mut motion = ReelMotion::new(3);
        motion.drag_by(50.0);
        run_until_settled(&mut motion);
        assert_eq!(motion.selected(), 2);
    }

    #[test]
    fn wheel_scroll_is_clamped_per_frame() {
        let mut motion = ReelMotion::new(100);
        motion.scroll_by(10_000.0);
        run_until_settled(&mut motion);
        assert_eq!(motion.selected(), 3); // REEL_SCROLL_CLAMP
    }

    #[test]
    fn set_len_clamps_without_notification() {
        let mut motion = ReelMotion::new(10);
        motion.scroll_to(9, true);
        motion.take_selection_change();

        motion.set_len(3);
        assert_eq!(motion.selected(), 2);
        assert_eq!(motion.take_selection_change(), None);
    }

    #[test]
    fn height_spring_converges() {
        let mut spring = HeightSpring::new(100.0);
        spring.set_target(300.0);
        let mut ticks = 0;
        while spring.tick(DT) {
            ticks += 1;
            assert!(ticks < 600, "height never converged");
        }
        assert_eq!(spring.value(), 300.0);
        assert!(ticks > 1, "height change must not be instant");
    }
}
