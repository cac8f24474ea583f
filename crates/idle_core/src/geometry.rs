//! Percent-space positions, pixel conversion, and the fixed anchor points of
//! the play area (collector docks, build plots).

use crate::{Constants, Layout, Rect, Vec2, Viewport};

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Moves `self` towards `target` by at most `step` percent units.
    /// Never overshoots: a step longer than the remaining distance lands on `target`.
    #[must_use]
    pub fn step_towards(self, target: Vec2, step: f32) -> Vec2 {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let distance = dx.hypot(dy);
        if distance <= step || distance <= f32::EPSILON {
            return target;
        }
        Vec2 {
            x: self.x + dx / distance * step,
            y: self.y + dy / distance * step,
        }
    }
}

impl Rect {
    /// True when a square of side `size` centred at `centre` overlaps this rect.
    pub fn overlaps_square(&self, centre: Vec2, size: f32) -> bool {
        let half = size / 2.0;
        centre.x + half > self.x
            && centre.x - half < self.x + self.width
            && centre.y + half > self.y
            && centre.y - half < self.y + self.height
    }
}

impl Viewport {
    /// Builds a viewport for a container of the given pixel size. The game
    /// unit is one percent of the smaller side, clamped to the configured range.
    pub fn new(width_px: f32, height_px: f32, constants: &Constants) -> Self {
        let game_unit_px = (width_px.min(height_px) / 100.0)
            .clamp(constants.game_unit_min_px, constants.game_unit_max_px);
        Self {
            width_px,
            height_px,
            game_unit_px,
        }
    }

    /// A viewport is usable once the container has been laid out.
    pub fn is_ready(&self) -> bool {
        self.width_px > 0.0 && self.height_px > 0.0
    }

    pub fn to_px(&self, point: Vec2) -> (f32, f32) {
        (
            point.x / 100.0 * self.width_px,
            point.y / 100.0 * self.height_px,
        )
    }

    /// Distance between two percent-space points, measured in pixels.
    pub fn distance_px(&self, a: Vec2, b: Vec2) -> f32 {
        let (ax, ay) = self.to_px(a);
        let (bx, by) = self.to_px(b);
        (bx - ax).hypot(by - ay)
    }

    /// Rendered size of an entity whose size is a percentage of the play-area width.
    pub fn size_px(&self, size_percent: f32) -> f32 {
        size_percent / 100.0 * self.width_px
    }
}

/// Resting point of the collector assigned to `dock_slot`: the docks are
/// spread evenly along the top edge of the base.
pub fn dock_position(layout: &Layout, constants: &Constants, dock_slot: u32) -> Vec2 {
    let spacing = layout.base.width / constants.collector_max_docks.max(1) as f32;
    Vec2::new(
        layout.base.x + spacing * dock_slot as f32 + spacing / 2.0,
        layout.base.y - constants.collector_dock_offset_y_percent,
    )
}

/// Centre of a build plot. Plots divide the base into equal columns, one per
/// factory slot plus the trade post slot.
pub fn slot_position(layout: &Layout, constants: &Constants, slot: u32) -> Vec2 {
    let columns = constants.factory_slots.max(constants.trade_post_slot + 1);
    let spacing = layout.base.width / columns.max(1) as f32;
    Vec2::new(
        layout.base.x + spacing * slot as f32 + spacing / 2.0,
        layout.base.y + layout.base.height / 2.0,
    )
}
