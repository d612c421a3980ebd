/// The global viewport transform
///
/// Applied before any per-photo transform:
/// `screen = scene * scale + pan`. Pan is a screen-space quantity; scale
/// is clamped to [0.1, 5].

use iced::{Point, Vector};

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 5.0;

/// Fixed scale increment per wheel event. Only the scroll direction is
/// used, never the magnitude, so high-resolution wheels do not run away.
pub const WHEEL_ZOOM_STEP: f32 = 0.025;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan: Vector,
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vector::new(0.0, 0.0),
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_scene(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.scale,
            (screen.y - self.pan.y) / self.scale,
        )
    }

    pub fn to_screen(&self, scene: Point) -> Point {
        Point::new(
            scene.x * self.scale + self.pan.x,
            scene.y * self.scale + self.pan.y,
        )
    }

    /// Add a screen-space delta to the pan. No scale interaction.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan = self.pan + Vector::new(dx, dy);
    }

    /// Change the scale while keeping the scene point under
    /// `screen_point` fixed on screen. This is what makes zoom feel
    /// anchored under the cursor or pinch midpoint instead of the origin.
    pub fn zoom_at(&mut self, screen_point: Point, target_scale: f32) {
        let anchor = self.to_scene(screen_point);
        self.scale = target_scale.clamp(MIN_SCALE, MAX_SCALE);
        self.pan = Vector::new(
            screen_point.x - anchor.x * self.scale,
            screen_point.y - anchor.y * self.scale,
        );
    }

    /// Wheel zoom: one fixed step in the scroll direction, anchored at
    /// the cursor.
    pub fn wheel_zoom(&mut self, screen_point: Point, direction: f32) {
        if direction == 0.0 {
            return;
        }
        let target = self.scale + WHEEL_ZOOM_STEP * direction.signum();
        self.zoom_at(screen_point, target);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
