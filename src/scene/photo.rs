/// A single photo element on the collage canvas
///
/// A `PhotoElement` does not own its raster. It holds an `ImageKey` into
/// the image cache; the scene releases that key when the element is
/// removed. All coordinates here are scene space: they are unaffected by
/// the viewport's pan and zoom.

use iced::{Point, Size};

use crate::images::cache::ImageKey;

/// Per-photo zoom clamp (shared with the viewport scale clamp)
pub const MIN_PHOTO_SCALE: f32 = 0.1;
pub const MAX_PHOTO_SCALE: f32 = 5.0;

/// Width assigned to a freshly inserted photo; height follows the
/// source aspect ratio.
pub const DEFAULT_PHOTO_WIDTH: f32 = 200.0;

/// Smallest allowed width/height in scene units
const MIN_DIMENSION: f32 = 1.0;

/// Stable identity of a photo element. Allocated from a monotonic
/// counter owned by the scene; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhotoId(pub(crate) u64);

#[derive(Debug, Clone, PartialEq)]
pub struct PhotoElement {
    pub id: PhotoId,
    /// Key into the image cache, not the raster itself
    pub image: ImageKey,
    /// Top-left corner, scene space
    pub position: Point,
    /// Scene-space size, independent of any zoom
    pub size: Size,
    /// Local zoom factor, clamped to [0.1, 5]
    pub scale: f32,
    /// Radians, applied about the photo's own center
    pub rotation: f32,
    /// Unique across the collection; draw lowest first
    pub z: i32,
}

impl PhotoElement {
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    /// Unrotated axis-aligned bounds test against a scene-space point.
    /// Rotation and local scale are intentionally ignored here.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x + self.size.width
            && point.y >= self.position.y
            && point.y <= self.position.y + self.size.height
    }

    /// Set the local zoom, clamping into [0.1, 5]
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.clamp(MIN_PHOTO_SCALE, MAX_PHOTO_SCALE);
    }

    /// Set the scene-space size, clamping both dimensions positive
    pub fn set_size(&mut self, size: Size) {
        self.size = Size::new(
            size.width.max(MIN_DIMENSION),
            size.height.max(MIN_DIMENSION),
        );
    }
}
