/// Screen-point to photo resolution
///
/// Converts the screen point to scene space through the inverse viewport
/// transform, then returns the highest-z photo whose unrotated bounding
/// box contains it. Ties cannot occur because z values are unique.

use iced::Point;

use super::model::Scene;
use super::photo::PhotoId;
use super::viewport::Viewport;

/// Resolve a screen point to the topmost photo under it, if any.
pub fn pick(scene: &Scene, viewport: &Viewport, screen: Point) -> Option<PhotoId> {
    let point = viewport.to_scene(screen);
    scene
        .iter()
        .filter(|photo| photo.contains(point))
        .max_by_key(|photo| photo.z)
        .map(|photo| photo.id)
}
