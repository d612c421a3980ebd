/// Scene engine module
///
/// Everything that describes *what* is on the canvas and *where*:
/// - Photo elements and their identities (photo.rs)
/// - The owning collection with its z-order operations (model.rs)
/// - The global pan/zoom transform (viewport.rs)
/// - Screen-point to photo resolution (hit.rs)

pub mod hit;
pub mod model;
pub mod photo;
pub mod viewport;
