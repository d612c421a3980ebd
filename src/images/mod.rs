/// Image resources
///
/// - Asynchronous decode of image files into RGBA rasters (loader.rs)
/// - The owning cache mapping opaque keys to decoded rasters (cache.rs)

pub mod cache;
pub mod loader;
