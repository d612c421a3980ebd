/// The image resource cache
///
/// Owns every decoded raster and maps opaque keys to them. Each key is
/// owned by exactly one photo element; the scene releases the key when
/// the element goes away. A missing entry for a referenced key is not
/// an error anywhere: the renderer simply skips that photo for the
/// frame (tolerates in-flight loads), and releasing an absent key is a
/// no-op.

use std::collections::HashMap;
use std::sync::Arc;

use iced::widget::image::Handle;

use super::loader::DecodedImage;

/// Opaque key into the cache. Allocated from a monotonic counter and
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageKey(pub(crate) u64);

/// A decoded raster held by the cache
#[derive(Debug, Clone)]
pub struct CachedImage {
    /// GPU-side handle for the canvas renderer
    pub handle: Handle,
    /// Natural pixel dimensions
    pub width: u32,
    pub height: u32,
    /// CPU-side RGBA8 copy, kept for the export compositor
    pub rgba: Arc<Vec<u8>>,
}

#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    entries: HashMap<ImageKey, CachedImage>,
    next_key: u64,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a decoded raster and return its key.
    pub fn insert(&mut self, decoded: DecodedImage) -> ImageKey {
        self.next_key += 1;
        let key = ImageKey(self.next_key);
        let handle = Handle::from_rgba(decoded.width, decoded.height, decoded.rgba.clone());
        self.entries.insert(
            key,
            CachedImage {
                handle,
                width: decoded.width,
                height: decoded.height,
                rgba: Arc::new(decoded.rgba),
            },
        );
        key
    }

    pub fn get(&self, key: ImageKey) -> Option<&CachedImage> {
        self.entries.get(&key)
    }

    /// Drop the raster behind a key. Releasing a key that was already
    /// released (or never existed) does nothing.
    pub fn release(&mut self, key: ImageKey) {
        self.entries.remove(&key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(width: u32, height: u32) -> DecodedImage {
        DecodedImage {
            name: "fixture".into(),
            width,
            height,
            rgba: vec![255; (width * height * 4) as usize],
        }
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut cache = ImageCache::new();
        let key = cache.insert(decoded(4, 2));
        let entry = cache.get(key).expect("entry exists");
        assert_eq!(entry.width, 4);
        assert_eq!(entry.height, 2);
        assert_eq!(entry.rgba.len(), 32);
    }

    #[test]
    fn keys_are_never_reused() {
        let mut cache = ImageCache::new();
        let a = cache.insert(decoded(1, 1));
        cache.release(a);
        let b = cache.insert(decoded(1, 1));
        assert_ne!(a, b);
        assert!(cache.get(a).is_none());
    }

    #[test]
    fn release_drops_the_entry() {
        let mut cache = ImageCache::new();
        let key = cache.insert(decoded(2, 2));
        cache.release(key);
        assert!(cache.get(key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn double_release_is_a_noop() {
        let mut cache = ImageCache::new();
        let key = cache.insert(decoded(2, 2));
        cache.release(key);
        cache.release(key);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn missing_key_is_skippable_not_fatal() {
        let cache = ImageCache::new();
        assert!(cache.get(ImageKey(99)).is_none());
    }
}
