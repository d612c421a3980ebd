/// The scene model: the owning, ordered collection of photo elements
///
/// The scene is the single owner of every `PhotoElement`. Mutation of an
/// individual element goes through `with_photo`, which applies a closure
/// to the authoritative element instead of handing out long-lived `&mut`
/// references. Z-order values stay pairwise distinct across every
/// operation here; ordering is a strict total order (draw lowest first).
///
/// All per-element operations are O(n). The collection is user-managed
/// photos, tens at most, so linear scans are fine.

use iced::{Point, Size};

use super::photo::{PhotoElement, PhotoId};
use crate::images::cache::ImageKey;

#[derive(Debug, Clone, Default)]
pub struct Scene {
    photos: Vec<PhotoElement>,
    max_z: i32,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new photo on top of everything else.
    /// The id is allocated from a monotonic counter and never reused.
    pub fn add(
        &mut self,
        image: ImageKey,
        position: Point,
        size: Size,
        rotation: f32,
    ) -> PhotoId {
        self.next_id += 1;
        self.max_z += 1;
        let id = PhotoId(self.next_id);
        let mut photo = PhotoElement {
            id,
            image,
            position,
            size,
            scale: 1.0,
            rotation,
            z: self.max_z,
        };
        photo.set_size(size);
        self.photos.push(photo);
        id
    }

    /// Remove a photo, returning its image key so the caller can release
    /// the underlying raster.
    pub fn remove(&mut self, id: PhotoId) -> Option<ImageKey> {
        let index = self.photos.iter().position(|p| p.id == id)?;
        Some(self.photos.remove(index).image)
    }

    /// Drain every photo, returning all image keys for release.
    pub fn reset(&mut self) -> Vec<ImageKey> {
        self.max_z = 0;
        self.photos.drain(..).map(|p| p.image).collect()
    }

    pub fn photo(&self, id: PhotoId) -> Option<&PhotoElement> {
        self.photos.iter().find(|p| p.id == id)
    }

    /// Mutate a photo in place. Returns `None` (and applies nothing) if
    /// the id is no longer in the collection.
    pub fn with_photo<R>(
        &mut self,
        id: PhotoId,
        f: impl FnOnce(&mut PhotoElement) -> R,
    ) -> Option<R> {
        self.photos.iter_mut().find(|p| p.id == id).map(f)
    }

    /// Unordered iteration, used for hit-test candidates
    pub fn iter(&self) -> impl Iterator<Item = &PhotoElement> {
        self.photos.iter()
    }

    /// Mutable iteration in insertion order, used by the layout engine
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PhotoElement> {
        self.photos.iter_mut()
    }

    /// Photos sorted by ascending z, the draw order
    pub fn ordered(&self) -> Vec<&PhotoElement> {
        let mut photos: Vec<&PhotoElement> = self.photos.iter().collect();
        photos.sort_by_key(|p| p.z);
        photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn max_z(&self) -> i32 {
        self.max_z
    }

    /// Reset the z frontier after a bulk layout renumbered everything
    pub fn set_max_z(&mut self, z: i32) {
        self.max_z = z;
    }

    /// Move a photo above everything else by advancing the z frontier.
    /// Calling this on the topmost photo changes no relative ordering.
    pub fn bring_to_front(&mut self, id: PhotoId) {
        let Some(photo) = self.photos.iter_mut().find(|p| p.id == id) else {
            return;
        };
        self.max_z += 1;
        photo.z = self.max_z;
    }

    /// Move a photo below everything else. Every photo that was under it
    /// shifts up by one, which keeps the bottom dense without colliding
    /// values.
    pub fn send_to_back(&mut self, id: PhotoId) {
        let Some(old_z) = self.photo(id).map(|p| p.z) else {
            return;
        };
        for photo in &mut self.photos {
            if photo.id == id {
                photo.z = 0;
            } else if photo.z < old_z {
                photo.z += 1;
            }
        }
    }

    /// Swap z with the photo holding the next-higher z. A true adjacency
    /// swap, so `step_backward` undoes it.
    pub fn step_forward(&mut self, id: PhotoId) {
        let Some(z) = self.photo(id).map(|p| p.z) else {
            return;
        };
        let neighbor = self
            .photos
            .iter()
            .filter(|p| p.z > z)
            .min_by_key(|p| p.z)
            .map(|p| p.id);
        if let Some(other) = neighbor {
            self.swap_z(id, other);
        }
    }

    /// Swap z with the photo holding the next-lower z
    pub fn step_backward(&mut self, id: PhotoId) {
        let Some(z) = self.photo(id).map(|p| p.z) else {
            return;
        };
        let neighbor = self
            .photos
            .iter()
            .filter(|p| p.z < z)
            .max_by_key(|p| p.z)
            .map(|p| p.id);
        if let Some(other) = neighbor {
            self.swap_z(id, other);
        }
    }

    fn swap_z(&mut self, a: PhotoId, b: PhotoId) {
        let Some(ia) = self.photos.iter().position(|p| p.id == a) else {
            return;
        };
        let Some(ib) = self.photos.iter().position(|p| p.id == b) else {
            return;
        };
        let za = self.photos[ia].z;
        self.photos[ia].z = self.photos[ib].z;
        self.photos[ib].z = za;
    }
}
