/// Collage export
///
/// A small software compositor that rasterizes the current view into a
/// PNG. It walks photos in draw order and, for each output pixel inside
/// a photo's transformed bounds, maps the pixel back through the
/// inverse viewport and photo transforms to sample the cached raster
/// (nearest neighbor, source-over onto a white background). Runs on a
/// blocking worker; the caller hands in cheap clones of the scene,
/// viewport, and cache.

use std::path::PathBuf;

use iced::{Point, Size};
use image::{ImageFormat, Rgba, RgbaImage};
use tokio::task;

use crate::error::ExportError;
use crate::images::cache::{CachedImage, ImageCache};
use crate::scene::model::Scene;
use crate::scene::photo::PhotoElement;
use crate::scene::viewport::Viewport;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Rasterize the scene exactly as the canvas renderer draws it.
/// Photos whose raster is not in the cache are skipped, not errors.
pub fn rasterize(scene: &Scene, viewport: &Viewport, cache: &ImageCache, size: Size) -> RgbaImage {
    let width = size.width.round().max(1.0) as u32;
    let height = size.height.round().max(1.0) as u32;
    let mut output = RgbaImage::from_pixel(width, height, BACKGROUND);

    for photo in scene.ordered() {
        let Some(raster) = cache.get(photo.image) else {
            continue; // still decoding
        };
        composite_photo(&mut output, photo, raster, viewport);
    }

    output
}

/// Rasterize and write a PNG, off the UI thread.
pub async fn save_png(
    scene: Scene,
    viewport: Viewport,
    cache: ImageCache,
    size: Size,
    path: PathBuf,
) -> Result<PathBuf, ExportError> {
    task::spawn_blocking(move || {
        let collage = rasterize(&scene, &viewport, &cache, size);
        collage.save_with_format(&path, ImageFormat::Png)?;
        Ok(path)
    })
    .await
    .map_err(|e| ExportError::TaskJoin(e.to_string()))?
}

fn composite_photo(
    output: &mut RgbaImage,
    photo: &PhotoElement,
    raster: &CachedImage,
    viewport: &Viewport,
) {
    let center = photo.center();
    let (sin, cos) = photo.rotation.sin_cos();

    // Screen-space bounding box of the rotated, scaled photo
    let half_w = photo.size.width / 2.0 * photo.scale;
    let half_h = photo.size.height / 2.0 * photo.scale;
    let extent_x = (half_w * cos.abs() + half_h * sin.abs()) * viewport.scale;
    let extent_y = (half_w * sin.abs() + half_h * cos.abs()) * viewport.scale;
    let screen_center = viewport.to_screen(center);

    let x0 = ((screen_center.x - extent_x).floor().max(0.0)) as u32;
    let y0 = ((screen_center.y - extent_y).floor().max(0.0)) as u32;
    let x1 = ((screen_center.x + extent_x).ceil().min(output.width() as f32)) as u32;
    let y1 = ((screen_center.y + extent_y).ceil().min(output.height() as f32)) as u32;

    for py in y0..y1 {
        for px in x0..x1 {
            let scene_point =
                viewport.to_scene(Point::new(px as f32 + 0.5, py as f32 + 0.5));

            // Undo the rotation about the center, then the local scale
            let vx = scene_point.x - center.x;
            let vy = scene_point.y - center.y;
            let lx = (vx * cos + vy * sin) / photo.scale;
            let ly = (-vx * sin + vy * cos) / photo.scale;

            let fx = (lx + photo.size.width / 2.0) / photo.size.width;
            let fy = (ly + photo.size.height / 2.0) / photo.size.height;
            if !(0.0..1.0).contains(&fx) || !(0.0..1.0).contains(&fy) {
                continue;
            }

            let sx = ((fx * raster.width as f32) as u32).min(raster.width - 1);
            let sy = ((fy * raster.height as f32) as u32).min(raster.height - 1);
            let index = ((sy * raster.width + sx) * 4) as usize;
            let source = &raster.rgba[index..index + 4];

            let alpha = source[3] as f32 / 255.0;
            let pixel = output.get_pixel_mut(px, py);
            for channel in 0..3 {
                pixel[channel] = (source[channel] as f32 * alpha
                    + pixel[channel] as f32 * (1.0 - alpha))
                    .round() as u8;
            }
            pixel[3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::cache::ImageKey;
    use crate::images::loader::DecodedImage;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> DecodedImage {
        DecodedImage {
            name: "solid".into(),
            width,
            height,
            rgba: color
                .iter()
                .copied()
                .cycle()
                .take((width * height * 4) as usize)
                .collect(),
        }
    }

    #[test]
    fn photo_pixels_land_inside_its_bounds() {
        let mut cache = ImageCache::new();
        let key = cache.insert(solid(2, 2, [200, 0, 0, 255]));
        let mut scene = Scene::new();
        scene.add(key, Point::new(10.0, 10.0), Size::new(20.0, 20.0), 0.0);

        let output = rasterize(&scene, &Viewport::new(), &cache, Size::new(100.0, 100.0));

        assert_eq!(*output.get_pixel(20, 20), Rgba([200, 0, 0, 255]));
        assert_eq!(*output.get_pixel(5, 5), BACKGROUND);
        assert_eq!(*output.get_pixel(50, 50), BACKGROUND);
    }

    #[test]
    fn rotation_moves_the_sampled_region() {
        let mut cache = ImageCache::new();
        let key = cache.insert(solid(2, 2, [0, 180, 0, 255]));
        let mut scene = Scene::new();
        let id = scene.add(key, Point::new(40.0, 45.0), Size::new(20.0, 10.0), 0.0);
        scene.with_photo(id, |p| p.rotation = std::f32::consts::FRAC_PI_2);

        let output = rasterize(&scene, &Viewport::new(), &cache, Size::new(100.0, 100.0));

        // Center stays covered; the unrotated far-right edge does not
        assert_eq!(*output.get_pixel(50, 50), Rgba([0, 180, 0, 255]));
        assert_eq!(*output.get_pixel(58, 50), BACKGROUND);
        // The rotated rect now extends vertically past the old bounds
        assert_eq!(*output.get_pixel(50, 58), Rgba([0, 180, 0, 255]));
    }

    #[test]
    fn viewport_transform_applies_to_the_export() {
        let mut cache = ImageCache::new();
        let key = cache.insert(solid(2, 2, [0, 0, 150, 255]));
        let mut scene = Scene::new();
        scene.add(key, Point::new(0.0, 0.0), Size::new(10.0, 10.0), 0.0);

        let mut viewport = Viewport::new();
        viewport.zoom_at(Point::ORIGIN, 2.0);
        viewport.pan_by(30.0, 30.0);

        let output = rasterize(&scene, &viewport, &cache, Size::new(100.0, 100.0));
        assert_eq!(*output.get_pixel(40, 40), Rgba([0, 0, 150, 255]));
        assert_eq!(*output.get_pixel(10, 10), BACKGROUND);
    }

    #[test]
    fn missing_cache_entry_is_skipped() {
        let cache = ImageCache::new();
        let mut scene = Scene::new();
        scene.add(
            ImageKey(42),
            Point::new(10.0, 10.0),
            Size::new(20.0, 20.0),
            0.0,
        );
        let output = rasterize(&scene, &Viewport::new(), &cache, Size::new(50.0, 50.0));
        assert_eq!(*output.get_pixel(20, 20), BACKGROUND);
    }

    #[test]
    fn higher_z_draws_on_top() {
        let mut cache = ImageCache::new();
        let red = cache.insert(solid(1, 1, [255, 0, 0, 255]));
        let blue = cache.insert(solid(1, 1, [0, 0, 255, 255]));
        let mut scene = Scene::new();
        let bottom = scene.add(red, Point::new(10.0, 10.0), Size::new(20.0, 20.0), 0.0);
        scene.add(blue, Point::new(10.0, 10.0), Size::new(20.0, 20.0), 0.0);

        let output = rasterize(&scene, &Viewport::new(), &cache, Size::new(50.0, 50.0));
        assert_eq!(*output.get_pixel(20, 20), Rgba([0, 0, 255, 255]));

        // After promoting the bottom photo, it wins instead
        let mut scene2 = scene.clone();
        scene2.bring_to_front(bottom);
        let output2 = rasterize(&scene2, &Viewport::new(), &cache, Size::new(50.0, 50.0));
        assert_eq!(*output2.get_pixel(20, 20), Rgba([255, 0, 0, 255]));
    }
}
