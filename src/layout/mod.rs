/// Automatic layout presets
///
/// Each preset rewrites position/size/rotation/scale/z for the whole
/// collection in place, assigns z equal to iteration index, resets the
/// z frontier to `count - 1`, and resets the viewport. Presets that use
/// randomness take the RNG as a parameter so tests can seed it.

use std::cmp::Ordering;
use std::f32::consts::{FRAC_PI_2, TAU};

use iced::{Point, Size};
use rand::Rng;

use crate::scene::model::Scene;
use crate::scene::photo::PhotoId;
use crate::scene::viewport::Viewport;

/// Cell margin used by the grid preset
pub const GRID_MARGIN: f32 = 20.0;
/// Outer margin and row gap used by the compact preset
pub const COMPACT_PADDING: f32 = 10.0;
/// A compact row breaks once its remaining width drops below this
/// fraction of the base row size
pub const ROW_FIT_THRESHOLD: f32 = 0.5;

const CIRCLE_RADIUS_FACTOR: f32 = 0.3;
const CIRCLE_PHOTO_SCALE: f32 = 0.8;
const STACK_BASE_ROTATION: f32 = 0.2;
const STACK_ROTATION_JITTER: f32 = 0.15;
const STACK_POSITION_JITTER: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPreset {
    Grid,
    Stack,
    Circle,
    Random,
    Compact,
}

impl LayoutPreset {
    pub const ALL: [LayoutPreset; 5] = [
        LayoutPreset::Grid,
        LayoutPreset::Stack,
        LayoutPreset::Circle,
        LayoutPreset::Random,
        LayoutPreset::Compact,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LayoutPreset::Grid => "Grid",
            LayoutPreset::Stack => "Stack",
            LayoutPreset::Circle => "Circle",
            LayoutPreset::Random => "Random",
            LayoutPreset::Compact => "Compact",
        }
    }
}

/// Apply a preset to the whole scene and reset the viewport.
/// An empty scene is a no-op.
pub fn apply_layout(
    preset: LayoutPreset,
    scene: &mut Scene,
    viewport: &mut Viewport,
    area: Size,
    rng: &mut impl Rng,
) {
    if scene.is_empty() {
        return;
    }
    match preset {
        LayoutPreset::Grid => grid(scene, area),
        LayoutPreset::Stack => stack(scene, area, rng),
        LayoutPreset::Circle => circle(scene, area),
        LayoutPreset::Random => random(scene, area, rng),
        LayoutPreset::Compact => compact(scene, area),
    }
    scene.set_max_z(scene.len() as i32 - 1);
    viewport.reset();
}

/// `ceil(sqrt(n))` columns, enough rows to hold everything; each photo
/// fills its cell (minus margin) as large as its aspect ratio allows.
fn grid(scene: &mut Scene, area: Size) {
    let n = scene.len();
    let cols = (n as f32).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    let cell_w = area.width / cols as f32;
    let cell_h = area.height / rows as f32;

    for (i, photo) in scene.iter_mut().enumerate() {
        let col = (i % cols) as f32;
        let row = (i / cols) as f32;
        let avail_w = (cell_w - 2.0 * GRID_MARGIN).max(1.0);
        let avail_h = (cell_h - 2.0 * GRID_MARGIN).max(1.0);
        let fit = (avail_w / photo.size.width).min(avail_h / photo.size.height);
        let size = Size::new(photo.size.width * fit, photo.size.height * fit);
        photo.set_size(size);
        photo.position = Point::new(
            col * cell_w + (cell_w - size.width) / 2.0,
            row * cell_h + (cell_h - size.height) / 2.0,
        );
        photo.rotation = 0.0;
        photo.set_scale(1.0);
        photo.z = i as i32;
    }
}

/// Everything piled at the canvas center: one shared random base
/// rotation plus small per-photo rotation and position jitter.
fn stack(scene: &mut Scene, area: Size, rng: &mut impl Rng) {
    let center = Point::new(area.width / 2.0, area.height / 2.0);
    let base_rotation = rng.random_range(-STACK_BASE_ROTATION..=STACK_BASE_ROTATION);

    for (i, photo) in scene.iter_mut().enumerate() {
        let jx = rng.random_range(-STACK_POSITION_JITTER..=STACK_POSITION_JITTER);
        let jy = rng.random_range(-STACK_POSITION_JITTER..=STACK_POSITION_JITTER);
        photo.position = Point::new(
            center.x - photo.size.width / 2.0 + jx,
            center.y - photo.size.height / 2.0 + jy,
        );
        photo.rotation =
            base_rotation + rng.random_range(-STACK_ROTATION_JITTER..=STACK_ROTATION_JITTER);
        photo.set_scale(1.0);
        photo.z = i as i32;
    }
}

/// Photo `i` of `n` sits at angle `2πi/n` on a ring whose radius is 30%
/// of the smaller canvas dimension, rotated to face tangentially.
fn circle(scene: &mut Scene, area: Size) {
    let n = scene.len() as f32;
    let center = Point::new(area.width / 2.0, area.height / 2.0);
    let radius = area.width.min(area.height) * CIRCLE_RADIUS_FACTOR;

    for (i, photo) in scene.iter_mut().enumerate() {
        let angle = TAU * i as f32 / n;
        photo.position = Point::new(
            center.x + radius * angle.cos() - photo.size.width / 2.0,
            center.y + radius * angle.sin() - photo.size.height / 2.0,
        );
        photo.rotation = angle + FRAC_PI_2;
        photo.set_scale(CIRCLE_PHOTO_SCALE);
        photo.z = i as i32;
    }
}

/// Uniform scatter: position within bounds (adjusted for the photo
/// size), rotation in [-π/2, π/2], scale in [0.5, 1.5].
fn random(scene: &mut Scene, area: Size, rng: &mut impl Rng) {
    for (i, photo) in scene.iter_mut().enumerate() {
        let max_x = (area.width - photo.size.width).max(0.0);
        let max_y = (area.height - photo.size.height).max(0.0);
        photo.position = Point::new(
            rng.random_range(0.0..=max_x),
            rng.random_range(0.0..=max_y),
        );
        photo.rotation = rng.random_range(-FRAC_PI_2..=FRAC_PI_2);
        photo.set_scale(rng.random_range(0.5..=1.5));
        photo.z = i as i32;
    }
}

/// Greedy row packing. Targets an equal on-canvas area per photo,
/// derives a base row height from it, then fills rows by repeatedly
/// taking the unplaced photo whose natural width at the base height
/// best fills the remaining row width. A finished row is rescaled
/// uniformly so its widths sum exactly to the usable width. Best-fit
/// greedy, not optimal.
fn compact(scene: &mut Scene, area: Size) {
    let n = scene.len();
    let usable_w = (area.width - 2.0 * COMPACT_PADDING).max(1.0);
    let usable_h = (area.height - 2.0 * COMPACT_PADDING).max(1.0);
    let base = (usable_w * usable_h / n as f32).sqrt();

    // Natural width of each photo when scaled to the base row height
    let mut pending: Vec<(PhotoId, f32)> = scene
        .iter()
        .map(|p| (p.id, base * p.size.width / p.size.height))
        .collect();

    let mut y = COMPACT_PADDING;
    let mut order = 0;
    while !pending.is_empty() {
        let mut row: Vec<(PhotoId, f32)> = Vec::new();
        let mut remaining = usable_w;

        while remaining >= base * ROW_FIT_THRESHOLD {
            let best = pending
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    let da = (remaining - a.1).abs();
                    let db = (remaining - b.1).abs();
                    da.partial_cmp(&db).unwrap_or(Ordering::Equal)
                })
                .map(|(index, _)| index);
            let Some(best) = best else {
                break; // no photos left
            };
            let (id, width) = pending.remove(best);
            remaining -= width;
            row.push((id, width));
        }

        if row.is_empty() {
            break;
        }
        let total: f32 = row.iter().map(|(_, w)| w).sum();
        let factor = usable_w / total;
        let row_height = base * factor;
        let mut x = COMPACT_PADDING;
        for (id, natural) in row {
            let width = natural * factor;
            scene.with_photo(id, |photo| {
                photo.set_size(Size::new(width, row_height));
                photo.position = Point::new(x, y);
                photo.rotation = 0.0;
                photo.set_scale(1.0);
                photo.z = order;
            });
            order += 1;
            x += width;
        }
        y += row_height + COMPACT_PADDING;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::cache::ImageKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn scene_with(sizes: &[(f32, f32)]) -> Scene {
        let mut scene = Scene::new();
        for (i, &(w, h)) in sizes.iter().enumerate() {
            scene.add(
                ImageKey(i as u64),
                Point::new(1000.0 - i as f32 * 137.0, i as f32 * 59.0),
                Size::new(w, h),
                0.7,
            );
        }
        scene
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn grid_of_four_fills_quadrants() {
        let mut scene = scene_with(&[(200.0, 100.0); 4]);
        let mut viewport = Viewport::new();
        let area = Size::new(800.0, 800.0);
        apply_layout(LayoutPreset::Grid, &mut scene, &mut viewport, area, &mut rng());

        for (i, photo) in scene.iter().enumerate() {
            let col = (i % 2) as f32;
            let row = (i / 2) as f32;
            let cell_x = col * 400.0;
            let cell_y = row * 400.0;
            assert!(photo.position.x >= cell_x + GRID_MARGIN - 1e-3);
            assert!(photo.position.y >= cell_y + GRID_MARGIN - 1e-3);
            assert!(photo.position.x + photo.size.width <= cell_x + 400.0 - GRID_MARGIN + 1e-3);
            assert!(photo.position.y + photo.size.height <= cell_y + 400.0 - GRID_MARGIN + 1e-3);
            assert_eq!(photo.rotation, 0.0);
            assert_eq!(photo.scale, 1.0);
            assert_eq!(photo.z, i as i32);
        }
    }

    #[test]
    fn grid_preserves_aspect_ratio() {
        let mut scene = scene_with(&[(300.0, 100.0)]);
        let mut viewport = Viewport::new();
        apply_layout(
            LayoutPreset::Grid,
            &mut scene,
            &mut viewport,
            Size::new(600.0, 600.0),
            &mut rng(),
        );
        let photo = scene.iter().next().unwrap();
        assert!((photo.size.width / photo.size.height - 3.0).abs() < 1e-3);
    }

    #[test]
    fn stack_piles_photos_around_the_center() {
        let mut scene = scene_with(&[(200.0, 100.0); 5]);
        let mut viewport = Viewport::new();
        let area = Size::new(1000.0, 800.0);
        apply_layout(LayoutPreset::Stack, &mut scene, &mut viewport, area, &mut rng());

        for photo in scene.iter() {
            let center = photo.center();
            assert!((center.x - 500.0).abs() <= STACK_POSITION_JITTER + 1e-3);
            assert!((center.y - 400.0).abs() <= STACK_POSITION_JITTER + 1e-3);
            assert!(photo.rotation.abs() <= STACK_BASE_ROTATION + STACK_ROTATION_JITTER + 1e-3);
        }
    }

    #[test]
    fn circle_places_centers_on_the_ring() {
        let count = 6;
        let mut scene = scene_with(&vec![(120.0, 80.0); count]);
        let mut viewport = Viewport::new();
        let area = Size::new(1000.0, 600.0);
        apply_layout(LayoutPreset::Circle, &mut scene, &mut viewport, area, &mut rng());

        let radius = 600.0 * CIRCLE_RADIUS_FACTOR;
        for (i, photo) in scene.iter().enumerate() {
            let angle = TAU * i as f32 / count as f32;
            let center = photo.center();
            let dx = center.x - 500.0;
            let dy = center.y - 300.0;
            assert!(((dx * dx + dy * dy).sqrt() - radius).abs() < 1e-2);
            assert!((photo.rotation - (angle + FRAC_PI_2)).abs() < 1e-5);
            assert_eq!(photo.scale, CIRCLE_PHOTO_SCALE);
        }
    }

    #[test]
    fn random_scatters_within_bounds() {
        let mut scene = scene_with(&[(150.0, 100.0); 8]);
        let mut viewport = Viewport::new();
        let area = Size::new(900.0, 700.0);
        apply_layout(LayoutPreset::Random, &mut scene, &mut viewport, area, &mut rng());

        for photo in scene.iter() {
            assert!(photo.position.x >= 0.0);
            assert!(photo.position.y >= 0.0);
            assert!(photo.position.x + photo.size.width <= area.width + 1e-3);
            assert!(photo.position.y + photo.size.height <= area.height + 1e-3);
            assert!(photo.rotation >= -FRAC_PI_2 && photo.rotation <= FRAC_PI_2);
            assert!(photo.scale >= 0.5 && photo.scale <= 1.5);
        }
    }

    #[test]
    fn compact_rows_fill_the_usable_width() {
        let mut scene = scene_with(&[
            (300.0, 200.0),
            (200.0, 200.0),
            (400.0, 300.0),
            (160.0, 90.0),
            (90.0, 160.0),
            (250.0, 250.0),
            (320.0, 180.0),
        ]);
        let mut viewport = Viewport::new();
        let area = Size::new(820.0, 620.0);
        apply_layout(LayoutPreset::Compact, &mut scene, &mut viewport, area, &mut rng());

        let usable_w = area.width - 2.0 * COMPACT_PADDING;

        // Photos sharing a y coordinate form a row
        let mut rows: BTreeMap<i64, f32> = BTreeMap::new();
        for photo in scene.iter() {
            assert_eq!(photo.rotation, 0.0);
            assert_eq!(photo.scale, 1.0);
            *rows.entry((photo.position.y * 1000.0).round() as i64).or_default() +=
                photo.size.width;
        }
        assert!(!rows.is_empty());
        for (_, width_sum) in rows {
            assert!(
                (width_sum - usable_w).abs() < 1e-2,
                "row width {width_sum} != {usable_w}"
            );
        }
    }

    #[test]
    fn compact_preserves_aspect_ratios() {
        let mut scene = scene_with(&[(300.0, 100.0), (100.0, 300.0), (200.0, 200.0)]);
        let mut viewport = Viewport::new();
        apply_layout(
            LayoutPreset::Compact,
            &mut scene,
            &mut viewport,
            Size::new(800.0, 600.0),
            &mut rng(),
        );
        let aspects: Vec<f32> = scene.iter().map(|p| p.size.width / p.size.height).collect();
        let expected = [3.0, 1.0 / 3.0, 1.0];
        for (got, want) in aspects.iter().zip(expected) {
            assert!((got - want).abs() < 1e-3);
        }
    }

    #[test]
    fn compact_greedy_picks_the_best_filling_candidate() {
        // Base = sqrt(800*800/2) ≈ 565.7. Natural widths: 2:1 photo →
        // 1131.4 (wider than the row), 1:2 photo → 282.8. The first pick
        // minimizes |remaining - width|: |800 - 1131.4| = 331.4 beats
        // |800 - 282.8| = 517.2, so the wide photo is placed first.
        let mut scene = scene_with(&[(200.0, 400.0), (400.0, 200.0)]);
        let mut viewport = Viewport::new();
        apply_layout(
            LayoutPreset::Compact,
            &mut scene,
            &mut viewport,
            Size::new(820.0, 820.0),
            &mut rng(),
        );
        let wide = scene.iter().find(|p| p.size.width > p.size.height).unwrap();
        assert_eq!(wide.z, 0);
    }

    #[test]
    fn layouts_reset_viewport_and_z_frontier() {
        let mut scene = scene_with(&[(200.0, 100.0); 3]);
        let mut viewport = Viewport::new();
        viewport.pan_by(120.0, -40.0);
        viewport.zoom_at(Point::ORIGIN, 2.5);

        apply_layout(
            LayoutPreset::Grid,
            &mut scene,
            &mut viewport,
            Size::new(800.0, 800.0),
            &mut rng(),
        );

        assert_eq!(viewport, Viewport::new());
        assert_eq!(scene.max_z(), 2);

        // A subsequent bring-to-front continues from the new frontier
        let id = scene.iter().next().unwrap().id;
        scene.bring_to_front(id);
        assert_eq!(scene.photo(id).unwrap().z, 3);
    }

    #[test]
    fn empty_scene_is_a_noop() {
        let mut scene = Scene::new();
        let mut viewport = Viewport::new();
        viewport.pan_by(5.0, 5.0);
        apply_layout(
            LayoutPreset::Compact,
            &mut scene,
            &mut viewport,
            Size::new(800.0, 600.0),
            &mut rng(),
        );
        // Viewport untouched because nothing was laid out
        assert_eq!(viewport.pan, iced::Vector::new(5.0, 5.0));
    }
}
