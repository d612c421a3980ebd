/// Gesture state machine
///
/// Interprets pointer, touch, and wheel input into scene or viewport
/// mutations. The session state is a tagged variant, so impossible
/// combinations (dragging while panning, say) cannot be represented.
///
/// The UI layer feeds in `InputEvent`s; touch events always carry the
/// full list of active contact points, which is what drives the
/// one-contact vs two-contact transitions. The session is ephemeral: it
/// resets to `Idle` whenever the contact count reaches zero. Only the
/// last tap instant survives a reset, because double-tap detection
/// necessarily spans two contact sequences.

use std::time::{Duration, Instant};

use iced::Point;

use crate::scene::hit;
use crate::scene::model::Scene;
use crate::scene::photo::PhotoId;
use crate::scene::viewport::Viewport;

/// Two single-contact presses within this window count as a double tap
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);

/// Engine-level input vocabulary, decoupled from any toolkit event type
#[derive(Debug, Clone)]
pub enum InputEvent {
    PointerPressed(Point),
    PointerMoved(Point),
    PointerReleased,
    /// `direction` carries only the scroll sign; magnitude is ignored
    Wheel { position: Point, direction: f32 },
    /// All active contact points after a new finger landed
    TouchStart(Vec<Point>),
    /// All active contact points at their current positions
    TouchMove(Vec<Point>),
    /// The contact points that remain after a finger lifted
    TouchEnd(Vec<Point>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    DraggingPhoto { target: PhotoId },
    PanningViewport,
    ZoomingPhoto { target: PhotoId, last_distance: f32 },
    ZoomingViewport { last_distance: f32 },
}

#[derive(Debug)]
pub struct GestureSession {
    state: GestureState,
    last_position: Point,
    last_tap: Option<Instant>,
    hovered: Option<PhotoId>,
}

impl Default for GestureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureSession {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            last_position: Point::ORIGIN,
            last_tap: None,
            hovered: None,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// The photo currently under an idle pointer, if any
    pub fn hovered(&self) -> Option<PhotoId> {
        self.hovered
    }

    /// Screen-space center of the hovered photo's bounding box, for the
    /// controls overlay. Recomputed from the authoritative element on
    /// every call; never cached.
    pub fn hovered_center(&self, scene: &Scene, viewport: &Viewport) -> Option<Point> {
        let photo = scene.photo(self.hovered?)?;
        Some(viewport.to_screen(photo.center()))
    }

    /// Feed one input event through the state machine, mutating the
    /// scene and/or viewport as the active gesture dictates.
    pub fn handle(
        &mut self,
        event: InputEvent,
        scene: &mut Scene,
        viewport: &mut Viewport,
        send_back: bool,
        now: Instant,
    ) {
        match event {
            InputEvent::PointerPressed(position) => {
                self.press(position, scene, viewport, send_back, now);
            }
            InputEvent::PointerMoved(position) => {
                self.moved(position, scene, viewport);
            }
            InputEvent::PointerReleased => self.release_all(),
            InputEvent::Wheel { position, direction } => {
                viewport.wheel_zoom(position, direction);
            }
            InputEvent::TouchStart(points) => {
                self.touch_start(&points, scene, viewport, send_back, now);
            }
            InputEvent::TouchMove(points) => {
                self.touch_move(&points, scene, viewport);
            }
            InputEvent::TouchEnd(points) => self.touch_end(&points),
        }
    }

    fn press(
        &mut self,
        position: Point,
        scene: &mut Scene,
        viewport: &Viewport,
        send_back: bool,
        now: Instant,
    ) {
        // Double-press promotes z-order as a side effect, independent of
        // whatever gesture starts below.
        if let Some(previous) = self.last_tap {
            if now.duration_since(previous) < DOUBLE_TAP_WINDOW {
                if let Some(id) = hit::pick(scene, viewport, position) {
                    scene.bring_to_front(id);
                }
            }
        }
        self.last_tap = Some(now);
        self.last_position = position;
        self.hovered = None;

        self.state = match hit::pick(scene, viewport, position) {
            Some(id) if send_back => {
                scene.send_to_back(id);
                GestureState::Idle
            }
            // Drag does not promote z-order; only the double press does
            Some(id) => GestureState::DraggingPhoto { target: id },
            None => GestureState::PanningViewport,
        };
    }

    fn moved(&mut self, position: Point, scene: &mut Scene, viewport: &mut Viewport) {
        let dx = position.x - self.last_position.x;
        let dy = position.y - self.last_position.y;
        match self.state {
            GestureState::DraggingPhoto { target } => {
                // Screen delta divided by viewport scale keeps drag
                // tracking 1:1 at any zoom level
                let scale = viewport.scale;
                scene.with_photo(target, |photo| {
                    photo.position.x += dx / scale;
                    photo.position.y += dy / scale;
                });
                self.last_position = position;
            }
            GestureState::PanningViewport => {
                // Pan is itself screen space, no scale division
                viewport.pan_by(dx, dy);
                self.last_position = position;
            }
            GestureState::Idle => {
                self.hovered = hit::pick(scene, viewport, position);
            }
            // Two-contact states ignore stray single-pointer moves
            GestureState::ZoomingPhoto { .. } | GestureState::ZoomingViewport { .. } => {}
        }
    }

    fn release_all(&mut self) {
        self.state = GestureState::Idle;
        self.hovered = None;
    }

    fn touch_start(
        &mut self,
        points: &[Point],
        scene: &mut Scene,
        viewport: &mut Viewport,
        send_back: bool,
        now: Instant,
    ) {
        match points {
            [] => {}
            [point] => self.press(*point, scene, viewport, send_back, now),
            [a, b, ..] => {
                let mid = midpoint(*a, *b);
                let last_distance = distance(*a, *b);
                self.hovered = None;
                self.state = match hit::pick(scene, viewport, mid) {
                    Some(target) => GestureState::ZoomingPhoto {
                        target,
                        last_distance,
                    },
                    None => GestureState::ZoomingViewport { last_distance },
                };
            }
        }
    }

    fn touch_move(&mut self, points: &[Point], scene: &mut Scene, viewport: &mut Viewport) {
        match points {
            [] => {}
            [point] => self.moved(*point, scene, viewport),
            [a, b, ..] => {
                let current = distance(*a, *b);
                match &mut self.state {
                    GestureState::ZoomingPhoto {
                        target,
                        last_distance,
                    } => {
                        let ratio = scale_ratio(current, *last_distance);
                        let target = *target;
                        *last_distance = current;
                        scene.with_photo(target, |photo| {
                            let scale = photo.scale;
                            photo.set_scale(scale * ratio);
                        });
                    }
                    GestureState::ZoomingViewport { last_distance } => {
                        let ratio = scale_ratio(current, *last_distance);
                        *last_distance = current;
                        let mid = midpoint(*a, *b);
                        let target = viewport.scale * ratio;
                        viewport.zoom_at(mid, target);
                    }
                    // A second finger the tracker never saw land; ignore
                    _ => {}
                }
            }
        }
    }

    fn touch_end(&mut self, remaining: &[Point]) {
        match remaining {
            [] => self.release_all(),
            [point] => {
                // Degrade a two-contact state to the matching one-contact
                // state; the survivor becomes the new reference point so
                // nothing jumps.
                self.last_position = *point;
                self.state = match self.state {
                    GestureState::ZoomingPhoto { target, .. } => {
                        GestureState::DraggingPhoto { target }
                    }
                    GestureState::ZoomingViewport { .. } => GestureState::PanningViewport,
                    other => other,
                };
            }
            _ => {}
        }
    }
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

fn distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Multiplicative pinch factor. A degenerate pinch (zero previous
/// distance) contributes no scaling for that frame.
fn scale_ratio(current: f32, previous: f32) -> f32 {
    if previous <= f32::EPSILON {
        1.0
    } else {
        current / previous
    }
}
