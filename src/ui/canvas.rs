/// The collage canvas widget
///
/// A `canvas::Program` with two jobs:
/// - `update` translates raw mouse/touch/wheel events into engine
///   `InputEvent`s and emits them as messages. Touch is delivered by the
///   toolkit one finger at a time, so the program state tracks the
///   active fingers and always reports the full contact list.
/// - `draw` is the renderer: viewport transform once, then per photo
///   translate-rotate-scale-draw, lowest z first. Photos whose raster
///   is still decoding are skipped.

use iced::mouse::{self, Cursor};
use iced::touch;
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Theme, Vector};

use crate::gesture::InputEvent;
use crate::images::cache::ImageCache;
use crate::scene::model::Scene;
use crate::scene::photo::PhotoId;
use crate::scene::viewport::Viewport;
use crate::Message;

const CANVAS_BACKGROUND: Color = Color::from_rgb(0.13, 0.13, 0.15);
const HOVER_OUTLINE: Color = Color::from_rgb(0.35, 0.65, 0.95);

pub struct CollageCanvas<'a> {
    pub scene: &'a Scene,
    pub viewport: &'a Viewport,
    pub images: &'a ImageCache,
    pub hovered: Option<PhotoId>,
    /// Screen-space center of the hovered photo, for the drag handle
    pub hovered_center: Option<Point>,
    pub dragging: bool,
    pub cache: &'a canvas::Cache,
}

/// Active touch contacts, in the order they landed
#[derive(Debug, Default)]
pub struct FingerTracker {
    fingers: Vec<(touch::Finger, Point)>,
}

impl FingerTracker {
    fn press(&mut self, id: touch::Finger, position: Point) {
        if let Some(entry) = self.fingers.iter_mut().find(|(f, _)| *f == id) {
            entry.1 = position;
        } else {
            self.fingers.push((id, position));
        }
    }

    fn moved(&mut self, id: touch::Finger, position: Point) {
        if let Some(entry) = self.fingers.iter_mut().find(|(f, _)| *f == id) {
            entry.1 = position;
        }
    }

    fn lift(&mut self, id: touch::Finger) {
        self.fingers.retain(|(f, _)| *f != id);
    }

    fn points(&self) -> Vec<Point> {
        self.fingers.iter().map(|(_, p)| *p).collect()
    }
}

impl Program<Message> for CollageCanvas<'_> {
    type State = FingerTracker;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let Some(position) = cursor.position_in(bounds) else {
                    return (canvas::event::Status::Ignored, None);
                };
                let y = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y,
                    mouse::ScrollDelta::Pixels { y, .. } => y,
                };
                if y == 0.0 {
                    return (canvas::event::Status::Ignored, None);
                }
                (
                    canvas::event::Status::Captured,
                    Some(Message::Canvas(InputEvent::Wheel {
                        position,
                        direction: y.signum(),
                    })),
                )
            }

            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                match cursor.position_in(bounds) {
                    Some(position) => (
                        canvas::event::Status::Captured,
                        Some(Message::Canvas(InputEvent::PointerPressed(position))),
                    ),
                    None => (canvas::event::Status::Ignored, None),
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                match cursor.position_in(bounds) {
                    Some(position) => (
                        canvas::event::Status::Captured,
                        Some(Message::Canvas(InputEvent::PointerMoved(position))),
                    ),
                    None => (canvas::event::Status::Ignored, None),
                }
            }

            // Release ends the gesture even if the cursor left the canvas
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => (
                canvas::event::Status::Captured,
                Some(Message::Canvas(InputEvent::PointerReleased)),
            ),

            canvas::Event::Touch(touch_event) => {
                let local = |p: Point| Point::new(p.x - bounds.x, p.y - bounds.y);
                let message = match touch_event {
                    touch::Event::FingerPressed { id, position } => {
                        state.press(id, local(position));
                        InputEvent::TouchStart(state.points())
                    }
                    touch::Event::FingerMoved { id, position } => {
                        state.moved(id, local(position));
                        InputEvent::TouchMove(state.points())
                    }
                    touch::Event::FingerLifted { id, .. }
                    | touch::Event::FingerLost { id, .. } => {
                        state.lift(id);
                        InputEvent::TouchEnd(state.points())
                    }
                };
                (
                    canvas::event::Status::Captured,
                    Some(Message::Canvas(message)),
                )
            }

            _ => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let geometry = self.cache.draw(renderer, bounds.size(), |frame| {
            frame.fill_rectangle(Point::ORIGIN, frame.size(), CANVAS_BACKGROUND);

            frame.with_save(|frame| {
                // Global viewport transform, applied once
                frame.translate(Vector::new(self.viewport.pan.x, self.viewport.pan.y));
                frame.scale(self.viewport.scale);

                for photo in self.scene.ordered() {
                    let Some(image) = self.images.get(photo.image) else {
                        continue; // still decoding
                    };
                    frame.with_save(|frame| {
                        let center = photo.center();
                        frame.translate(Vector::new(center.x, center.y));
                        frame.rotate(photo.rotation);
                        frame.scale(photo.scale);

                        let top_left =
                            Point::new(-photo.size.width / 2.0, -photo.size.height / 2.0);
                        frame.draw_image(
                            Rectangle::new(top_left, photo.size),
                            &image.handle,
                        );

                        if self.hovered == Some(photo.id) {
                            frame.stroke(
                                &Path::rectangle(top_left, photo.size),
                                Stroke::default()
                                    .with_color(HOVER_OUTLINE)
                                    .with_width(2.0),
                            );
                        }
                    });
                }
            });

            if let Some(center) = self.hovered_center {
                frame.fill(&Path::circle(center, 4.0), HOVER_OUTLINE);
            }
        });

        vec![geometry]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if self.dragging {
            mouse::Interaction::Grabbing
        } else if cursor.position_in(bounds).is_some() && self.hovered.is_some() {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}
