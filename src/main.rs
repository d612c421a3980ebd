use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use iced::keyboard;
use iced::widget::{button, canvas, column, container, row, text};
use iced::{Alignment, Element, Event, Length, Point, Size, Subscription, Task, Theme};
use rand::Rng;
use rfd::FileDialog;

mod error;
mod export;
mod gesture;
mod images;
mod layout;
mod scene;
mod ui;

use error::{ExportError, LoadError};
use gesture::{GestureSession, InputEvent};
use images::cache::ImageCache;
use images::loader::{self, DecodedImage};
use layout::LayoutPreset;
use scene::model::Scene;
use scene::photo::DEFAULT_PHOTO_WIDTH;
use scene::viewport::Viewport;
use ui::canvas::CollageCanvas;

const WINDOW_SIZE: Size = Size::new(1280.0, 800.0);

/// Small random tilt applied to freshly inserted photos
const INSERT_ROTATION_JITTER: f32 = 0.25;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "tiff"];

/// Main application state
struct CollageStudio {
    scene: Scene,
    viewport: Viewport,
    images: ImageCache,
    session: GestureSession,
    /// Cached canvas geometry; cleared after every scene/viewport change
    canvas_cache: canvas::Cache,
    /// Last known canvas area, used by layouts and photo insertion
    canvas_size: Size,
    modifiers: keyboard::Modifiers,
    /// Status message to display to the user
    status: String,
    /// Scene generation; decodes finishing after a clear are discarded
    epoch: u64,
    pending_loads: usize,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the "Add Photos" button
    AddPhotos,
    /// Image files were dropped onto the window
    PhotosDropped(Vec<PathBuf>),
    /// A background decode finished
    PhotoDecoded {
        epoch: u64,
        result: Result<DecodedImage, Arc<LoadError>>,
    },
    /// Engine input event from the canvas widget
    Canvas(InputEvent),
    /// Delete key over a hovered photo
    RemoveHovered,
    /// Page Up / Page Down nudge the hovered photo one z step
    RaiseHovered,
    LowerHovered,
    /// User picked a layout preset
    ApplyLayout(LayoutPreset),
    ClearCollage,
    SaveCollage,
    SaveComplete(Result<PathBuf, Arc<ExportError>>),
    WindowResized(Size),
    ModifiersChanged(keyboard::Modifiers),
}

impl CollageStudio {
    fn new() -> (Self, Task<Message>) {
        (
            CollageStudio {
                scene: Scene::new(),
                viewport: Viewport::new(),
                images: ImageCache::new(),
                session: GestureSession::new(),
                canvas_cache: canvas::Cache::new(),
                canvas_size: WINDOW_SIZE,
                modifiers: keyboard::Modifiers::default(),
                status: String::from(
                    "Add photos, then drag to arrange. Wheel zooms, Alt-click sends to back.",
                ),
                epoch: 0,
                pending_loads: 0,
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::AddPhotos => {
                let files = FileDialog::new()
                    .set_title("Add Photos")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_files();
                match files {
                    Some(paths) => self.spawn_loads(paths),
                    None => Task::none(),
                }
            }

            Message::PhotosDropped(paths) => self.spawn_loads(paths),

            Message::PhotoDecoded { epoch, result } => {
                self.pending_loads = self.pending_loads.saturating_sub(1);
                if epoch != self.epoch {
                    // The collage was cleared while this decode was in
                    // flight; the result no longer has a home.
                    tracing::info!("discarding decode for a cleared collage");
                    return Task::none();
                }
                match result {
                    Ok(decoded) => self.insert_photo(decoded),
                    Err(error) => {
                        tracing::warn!(%error, "photo load failed");
                        self.status = error.to_string();
                    }
                }
                Task::none()
            }

            Message::Canvas(event) => {
                self.session.handle(
                    event,
                    &mut self.scene,
                    &mut self.viewport,
                    self.modifiers.alt(),
                    Instant::now(),
                );
                self.canvas_cache.clear();
                Task::none()
            }

            Message::RemoveHovered => {
                if let Some(id) = self.session.hovered() {
                    if let Some(key) = self.scene.remove(id) {
                        self.images.release(key);
                    }
                    self.canvas_cache.clear();
                    self.status = format!("{} photo(s) on the canvas.", self.scene.len());
                    tracing::info!(count = self.scene.len(), "photo removed");
                }
                Task::none()
            }

            Message::RaiseHovered => {
                if let Some(id) = self.session.hovered() {
                    self.scene.step_forward(id);
                    self.canvas_cache.clear();
                }
                Task::none()
            }

            Message::LowerHovered => {
                if let Some(id) = self.session.hovered() {
                    self.scene.step_backward(id);
                    self.canvas_cache.clear();
                }
                Task::none()
            }

            Message::ApplyLayout(preset) => {
                layout::apply_layout(
                    preset,
                    &mut self.scene,
                    &mut self.viewport,
                    self.canvas_size,
                    &mut rand::rng(),
                );
                self.canvas_cache.clear();
                self.status = format!("Applied the {} layout.", preset.label());
                tracing::info!(layout = preset.label(), "layout applied");
                Task::none()
            }

            Message::ClearCollage => {
                for key in self.scene.reset() {
                    self.images.release(key);
                }
                // Every raster is owned by exactly one element
                debug_assert!(self.images.is_empty());
                self.viewport.reset();
                self.session = GestureSession::new();
                self.epoch += 1;
                self.canvas_cache.clear();
                self.status = String::from("Canvas cleared.");
                tracing::info!("collage cleared");
                Task::none()
            }

            Message::SaveCollage => {
                if self.scene.is_empty() {
                    self.status = String::from("Nothing to save yet.");
                    return Task::none();
                }
                let Some(path) = FileDialog::new()
                    .set_title("Save Collage")
                    .set_file_name("collage.png")
                    .add_filter("PNG image", &["png"])
                    .save_file()
                else {
                    return Task::none();
                };
                self.status = String::from("Saving collage...");
                Task::perform(
                    export::save_png(
                        self.scene.clone(),
                        self.viewport,
                        self.images.clone(),
                        self.canvas_size,
                        path,
                    ),
                    |result| Message::SaveComplete(result.map_err(Arc::new)),
                )
            }

            Message::SaveComplete(Ok(path)) => {
                self.status = format!("Saved collage to {}.", path.display());
                tracing::info!(path = %path.display(), "collage exported");
                Task::none()
            }

            Message::SaveComplete(Err(error)) => {
                tracing::error!(%error, "collage export failed");
                self.status = error.to_string();
                Task::none()
            }

            Message::WindowResized(size) => {
                self.canvas_size = size;
                self.canvas_cache.clear();
                Task::none()
            }

            Message::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers;
                Task::none()
            }
        }
    }

    /// Launch one independent decode task per file. Failures are
    /// per-file; one broken image never affects the rest of the batch.
    fn spawn_loads(&mut self, paths: Vec<PathBuf>) -> Task<Message> {
        if paths.is_empty() {
            return Task::none();
        }
        self.pending_loads += paths.len();
        self.status = format!("Loading {} photo(s)...", paths.len());
        let epoch = self.epoch;
        Task::batch(paths.into_iter().map(|path| {
            Task::perform(loader::load_image(path), move |result| {
                Message::PhotoDecoded {
                    epoch,
                    result: result.map_err(Arc::new),
                }
            })
        }))
    }

    /// Insert a decoded image as a new photo: default width, height from
    /// the source aspect ratio, random position and a slight tilt.
    fn insert_photo(&mut self, decoded: DecodedImage) {
        let size = Size::new(
            DEFAULT_PHOTO_WIDTH,
            DEFAULT_PHOTO_WIDTH * decoded.height as f32 / decoded.width as f32,
        );
        let mut rng = rand::rng();
        let max_x = (self.canvas_size.width - size.width).max(0.0);
        let max_y = (self.canvas_size.height - size.height).max(0.0);
        let position = Point::new(
            rng.random_range(0.0..=max_x),
            rng.random_range(0.0..=max_y),
        );
        let rotation = rng.random_range(-INSERT_ROTATION_JITTER..=INSERT_ROTATION_JITTER);

        let name = decoded.name.clone();
        let key = self.images.insert(decoded);
        self.scene.add(key, position, size, rotation);
        self.canvas_cache.clear();

        tracing::info!(photo = %name, count = self.scene.len(), z = self.scene.max_z(), "photo added");
        self.status = if self.pending_loads > 0 {
            format!(
                "Added {name}; {} photo(s) still loading...",
                self.pending_loads
            )
        } else {
            format!("{} photo(s) on the canvas.", self.scene.len())
        };
    }

    fn view(&self) -> Element<Message> {
        let mut toolbar = row![button("Add Photos").on_press(Message::AddPhotos).padding(8)]
            .spacing(8)
            .padding(8)
            .align_y(Alignment::Center);

        for preset in LayoutPreset::ALL {
            toolbar = toolbar.push(
                button(text(preset.label()))
                    .on_press(Message::ApplyLayout(preset))
                    .padding(8),
            );
        }

        let has_photos = !self.scene.is_empty();
        toolbar = toolbar
            .push(
                button("Save")
                    .on_press_maybe(has_photos.then_some(Message::SaveCollage))
                    .padding(8),
            )
            .push(
                button("Clear")
                    .on_press_maybe(has_photos.then_some(Message::ClearCollage))
                    .padding(8),
            );

        let collage = canvas(CollageCanvas {
            scene: &self.scene,
            viewport: &self.viewport,
            images: &self.images,
            hovered: self.session.hovered(),
            hovered_center: self.session.hovered_center(&self.scene, &self.viewport),
            dragging: matches!(
                self.session.state(),
                gesture::GestureState::DraggingPhoto { .. }
            ),
            cache: &self.canvas_cache,
        })
        .width(Length::Fill)
        .height(Length::Fill);

        let status = container(text(&self.status).size(14)).padding([4, 8]);

        column![toolbar, collage, status].into()
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::event::listen_with(|event, _status, _window| match event {
            Event::Window(iced::window::Event::Resized(size)) => {
                Some(Message::WindowResized(size))
            }
            Event::Window(iced::window::Event::FileDropped(path)) => {
                Some(Message::PhotosDropped(vec![path]))
            }
            Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
                Some(Message::ModifiersChanged(modifiers))
            }
            Event::Keyboard(keyboard::Event::KeyPressed {
                key: keyboard::Key::Named(named),
                ..
            }) => match named {
                keyboard::key::Named::Delete | keyboard::key::Named::Backspace => {
                    Some(Message::RemoveHovered)
                }
                keyboard::key::Named::PageUp => Some(Message::RaiseHovered),
                keyboard::key::Named::PageDown => Some(Message::LowerHovered),
                _ => None,
            },
            _ => None,
        })
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt::init();

    iced::application("Collage Studio", CollageStudio::update, CollageStudio::view)
        .subscription(CollageStudio::subscription)
        .theme(CollageStudio::theme)
        .window_size(WINDOW_SIZE)
        .centered()
        .run_with(CollageStudio::new)
}
