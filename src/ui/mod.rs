/// UI widgets
///
/// The collage canvas widget: renders the scene and translates raw
/// mouse/touch/wheel events into engine input events.

pub mod canvas;
