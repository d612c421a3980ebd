use thiserror::Error;

/// Failures while bringing an image file onto the canvas.
/// Always recoverable and always per-file: one bad image never affects
/// the rest of a batch.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("background decode task failed: {0}")]
    TaskJoin(String),
}

/// Failures while rasterizing and writing the exported collage
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write collage: {0}")]
    Write(#[from] image::ImageError),

    #[error("background export task failed: {0}")]
    TaskJoin(String),
}
