/// Asynchronous image decoding
///
/// Decoding is the only asynchronous operation in the whole engine. It
/// runs on a blocking worker so the UI thread never stalls; the photo
/// element for a decoded image is only inserted after the decode
/// succeeds. On failure nothing is inserted anywhere.

use std::path::PathBuf;

use tokio::task;

use crate::error::LoadError;

/// A successfully decoded raster, ready for cache insertion
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Display name, usually the file name
    pub name: String,
    /// Natural pixel dimensions
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, `width * height * 4` bytes
    pub rgba: Vec<u8>,
}

/// Read and decode an image file.
pub async fn load_image(path: PathBuf) -> Result<DecodedImage, LoadError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = tokio::fs::read(&path).await.map_err(|source| LoadError::Io {
        name: name.clone(),
        source,
    })?;

    decode_image(name, bytes).await
}

/// Decode an in-memory image blob.
pub async fn decode_image(name: String, bytes: Vec<u8>) -> Result<DecodedImage, LoadError> {
    // Spawn blocking because decoding is CPU-intensive
    task::spawn_blocking(move || decode_blocking(name, bytes))
        .await
        .map_err(|e| LoadError::TaskJoin(e.to_string()))?
}

fn decode_blocking(name: String, bytes: Vec<u8>) -> Result<DecodedImage, LoadError> {
    let decoded = image::load_from_memory(&bytes).map_err(|source| LoadError::Decode {
        name: name.clone(),
        source,
    })?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        name,
        width,
        height,
        rgba: rgba.into_raw(),
    })
}
