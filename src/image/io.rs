//! Decoding image files into pictures via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Only GIF, JPEG and PNG
//! are accepted; the format is detected from the file content, not the
//! extension.

use crate::model::{Pattern, Picture, Source};
use crate::util::{SpimsError, SpimsResult};
use image::{ImageFormat, ImageReader};
use std::path::Path;

/// Formats accepted by [`load_picture`].
pub const ACCEPTED_FORMATS: [ImageFormat; 3] = [ImageFormat::Gif, ImageFormat::Jpeg, ImageFormat::Png];

fn io_error(path: &Path, err: impl std::fmt::Display) -> SpimsError {
    SpimsError::ImageIo {
        reason: format!("{}: {err}", path.display()),
    }
}

/// Builds a picture from a decoded RGB image.
fn picture_from_rgb_image(name: impl Into<String>, img: &image::RgbImage) -> SpimsResult<Picture> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let pixels = img.pixels().map(|px| px.0).collect();
    Picture::from_rgb(name, width, height, pixels)
}

/// Decodes `path` into a picture named after its file name.
pub fn load_picture<P: AsRef<Path>>(path: P) -> SpimsResult<Picture> {
    let path = path.as_ref();
    let reader = ImageReader::open(path)
        .map_err(|err| io_error(path, err))?
        .with_guessed_format()
        .map_err(|err| io_error(path, err))?;
    match reader.format() {
        Some(format) if ACCEPTED_FORMATS.contains(&format) => {}
        other => {
            return Err(SpimsError::UnsupportedFormat {
                path: path.display().to_string(),
                format: other.map_or_else(|| "unknown".to_owned(), |f| format!("{f:?}")),
            })
        }
    }
    let decoded = reader.decode().map_err(|err| io_error(path, err))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    picture_from_rgb_image(name, &decoded.to_rgb8())
}

/// Decodes `path` in the source role.
pub fn load_source<P: AsRef<Path>>(path: P) -> SpimsResult<Source> {
    load_picture(path).map(Source::new)
}

/// Decodes `path` in the pattern role.
pub fn load_pattern<P: AsRef<Path>>(path: P) -> SpimsResult<Pattern> {
    load_picture(path).map(Pattern::new)
}
