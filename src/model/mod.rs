//! Decoded images in their two matching roles.
//!
//! A [`Picture`] owns a single-channel correlation buffer, an RGB buffer of
//! the same extent used for exact-equality checks, and the mean and standard
//! deviation of the correlation buffer. [`Pattern`] is a plain picture;
//! [`Source`] additionally caches the spectra of its buffer and of the buffer
//! squared. Every derivation (decimation, resize, windowing) builds a new
//! value with freshly computed statistics and spectra; nothing is mutated
//! after construction.

mod geometry;

pub use geometry::{sort_by_area_desc, Scale, Window};

use crate::fft::Spectrum;
use crate::image::resample::{decimate, resize_f32, resize_rgb};
use crate::image::OwnedImage;
use crate::util::math::{luma, mean_std};
use crate::util::{SpimsError, SpimsResult};

/// Correlation buffer, RGB buffer and derived statistics.
#[derive(Clone, Debug)]
pub struct Picture {
    name: String,
    gray: OwnedImage<f32>,
    rgb: OwnedImage<[u8; 3]>,
    mean: f64,
    std_dev: f64,
}

impl Picture {
    /// Builds a picture from explicit buffers; extents must agree.
    pub fn new(
        name: impl Into<String>,
        gray: OwnedImage<f32>,
        rgb: OwnedImage<[u8; 3]>,
    ) -> SpimsResult<Self> {
        if gray.width() != rgb.width() || gray.height() != rgb.height() {
            return Err(SpimsError::ShapeMismatch {
                gray_width: gray.width(),
                gray_height: gray.height(),
                rgb_width: rgb.width(),
                rgb_height: rgb.height(),
            });
        }
        Ok(Self::from_parts(name.into(), gray, rgb))
    }

    /// Builds a picture from row-major RGB pixels, deriving the correlation
    /// buffer as luma.
    pub fn from_rgb(
        name: impl Into<String>,
        width: usize,
        height: usize,
        pixels: Vec<[u8; 3]>,
    ) -> SpimsResult<Self> {
        let rgb = OwnedImage::new(pixels, width, height)?;
        let gray = rgb.map(|&px| luma(px));
        Ok(Self::from_parts(name.into(), gray, rgb))
    }

    fn from_parts(name: String, gray: OwnedImage<f32>, rgb: OwnedImage<[u8; 3]>) -> Self {
        let (mean, std_dev) = mean_std(gray.data());
        Self {
            name,
            gray,
            rgb,
            mean,
            std_dev,
        }
    }

    /// Identifier carried into match records (usually the file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns.
    pub fn width(&self) -> usize {
        self.gray.width()
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.gray.height()
    }

    /// Extent as a [`Scale`].
    pub fn scale(&self) -> Scale {
        Scale::new(self.height(), self.width())
    }

    /// Correlation buffer.
    pub fn gray(&self) -> &OwnedImage<f32> {
        &self.gray
    }

    /// RGB buffer.
    pub fn rgb(&self) -> &OwnedImage<[u8; 3]> {
        &self.rgb
    }

    /// Mean of the correlation buffer.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation of the correlation buffer.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Keeps every `fact`-th row and column.
    pub fn downscale(&self, fact: usize) -> Picture {
        Self::from_parts(
            self.name.clone(),
            decimate(self.gray.view(), fact),
            decimate(self.rgb.view(), fact),
        )
    }

    /// Bilinear resize to `scale`; identical copy when already that size.
    pub fn resize(&self, scale: Scale) -> Picture {
        if scale == self.scale() {
            return self.clone();
        }
        Self::from_parts(
            self.name.clone(),
            resize_f32(self.gray.view(), scale.width, scale.height),
            resize_rgb(self.rgb.view(), scale.width, scale.height),
        )
    }

    /// Copies the part of `window` that lies inside the picture.
    pub fn crop(&self, window: Window) -> Option<Picture> {
        let w = window.clip(self.width(), self.height())?;
        let gray = self.gray.crop(w.left, w.top, w.width(), w.height()).ok()?;
        let rgb = self.rgb.crop(w.left, w.top, w.width(), w.height()).ok()?;
        Some(Self::from_parts(self.name.clone(), gray, rgb))
    }
}

/// The smaller image being searched for.
#[derive(Clone, Debug)]
pub struct Pattern {
    picture: Picture,
}

impl Pattern {
    /// Wraps a picture in the pattern role.
    pub fn new(picture: Picture) -> Self {
        Self { picture }
    }

    /// Shorthand for [`Picture::from_rgb`] in the pattern role.
    pub fn from_rgb(
        name: impl Into<String>,
        width: usize,
        height: usize,
        pixels: Vec<[u8; 3]>,
    ) -> SpimsResult<Self> {
        Picture::from_rgb(name, width, height, pixels).map(Self::new)
    }

    /// Underlying buffers and statistics.
    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    pub fn name(&self) -> &str {
        self.picture.name()
    }

    pub fn scale(&self) -> Scale {
        self.picture.scale()
    }

    pub fn std_dev(&self) -> f64 {
        self.picture.std_dev()
    }

    /// Decimated copy.
    pub fn downscale(&self, fact: usize) -> Pattern {
        Self::new(self.picture.downscale(fact))
    }

    /// Resized copy.
    pub fn resize(&self, scale: Scale) -> Pattern {
        Self::new(self.picture.resize(scale))
    }
}

/// The larger image searched in, with cached spectra.
///
/// `spectrum` is the transform of the correlation buffer and `spectrum_sq`
/// the transform of its element-wise square; both are computed together with
/// the buffer they describe and never updated separately.
#[derive(Clone, Debug)]
pub struct Source {
    picture: Picture,
    spectrum: Spectrum,
    spectrum_sq: Spectrum,
}

impl Source {
    /// Wraps a picture in the source role, computing both spectra.
    pub fn new(picture: Picture) -> Self {
        let (w, h) = (picture.width(), picture.height());
        let data = picture.gray().data();
        let spectrum = Spectrum::forward(data, w, h);
        let spectrum_sq = Spectrum::forward_map(data, w, h, |v| {
            let v = v as f64;
            v * v
        });
        Self {
            picture,
            spectrum,
            spectrum_sq,
        }
    }

    /// Shorthand for [`Picture::from_rgb`] in the source role.
    pub fn from_rgb(
        name: impl Into<String>,
        width: usize,
        height: usize,
        pixels: Vec<[u8; 3]>,
    ) -> SpimsResult<Self> {
        Picture::from_rgb(name, width, height, pixels).map(Self::new)
    }

    /// Underlying buffers and statistics.
    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    pub fn name(&self) -> &str {
        self.picture.name()
    }

    pub fn scale(&self) -> Scale {
        self.picture.scale()
    }

    /// Transform of the correlation buffer.
    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }

    /// Transform of the squared correlation buffer.
    pub fn spectrum_sq(&self) -> &Spectrum {
        &self.spectrum_sq
    }

    /// Decimated copy with recomputed spectra.
    pub fn downscale(&self, fact: usize) -> Source {
        Self::new(self.picture.downscale(fact))
    }

    /// Cropped copy with recomputed spectra; `None` if the window misses.
    pub fn window(&self, window: Window) -> Option<Source> {
        self.picture.crop(window).map(Self::new)
    }
}
