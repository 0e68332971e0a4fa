//! Pixel buffers: borrowed views, owned images and resampling.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! view cut out of a larger image keeps the parent's stride. `OwnedImage` is
//! always contiguous and is what every derived image (crop, resize,
//! decimation) is returned as, so derived images never alias their parent.

use crate::util::{SpimsError, SpimsResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod resample;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> SpimsResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> SpimsResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(SpimsError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }

    /// Iterates over the rows of the view, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> SpimsResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(SpimsError::InvalidDimensions { width, height });
        }
        let out_of_bounds = SpimsError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y * self.stride + x;
        let data = self.data.get(start..).ok_or(SpimsError::BufferTooSmall {
            needed: start.saturating_add(1),
            got: self.data.len(),
        })?;
        ImageView::new(data, width, height, self.stride)
    }
}

impl<T: Copy> ImageView<'_, T> {
    /// Copies the view into a contiguous owned image.
    pub fn to_owned_image(&self) -> OwnedImage<T> {
        let mut data = Vec::with_capacity(self.width * self.height);
        for row in self.rows() {
            data.extend_from_slice(row);
        }
        OwnedImage {
            data,
            width: self.width,
            height: self.height,
        }
    }
}

/// Owned contiguous image buffer in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> OwnedImage<T> {
    /// Wraps a row-major buffer whose length is exactly `width * height`.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> SpimsResult<Self> {
        let needed = required_len(width, height, width)?;
        if data.len() < needed {
            return Err(SpimsError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(SpimsError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a validated image; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the row-major pixel buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    /// Returns a borrowed view of the whole image.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Applies `f` to every pixel, producing a new image of the same extent.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> OwnedImage<U> {
        OwnedImage {
            data: self.data.iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl<T: Copy> OwnedImage<T> {
    /// Creates an image filled with `value`.
    pub fn filled(value: T, width: usize, height: usize) -> SpimsResult<Self> {
        let len = required_len(width, height, width)?;
        Self::new(vec![value; len], width, height)
    }

    /// Copies a rectangular region into a new owned image.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> SpimsResult<Self> {
        Ok(self.view().roi(x, y, width, height)?.to_owned_image())
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> SpimsResult<usize> {
    if width == 0 || height == 0 {
        return Err(SpimsError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(SpimsError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(SpimsError::InvalidDimensions { width, height })
}
