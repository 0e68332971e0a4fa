//! spims locates a small pattern image inside a larger source image when the
//! pattern's position, and possibly its scale, are unknown.
//!
//! The pipeline runs a coarse scale search at reduced resolution, refines the
//! promising scales inside bounded source windows at full resolution, and
//! resolves overlapping candidates greedily. Comparisons use FFT-based
//! normalised cross-correlation, or exact RGB equality for single-pixel and
//! constant patterns. Window refinement can run in parallel with the `rayon`
//! feature; decoding of GIF/JPEG/PNG files is available with `image-io`.

pub mod candidate;
pub mod fft;
pub mod image;
pub mod kernel;
pub mod model;
pub mod search;
mod trace;
pub mod util;

pub use candidate::overlap::{overlap_ratio, resolve_overlaps};
pub use candidate::{MatchCandidate, MatchRecord};
pub use crate::image::{ImageView, OwnedImage};
pub use kernel::{classify, Comparator, Pass, ScanParams, ScoreMap, ThresholdPolicy};
pub use model::{Pattern, Picture, Scale, Source, Window};
pub use search::{
    match_pair, CoarseFactorPolicy, MatchConfig, MatchReport, Matcher, ScaleSpace, ScaleWindow,
    SearchMode, SearchStats,
};
pub use util::{SpimsError, SpimsResult};

#[cfg(feature = "image-io")]
pub use crate::image::io;
