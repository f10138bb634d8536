//! Picks background, primary, secondary and detail colors out of album art.
//!
//! The caller decodes the cover into a [`Bitmap`]; [`extract_colors`] then
//! counts its pixels and chooses a readable theme. [`ExtractionTask`] runs the
//! same work off the async runtime and can be cancelled when a newer cover
//! replaces the one being analysed.

pub mod bitmap;
pub mod color;
pub mod error;
pub mod extract;
pub mod quality;
pub mod task;

pub use bitmap::Bitmap;
pub use color::PackedColor;
pub use error::{DecodeError, ExtractError, ParseQualityError};
pub use extract::{
    extract_colors, extract_colors_on, extract_colors_with_cancel, CancelFlag, ResultColors,
};
pub use quality::ScaleQuality;
pub use task::ExtractionTask;
