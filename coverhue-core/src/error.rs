use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bitmap has empty dimensions {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("bitmap of {width}x{height} is too large to address")]
    TooLarge { width: u32, height: u32 },

    #[error("bitmap buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("could not resize {width}x{height} bitmap to {target_width}x{target_height}")]
    Resize {
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("color extraction was cancelled")]
    Cancelled,

    #[error("extraction worker failed: {0}")]
    Task(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown scale quality '{0}', expected one of lowest, low, high, highest")]
pub struct ParseQualityError(pub String);
