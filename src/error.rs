use thiserror::Error;

/// Errors produced by page codecs while decoding a slice of a page.
///
/// No decode error is fatal to the tile engine: a failed decode leaves the
/// tile without pixels and eligible for retry on the next visibility pass.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The underlying codec failed to produce pixels
    #[error("codec error: {0}")]
    Codec(String),

    /// The requested page does not exist in the source document
    #[error("page {page} not available from source")]
    PageNotFound { page: usize },

    /// The page source could not be opened or parsed
    #[error("invalid page source: {0}")]
    InvalidSource(String),
}
