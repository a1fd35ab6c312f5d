/// Crate-wide result alias.
pub type PosterResult<T> = Result<T, PosterError>;

/// Errors raised by individual poster stages.
///
/// [`crate::PosterEngine::generate`] never returns these; the engine maps them to fallbacks.
/// They surface from the lower-level building blocks (decoding, encoding, uploads) so callers
/// composing those pieces directly can react to them.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// Input that cannot be interpreted (bad dimensions, empty buffers, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Font discovery or loading failure.
    #[error("font error: {0}")]
    Font(String),

    /// Rasterization or compositing failure.
    #[error("render error: {0}")]
    Render(String),

    /// Image decoding failure.
    #[error("decode error: {0}")]
    Decode(String),

    /// Image encoding failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// Network collaborator failure (background fetch, upload).
    #[error("network error: {0}")]
    Network(String),

    /// Anything else, with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    /// Build a [`PosterError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PosterError::Font`].
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`PosterError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PosterError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PosterError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PosterError::Network`].
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }
}
