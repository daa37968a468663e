pub type NewsreelResult<T> = Result<T, NewsreelError>;

/// Errors raised by layout, rendering and the surrounding collaborators.
///
/// Empty text and footer overflow past the shift cap are *not* errors; they
/// produce degraded but valid output.
#[derive(thiserror::Error, Debug)]
pub enum NewsreelError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("font load error: {0}")]
    FontLoad(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("rendering cancelled before frame {0}")]
    Cancelled(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl NewsreelError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn font_load(msg: impl Into<String>) -> Self {
        Self::FontLoad(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }
}
