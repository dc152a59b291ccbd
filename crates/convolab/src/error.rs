use std::path::PathBuf;

/// Errors produced by the convolution core and the image boundary helpers.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Arguments that no result can be computed for: empty buffers, even or
    /// oversized kernels, mismatched image sizes, out-of-range parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The transform library rejected a buffer.
    #[error("transform failed: {0}")]
    Fft(#[from] spectral::FftError),

    /// Decoding or encoding an image file failed.
    #[error("image `{}`: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Creating an output location failed.
    #[error("io `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidInput(message.into())
}
