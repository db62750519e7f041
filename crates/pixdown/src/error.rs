use pixdown_imgproc::DownsampleError;

/// An error type for loading a downsampler configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file.
    #[error("Failed to read the configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing the configuration.
    #[error("Failed to parse the configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration values are invalid.
    #[error(transparent)]
    Downsample(#[from] DownsampleError),
}
