/// Errors raised by the client-side components.
///
/// None of these is fatal to a page: each component turns them into a
/// local message or a logged no-op.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// Latitude or longitude is not a finite, in-range number.
    #[error("Invalid coordinates: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    /// The HTTP request itself failed (connect, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status or an `{error}` body.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// The body was not the expected JSON.
    #[error("Malformed response: {0}")]
    Parse(String),

    /// A selected file exceeds the preview size limit.
    #[error("File is {size} bytes, the limit is {limit}")]
    FileTooLarge { size: u64, limit: u64 },

    /// A selected file's type is not accepted for preview.
    #[error("Unsupported file type '{0}'")]
    UnsupportedType(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The map engine refused to create a map.
    #[error("Map engine error: {0}")]
    Map(String),

    /// An environment variable could not be parsed.
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Config {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}
