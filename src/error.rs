use std::path::PathBuf;

/// Result type alias for the extraction layer
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised while extracting routes
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// An annotation attribute (`defaults`, `requirements`) could not be decoded
    MalformedMetadata { attribute: String, message: String },
    /// A route dump file is not a JSON object of route descriptors
    InvalidJson { file: PathBuf, message: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::MalformedMetadata { attribute, message } => {
                write!(f, "malformed '{}' attribute: {}", attribute, message)
            }
            Error::InvalidJson { file, message } => {
                write!(f, "invalid route dump {}: {}", file.display(), message)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}
