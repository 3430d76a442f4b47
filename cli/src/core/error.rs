use crate::capture::CaptureError;
use crate::synth::GenerationError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File error: {path}: {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl GenError {
    pub fn file(path: impl AsRef<std::path::Path>, source: io::Error) -> Self {
        GenError::File {
            path: crate::core::paths::clean_path(path.as_ref()),
            source,
        }
    }
}
