use crate::capture::CaptureError;
use crate::core::error::GenError;
use crate::synth::GenerationError;

/// Exit codes for the mcpgen CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General/unspecified error
    GeneralError = 1,
    /// Capture file is not a readable HAR document
    CaptureError = 2,
    /// Nothing could be generated from the capture
    GenerationError = 3,
    /// File not found or IO error
    FileError = 4,
    /// Invalid settings file or argument
    ConfigError = 5,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl From<&GenError> for ExitCode {
    fn from(error: &GenError) -> Self {
        match error {
            GenError::Capture(_) => ExitCode::CaptureError,
            GenError::Generation(_) => ExitCode::GenerationError,
            GenError::Config(_) => ExitCode::ConfigError,
            GenError::File { .. } => ExitCode::FileError,
        }
    }
}

impl From<&Box<dyn std::error::Error>> for ExitCode {
    fn from(error: &Box<dyn std::error::Error>) -> Self {
        if let Some(gen_error) = error.downcast_ref::<GenError>() {
            ExitCode::from(gen_error)
        } else if error.downcast_ref::<CaptureError>().is_some() {
            ExitCode::CaptureError
        } else if error.downcast_ref::<GenerationError>().is_some() {
            ExitCode::GenerationError
        } else if error.downcast_ref::<clap::Error>().is_some() {
            ExitCode::ConfigError
        } else if error.downcast_ref::<std::io::Error>().is_some() {
            ExitCode::FileError
        } else {
            ExitCode::GeneralError
        }
    }
}
