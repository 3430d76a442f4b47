pub mod error;
pub mod exit_code;
pub mod formatter;
pub mod json;
pub mod logger;
pub mod paths;
pub mod settings;
pub mod version;
