pub mod exchange;
pub mod filter;
pub mod har;
pub mod normalize;
pub mod parser;

pub use exchange::CapturedExchange;
pub use parser::{CaptureError, CaptureParser, CaptureStats, ParsedCapture, SkippedEntry};
