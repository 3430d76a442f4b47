use crate::capture::CaptureParser;
use crate::classify::AuthClassifier;
use crate::commands::validators;
use crate::core::error::GenError;
use crate::core::formatter::OutputFormat;
use crate::core::settings::Settings;
use crate::model::{ServiceInfo, ServiceModelBuilder};
use clap::Args;
use std::path::Path;

#[derive(Debug, Args)]
pub struct CaptureArgs {
    #[arg(help = "Path to the HAR capture file")]
    pub capture: String,
}

#[derive(Debug, Args)]
pub struct FormatArgs {
    #[arg(
        short = 'f',
        long = "format",
        help = "Output format: text or json",
        default_value_t = OutputFormat::Text,
        value_enum,
        ignore_case = true
    )]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[arg(
        short = 'n',
        long = "name",
        help = "Service name, overriding the one derived from the host",
        value_parser = validators::validate_name
    )]
    pub name: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        default_value = ".",
        help = "Directory the server directory is created in"
    )]
    pub output: String,
}

/// Parse, classify and build: everything up to synthesis.
pub fn build_service(
    capture: &str,
    name: Option<&str>,
    settings: &Settings,
) -> Result<ServiceInfo, GenError> {
    let parsed = CaptureParser::new(settings)?.parse_file(Path::new(capture))?;
    let classification = AuthClassifier::new(&settings.classifier).classify(&parsed.exchanges);
    let service = ServiceModelBuilder::new(&settings.builder)
        .with_name(name)
        .build(parsed, classification);
    for warning in &service.warnings {
        tracing::warn!("{warning}");
    }
    Ok(service)
}
