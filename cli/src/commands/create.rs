use crate::commands::shared::{self, CaptureArgs, GenerateArgs};
use crate::core::settings::Settings;
use crate::synth::{self, writer, SynthOptions};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Args;
use std::path::Path;

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub capture: CaptureArgs,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

/// `SOURCE_DATE_EPOCH` pins the timestamp for reproducible output.
fn generated_at() -> String {
    let now = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|epoch| epoch.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn execute(args: &CreateArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let service = shared::build_service(
        &args.capture.capture,
        args.generate.name.as_deref(),
        settings,
    )?;

    let options = SynthOptions {
        generated_at: Some(generated_at()),
    };
    let server = synth::synthesize(&service, &options)?;
    let root = writer::write_server(&server, Path::new(&args.generate.output))?;

    println!(
        "Created MCP server '{}' with {} tools in {}",
        server.name,
        service.endpoints.len(),
        crate::core::paths::clean_path(&root)
    );
    println!("Auth: {}", service.auth.describe());
    Ok(())
}
