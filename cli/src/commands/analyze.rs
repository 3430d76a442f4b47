use crate::commands::shared::{self, CaptureArgs, FormatArgs};
use crate::core::formatter::{render_value, Formatter, TextReport};
use crate::core::settings::Settings;
use crate::model::{ApiEndpoint, BodyExample, ServiceInfo};
use clap::Args;
use serde::Serialize;

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub capture: CaptureArgs,

    #[command(flatten)]
    pub format: FormatArgs,
}

#[derive(Serialize)]
pub struct AnalysisReport<'a> {
    #[serde(flatten)]
    pub service: &'a ServiceInfo,
    pub endpoint_count: usize,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(service: &'a ServiceInfo) -> Self {
        Self {
            service,
            endpoint_count: service.endpoints.len(),
        }
    }
}

fn body_label(body: &BodyExample) -> &'static str {
    match body {
        BodyExample::Json(_) => "json",
        BodyExample::Form(_) => "form",
        BodyExample::Raw(_) => "raw",
    }
}

fn render_endpoint(endpoint: &ApiEndpoint) -> String {
    let mut out = format!(
        "  {} {} -> {} ({} call{})\n",
        endpoint.method,
        endpoint.path,
        endpoint.tool_name,
        endpoint.calls,
        if endpoint.calls == 1 { "" } else { "s" }
    );
    for param in &endpoint.path_parameters {
        out.push_str(&format!(
            "    path: {} ({}, e.g. {})\n",
            param.name,
            param.kind.describe(),
            param.example
        ));
    }
    for (name, examples) in &endpoint.query_parameters {
        if examples.is_empty() {
            out.push_str(&format!("    query: {name}\n"));
        } else {
            out.push_str(&format!("    query: {name} (e.g. {})\n", examples.join(", ")));
        }
    }
    if let Some(body) = &endpoint.request_body {
        out.push_str(&format!("    body: {}\n", body_label(body)));
    }
    if let Some(example) = &endpoint.response_example {
        out.push_str(&format!("    response ({}):\n", endpoint.response_status));
        out.push_str(&render_value(example, 6));
    }
    out
}

impl TextReport for AnalysisReport<'_> {
    fn render_text(&self) -> String {
        let service = self.service;
        let stats = &service.stats;
        let mut out = format!("Service: {}\n", service.name);
        out.push_str(&format!(
            "Base URL: {}\n",
            service.base_url.as_deref().unwrap_or("(none)")
        ));
        out.push_str(&format!("Auth: {}\n", service.auth.describe()));
        out.push_str(&format!(
            "Capture: {} entries, {} kept, {} skipped (filtered: {} static, {} beacon, {} content type)\n",
            stats.total_entries,
            stats.kept,
            stats.skipped,
            stats.filtered_static,
            stats.filtered_beacon,
            stats.filtered_content_type
        ));

        out.push_str(&format!("\nEndpoints ({}):\n", self.endpoint_count));
        if service.endpoints.is_empty() {
            out.push_str("  none found\n");
        }
        for endpoint in &service.endpoints {
            out.push_str(&render_endpoint(endpoint));
        }

        if !service.warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for warning in &service.warnings {
                out.push_str(&format!("  - {warning}\n"));
            }
        }
        if !service.skipped.is_empty() {
            out.push_str("\nSkipped entries:\n");
            for skipped in &service.skipped {
                out.push_str(&format!("  - #{}: {}\n", skipped.index, skipped.reason));
            }
        }
        out
    }
}

pub fn execute(args: &AnalyzeArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let service = shared::build_service(&args.capture.capture, None, settings)?;
    let formatter = Formatter::new(args.format.format);
    let output = formatter.format(&AnalysisReport::new(&service));
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
    Ok(())
}
