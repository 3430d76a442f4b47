pub mod params;
pub mod runtime;
pub mod templates;
pub mod tools_source;
pub mod writer;

use crate::model::ServiceInfo;
use mcpgen_proxy::ToolDefinition;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation error: no API endpoints found in the capture")]
    NoEndpoints,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// `/`-separated path relative to the server directory.
    pub path: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedServer {
    pub name: String,
    pub files: Vec<GeneratedFile>,
}

#[derive(Debug, Clone, Default)]
pub struct SynthOptions {
    /// Timestamp for the README. Output is otherwise a pure function of the
    /// service model.
    pub generated_at: Option<String>,
}

pub fn synthesize(
    service: &ServiceInfo,
    options: &SynthOptions,
) -> Result<GeneratedServer, GenerationError> {
    if service.endpoints.is_empty() {
        return Err(GenerationError::NoEndpoints);
    }

    let tools: Vec<ToolDefinition> = service
        .endpoints
        .iter()
        .map(params::tool_definition)
        .collect();

    let mut files = vec![
        GeneratedFile {
            path: "Cargo.toml".to_string(),
            contents: templates::cargo_toml(service),
        },
        GeneratedFile {
            path: "src/main.rs".to_string(),
            contents: templates::main_rs(service),
        },
        GeneratedFile {
            path: "src/tools.rs".to_string(),
            contents: tools_source::render(&tools),
        },
    ];
    files.extend(runtime::MODULES.iter().map(|(name, source)| GeneratedFile {
        path: format!("src/{name}"),
        contents: source.to_string(),
    }));
    files.push(GeneratedFile {
        path: "README.md".to_string(),
        contents: templates::readme(service, &tools, options.generated_at.as_deref()),
    });
    files.push(GeneratedFile {
        path: ".env.example".to_string(),
        contents: templates::env_example(service),
    });

    tracing::debug!("Synthesized {} files for {}", files.len(), service.name);
    Ok(GeneratedServer {
        name: service.name.clone(),
        files,
    })
}
