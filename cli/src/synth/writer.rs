use crate::core::error::GenError;
use crate::core::paths;
use crate::synth::GeneratedServer;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the server under `<output>/<name>/`, replacing files that exist.
pub fn write_server(server: &GeneratedServer, output: &Path) -> Result<PathBuf, GenError> {
    let root = paths::server_dir(output, &server.name);
    for file in &server.files {
        let path = paths::file_in(&root, &file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| GenError::file(parent, e))?;
        }
        fs::write(&path, &file.contents).map_err(|e| GenError::file(&path, e))?;
        tracing::debug!("Wrote {}", path.display());
    }
    tracing::info!("Wrote {} files to {}", server.files.len(), root.display());
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::GeneratedFile;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mcpgen-writer-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_writes_nested_files() {
        let output = scratch("nested");
        let server = GeneratedServer {
            name: "svc".to_string(),
            files: vec![
                GeneratedFile {
                    path: "src/main.rs".to_string(),
                    contents: "fn main() {}\n".to_string(),
                },
                GeneratedFile {
                    path: ".env.example".to_string(),
                    contents: "X=\n".to_string(),
                },
            ],
        };
        let root = write_server(&server, &output).unwrap();
        assert_eq!(root, output.join("svc"));
        assert_eq!(
            fs::read_to_string(root.join("src").join("main.rs")).unwrap(),
            "fn main() {}\n"
        );
        assert!(root.join(".env.example").exists());
        let _ = fs::remove_dir_all(&output);
    }

    #[test]
    fn test_unwritable_target_is_file_error() {
        let output = scratch("blocked");
        fs::create_dir_all(&output).unwrap();
        // A plain file where the server directory should go.
        fs::write(output.join("svc"), "").unwrap();
        let server = GeneratedServer {
            name: "svc".to_string(),
            files: vec![GeneratedFile {
                path: "Cargo.toml".to_string(),
                contents: String::new(),
            }],
        };
        let err = write_server(&server, &output).unwrap_err();
        assert!(matches!(err, GenError::File { .. }));
        let _ = fs::remove_dir_all(&output);
    }
}
