use std::path::{Path, PathBuf};

pub fn clean_path_str(s: &str) -> &str {
    #[cfg(windows)]
    {
        if let Some(stripped) = s.strip_prefix(r"\\?\") {
            return stripped;
        }
    }
    s
}

pub fn clean_path(path: &Path) -> String {
    let s = path.display().to_string();
    clean_path_str(&s).to_string()
}

/// Directory a generated server is written to: `<output>/<name>`.
pub fn server_dir(output: &Path, name: &str) -> PathBuf {
    output.join(name)
}

/// Joins a `/`-separated relative file name onto `root`.
pub fn file_in(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}
