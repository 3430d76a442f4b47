pub fn app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Version string written into generated servers' build files.
pub fn generator_banner() -> String {
    format!("mcpgen {}", app_version())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_version_not_empty() {
        let version = app_version();
        assert!(!version.is_empty(), "Version should not be empty");
    }

    #[test]
    fn test_app_version_format() {
        let version = app_version();
        assert!(
            version.contains('.'),
            "Version should be in semantic format"
        );
    }

    #[test]
    fn test_generator_banner() {
        assert!(generator_banner().starts_with("mcpgen "));
    }
}
