/// Runtime modules copied into every generated server, as `src/<name>`.
pub const MODULES: &[(&str, &str)] = &[
    ("auth.rs", include_str!("../../../proxy/src/auth.rs")),
    ("config.rs", include_str!("../../../proxy/src/config.rs")),
    ("error.rs", include_str!("../../../proxy/src/error.rs")),
    ("forward.rs", include_str!("../../../proxy/src/forward.rs")),
    ("http_method.rs", include_str!("../../../proxy/src/http_method.rs")),
    ("server.rs", include_str!("../../../proxy/src/server.rs")),
    ("tool.rs", include_str!("../../../proxy/src/tool.rs")),
];

/// Module names declared by the generated `main.rs`, runtime and glue.
pub fn module_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = MODULES
        .iter()
        .map(|(file, _)| file.trim_end_matches(".rs"))
        .collect();
    names.push("tools");
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_names() {
        assert_eq!(
            module_names(),
            vec!["auth", "config", "error", "forward", "http_method", "server", "tool", "tools"]
        );
    }

    #[test]
    fn test_runtime_only_refers_to_its_own_modules() {
        for (file, source) in MODULES {
            assert!(!source.contains("mcpgen_proxy"), "{file} names the library crate");
            assert!(!source.contains("super::super"), "{file} reaches outside the crate");
        }
    }
}
