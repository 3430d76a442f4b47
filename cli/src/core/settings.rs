use crate::capture::filter::FilterSettings;
use crate::capture::normalize::SegmentSettings;
use crate::classify::ClassifierSettings;
use crate::core::error::GenError;
use crate::core::json::ExampleLimits;
use crate::model::BuilderSettings;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Heuristics used across the pipeline. Every field has a default, so a
/// settings file only needs the values it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub filter: FilterSettings,
    pub segments: SegmentSettings,
    pub examples: ExampleLimits,
    pub classifier: ClassifierSettings,
    pub builder: BuilderSettings,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, GenError> {
        tracing::debug!("Loading settings from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| GenError::file(path, e))?;
        Self::from_json(&text)
    }

    pub fn load_optional(path: Option<&str>) -> Result<Self, GenError> {
        match path {
            Some(path) => Self::load(Path::new(path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, GenError> {
        let settings: Settings = serde_json::from_str(text)
            .map_err(|e| GenError::Config(format!("invalid settings file: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), GenError> {
        let ratio = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(GenError::Config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )))
            }
        };
        ratio("classifier.coverage_threshold", self.classifier.coverage_threshold)?;
        ratio("builder.host_tie_ratio", self.builder.host_tie_ratio)?;

        if self.segments.opaque_min_length == 0 {
            return Err(GenError::Config(
                "segments.opaque_min_length must be at least 1".to_string(),
            ));
        }
        for pattern in &self.segments.extra_patterns {
            Regex::new(pattern).map_err(|e| {
                GenError::Config(format!("invalid segment pattern '{pattern}': {e}"))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_override() {
        let settings = Settings::from_json(
            r#"{"classifier": {"coverage_threshold": 0.5}, "segments": {"extra_patterns": ["^v[0-9]+$"]}}"#,
        )
        .unwrap();
        assert_eq!(settings.classifier.coverage_threshold, 0.5);
        assert_eq!(settings.segments.extra_patterns, vec!["^v[0-9]+$"]);
        assert_eq!(settings.filter, FilterSettings::default());
    }

    #[test]
    fn test_unknown_field_is_config_error() {
        let err = Settings::from_json(r#"{"filters": {}}"#).unwrap_err();
        assert!(matches!(err, GenError::Config(_)));
    }

    #[test]
    fn test_out_of_range_threshold() {
        let err = Settings::from_json(r#"{"classifier": {"coverage_threshold": 2}}"#).unwrap_err();
        assert!(err.to_string().contains("coverage_threshold"));
    }

    #[test]
    fn test_bad_regex() {
        let err = Settings::from_json(r#"{"segments": {"extra_patterns": ["("]}}"#).unwrap_err();
        assert!(err.to_string().contains("invalid segment pattern"));
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let err = Settings::load(Path::new("definitely/missing/settings.json")).unwrap_err();
        assert!(matches!(err, GenError::File { .. }));
    }
}
