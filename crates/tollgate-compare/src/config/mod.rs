//! Configuration types for comparison assertions.

mod options;
mod policy;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::variables::VariableBindings;

pub use options::EngineOptions;
pub use policy::ComparisonPolicy;

/// A policy document as stored on disk (YAML or JSON).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PolicyFile {
    #[serde(flatten)]
    pub policy: ComparisonPolicy,
    #[serde(default)]
    pub options: EngineOptions,
}

/// Document syntax, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

impl PolicyFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let file = Self::parse(&contents, Format::from_path(path))?;
        file.validate()?;
        Ok(file)
    }

    pub fn parse(contents: &str, format: Format) -> Result<Self, ConfigError> {
        match format {
            Format::Json => {
                serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            Format::Yaml => {
                serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.compile().map(|_| ())
    }
}

/// Load variable bindings from a JSON object file.
pub fn load_bindings<P: AsRef<Path>>(path: P) -> Result<VariableBindings, anyhow::Error> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    match VariableBindings::from_json(&json) {
        Some(bindings) => Ok(bindings),
        None => anyhow::bail!(
            "Bindings file {} must contain a JSON object",
            path.as_ref().display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Predicate;
    use crate::value::DataType;
    use std::io::Write;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("policy.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("policy.JSON")), Format::Json);
        assert_eq!(Format::from_path(Path::new("policy.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("policy")), Format::Yaml);
    }

    #[test]
    fn test_parse_json_with_options() {
        let json = r#"{
            "expression": "${items}",
            "predicates": [{"type": "dataType", "dataType": "integer"}],
            "options": {"strictVariables": true}
        }"#;
        let file = PolicyFile::parse(json, Format::Json).unwrap();
        assert_eq!(file.policy.predicates, vec![Predicate::data_type(DataType::Integer)]);
        assert!(file.options.strict_variables);
    }

    #[test]
    fn test_parse_error_is_config_error() {
        let err = PolicyFile::parse("expression: [", Format::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file_validates() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "expression: \"${{x}}\"\npredicates:\n  - type: regex\n    pattern: \"(\""
        )
        .unwrap();

        let err = PolicyFile::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid regex"), "{err}");
    }

    #[test]
    fn test_load_bindings_requires_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        assert!(load_bindings(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": 1}}"#).unwrap();
        let bindings = load_bindings(file.path()).unwrap();
        assert_eq!(bindings.len(), 1);
    }
}
