//! Engine options shared by every evaluation of an assertion.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngineOptions {
    /// Fail on unbound variables and out-of-range subscripts during
    /// interpolation instead of rendering them as ""
    #[serde(default)]
    pub strict_variables: bool,
    /// Delimiter used when a multi-valued variable is interpolated as text
    #[serde(default = "default_multivalue_delimiter")]
    pub multivalue_delimiter: String,
}

fn default_multivalue_delimiter() -> String {
    ", ".to_string()
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            strict_variables: false,
            multivalue_delimiter: default_multivalue_delimiter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_options_default() {
        let options = EngineOptions::default();
        assert!(!options.strict_variables);
        assert_eq!(options.multivalue_delimiter, ", ");
    }

    #[test]
    fn test_engine_options_partial_document() {
        let options: EngineOptions = serde_json::from_str(r#"{"strictVariables": true}"#).unwrap();
        assert!(options.strict_variables);
        assert_eq!(options.multivalue_delimiter, ", ");
    }
}
