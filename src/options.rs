use serde::{Deserialize, Serialize};

use crate::diagnostics::CompileError;

/// Wrapper element placed around injected raw markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupWrapper {
    pub tag: String,
    #[serde(default)]
    pub class: Option<String>,
}

impl Default for MarkupWrapper {
    fn default() -> Self {
        Self {
            tag: "div".to_string(),
            class: Some("child".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Attribute name prefix marking a directive.
    pub directive_prefix: String,
    /// Separates a compound directive's base name from its modifier (`on:click`).
    pub modifier_separator: char,
    /// Opening and closing interpolation delimiters.
    pub delimiters: (String, String),
    /// `None` injects markup without a wrapper, falling back to text when the
    /// markup is not a single node.
    pub markup_wrapper: Option<MarkupWrapper>,
    /// Event a two-way binding listens to for view→model writes.
    pub input_event: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            directive_prefix: "v-".to_string(),
            modifier_separator: ':',
            delimiters: ("{{".to_string(), "}}".to_string()),
            markup_wrapper: Some(MarkupWrapper::default()),
            input_event: "input".to_string(),
        }
    }
}

impl CompileOptions {
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        let options: CompileOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), CompileError> {
        if self.directive_prefix.is_empty() {
            return Err(CompileError::InvalidOptions(
                "directive prefix must not be empty".to_string(),
            ));
        }
        if self.delimiters.0.is_empty() || self.delimiters.1.is_empty() {
            return Err(CompileError::InvalidOptions(
                "interpolation delimiters must not be empty".to_string(),
            ));
        }
        if self.input_event.is_empty() {
            return Err(CompileError::InvalidOptions(
                "input event name must not be empty".to_string(),
            ));
        }
        if let Some(wrapper) = &self.markup_wrapper {
            if wrapper.tag.is_empty() {
                return Err(CompileError::InvalidOptions(
                    "markup wrapper tag must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_runtime_conventions() {
        let options = CompileOptions::default();
        assert_eq!(options.directive_prefix, "v-");
        assert_eq!(options.modifier_separator, ':');
        assert_eq!(options.delimiters, ("{{".to_string(), "}}".to_string()));
        assert_eq!(options.input_event, "input");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial_override() {
        let options = CompileOptions::from_json(
            r#"{ "directivePrefix": "x-", "delimiters": ["[[", "]]"], "markupWrapper": null }"#,
        )
        .unwrap();
        assert_eq!(options.directive_prefix, "x-");
        assert_eq!(options.delimiters.0, "[[");
        assert!(options.markup_wrapper.is_none());
        assert_eq!(options.modifier_separator, ':');
    }

    #[test]
    fn test_from_json_rejects_empty_prefix() {
        let err = CompileOptions::from_json(r#"{ "directivePrefix": "" }"#).unwrap_err();
        assert!(matches!(err, CompileError::InvalidOptions(_)));
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let err = CompileOptions::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CompileError::Config(_)));
    }
}
