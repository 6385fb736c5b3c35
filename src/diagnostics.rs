use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const DIAG_UNKNOWN_DIRECTIVE: &str = "W-DIRECTIVE-UNKNOWN";
pub const DIAG_MISSING_HANDLER: &str = "W-HANDLER-MISSING";
pub const DIAG_MISSING_EVENT_NAME: &str = "W-EVENT-NAME-MISSING";
pub const DIAG_MARKUP_FALLBACK: &str = "W-MARKUP-FALLBACK";

fn get_guarantee(code: &str) -> &'static str {
    match code {
        DIAG_UNKNOWN_DIRECTIVE => {
            "Unknown directives are ignored and never abort sibling or descendant bindings."
        }
        DIAG_MISSING_HANDLER => "A directive naming an absent method attaches no listener.",
        DIAG_MISSING_EVENT_NAME => "Event bindings without an event name attach no listener.",
        DIAG_MARKUP_FALLBACK => {
            "Markup that cannot become a single node is injected as plain text."
        }
        _ => "Unknown diagnostic.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC
// ═══════════════════════════════════════════════════════════════════════════════

/// A non-fatal finding recorded while binding a directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    /// Model key named by the directive, when there is one.
    pub key: Option<String>,
    /// Full attribute name of the directive, e.g. `v-on:click`.
    pub directive: Option<String>,
}

impl Diagnostic {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            key: None,
            directive: None,
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_directive(mut self, directive: &str) -> Self {
        self.directive = Some(directive.to_string());
        self
    }

    pub fn guarantee(&self) -> &'static str {
        get_guarantee(&self.code)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors that abort a compile pass.
///
/// Per-directive problems never surface here; they are collected as [`Diagnostic`]s.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("template has no root element")]
    MissingRoot,

    #[error("view root must be an element node")]
    RootNotElement,

    #[error("invalid compile options: {0}")]
    InvalidOptions(String),

    #[error("interpolation delimiters do not form a valid pattern: {0}")]
    InvalidDelimiters(#[from] regex::Error),

    #[error("failed to read compile options: {0}")]
    Config(#[from] serde_json::Error),
}
