//! Application layer errors

use std::fmt;
use thiserror::Error;

use crate::domain::entities::ArgumentType;

/// General runtime errors
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Duplicate registration: {0}")]
    DuplicateRegistration(String),

    #[error("Not registered: {0}")]
    NotRegistered(String),

    #[error("Not loaded: {0}")]
    NotLoaded(String),

    #[error("Extension {extension} cannot be activated in {scope}")]
    ScopeNotAllowed { extension: String, scope: String },

    #[error("Invalid schema for command {command}: {reason}")]
    InvalidSchema { command: String, reason: String },

    #[error(transparent)]
    Argument(#[from] CommandArgumentError),

    #[error("Guild required: {0}")]
    ScopeRequired(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ResolveError> for RuntimeError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Argument(e) => RuntimeError::Argument(e),
            e @ ResolveError::ScopeRequired { .. } => RuntimeError::ScopeRequired(e.to_string()),
        }
    }
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Errors reported by the platform collaborators
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Gateway unavailable")]
    Unavailable,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Failure class of a single argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentErrorKind {
    /// No token was left for the argument
    Missing,
    /// A token was present but could not be read as the expected type
    TypeMismatch,
    /// A token was present but is not one of the allowed choices
    InvalidChoice,
}

/// Structured argument resolution failure
#[derive(Error, Debug, Clone, PartialEq)]
pub struct CommandArgumentError {
    pub name: String,
    pub expected: String,
    pub received: Option<String>,
    pub kind: ArgumentErrorKind,
}

impl CommandArgumentError {
    pub fn missing(name: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected: expected.into(),
            received: None,
            kind: ArgumentErrorKind::Missing,
        }
    }

    pub fn mismatch(name: impl Into<String>, expected: impl Into<String>, received: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected: expected.into(),
            received: Some(received.into()),
            kind: ArgumentErrorKind::TypeMismatch,
        }
    }

    pub fn invalid_choice(name: impl Into<String>, expected: impl Into<String>, received: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected: expected.into(),
            received: Some(received.into()),
            kind: ArgumentErrorKind::InvalidChoice,
        }
    }
}

impl fmt::Display for CommandArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.received) {
            (ArgumentErrorKind::Missing, _) | (_, None) => write!(
                f,
                "Argument \"{}\" is missing, expected type \"{}\".",
                self.name, self.expected
            ),
            (ArgumentErrorKind::InvalidChoice, Some(received)) => write!(
                f,
                "Argument \"{}\" received value \"{}\", which is not a valid choice in \"{}\".",
                self.name, received, self.expected
            ),
            (ArgumentErrorKind::TypeMismatch, Some(received)) => write!(
                f,
                "Argument \"{}\" expected type \"{}\", but received \"{}\".",
                self.name, self.expected, received
            ),
        }
    }
}

/// Errors raised while resolving a text command's arguments
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error(transparent)]
    Argument(#[from] CommandArgumentError),

    #[error("Argument \"{argument}\" of type \"{kind}\" can only be resolved in a guild.")]
    ScopeRequired { argument: String, kind: ArgumentType },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_error_messages_differ_per_kind() {
        let missing = CommandArgumentError::missing("target", "member");
        let mismatch = CommandArgumentError::mismatch("count", "number", "abc");
        let invalid = CommandArgumentError::invalid_choice("mode", "fast|slow", "medium");

        assert_eq!(missing.to_string(), "Argument \"target\" is missing, expected type \"member\".");
        assert!(mismatch.to_string().contains("expected type \"number\", but received \"abc\""));
        assert!(invalid.to_string().contains("not a valid choice in \"fast|slow\""));
    }

    #[test]
    fn test_resolve_error_converts_to_runtime_error() {
        let err: RuntimeError = ResolveError::ScopeRequired {
            argument: "target".to_string(),
            kind: ArgumentType::Member,
        }
        .into();
        assert!(matches!(err, RuntimeError::ScopeRequired(_)));

        let err: RuntimeError = ResolveError::from(CommandArgumentError::missing("x", "string")).into();
        assert!(matches!(err, RuntimeError::Argument(_)));
    }
}
