use error_stack::{Context, Report};
use std::fmt;

use stack_interacts_core::validation::Rejection;
use stack_interacts_core::InteractsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliError {
    /// Config file unreadable or invalid
    ConfigError,
    /// Environment variable invalid
    EnvironmentError,
    /// User input refused by the validator
    ValidationError,
    /// Could not turn a payload into a contract call
    EncodingError,
    /// Node communication error
    ServiceError,
    /// Command needs a signed-in address
    SessionError,
    /// Username already owned, taken, or missing
    NameError,
    /// Failed to write output
    OutputError,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigError => write!(f, "Configuration error"),
            CliError::EnvironmentError => write!(f, "Environment configuration error"),
            CliError::ValidationError => write!(f, "Invalid input"),
            CliError::EncodingError => write!(f, "Unable to encode contract call"),
            CliError::ServiceError => write!(f, "Node communication error"),
            CliError::SessionError => write!(f, "No address to act for"),
            CliError::NameError => write!(f, "Username unavailable"),
            CliError::OutputError => write!(f, "Output operation failed"),
        }
    }
}

impl Context for CliError {}

#[derive(Debug, Clone)]
pub struct ConfigFileInfo {
    pub path: String,
}

impl fmt::Display for ConfigFileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config file '{}'", self.path)
    }
}

#[derive(Debug, Clone)]
pub struct RejectionInfo {
    pub field: String,
    pub kind: String,
}

impl fmt::Display for RejectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}' rejected ({})", self.field, self.kind)
    }
}

#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub api_url: String,
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stacks API at '{}'", self.api_url)
    }
}

pub trait CliErrorExt {
    fn with_config_file(self, path: impl Into<String>) -> Self;
    fn with_node(self, api_url: impl Into<String>) -> Self;
}

impl<T> CliErrorExt for Result<T, Report<CliError>> {
    fn with_config_file(self, path: impl Into<String>) -> Self {
        self.map_err(|e| e.attach(ConfigFileInfo { path: path.into() }))
    }

    fn with_node(self, api_url: impl Into<String>) -> Self {
        self.map_err(|e| e.attach(NodeInfo { api_url: api_url.into() }))
    }
}

pub fn rejection_report(rejection: &Rejection) -> Report<CliError> {
    Report::new(CliError::ValidationError).attach_printable(rejection.reason()).attach(
        RejectionInfo { field: rejection.field.to_string(), kind: rejection.kind.to_string() },
    )
}

pub trait IntoCliError<T> {
    fn into_cli_error(self, error_type: CliError) -> Result<T, Report<CliError>>;
}

impl<T> IntoCliError<T> for Result<T, InteractsError> {
    fn into_cli_error(self, error_type: CliError) -> Result<T, Report<CliError>> {
        self.map_err(|e| match e {
            InteractsError::ValidationRejected(rejection) => rejection_report(&rejection),
            InteractsError::NotSignedIn => {
                Report::new(CliError::SessionError).attach_printable(e.to_string())
            }
            InteractsError::NameAlreadyOwned { .. }
            | InteractsError::NameTaken { .. }
            | InteractsError::NoNameOwned => {
                Report::new(CliError::NameError).attach_printable(e.to_string())
            }
            other => Report::new(error_type).attach_printable(other.to_string()),
        })
    }
}

impl<T> IntoCliError<T> for Result<T, Rejection> {
    fn into_cli_error(self, _error_type: CliError) -> Result<T, Report<CliError>> {
        self.map_err(|rejection| rejection_report(&rejection))
    }
}
