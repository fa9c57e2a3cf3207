//! Error types surfaced by the provider.
//!
//! All of them are `Clone`: a single refresh outcome is handed to every
//! caller that waited on it.

use std::io;

use thiserror::Error;

/// The helper process could not be started, or its pipes failed mid-run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LaunchError {
    #[error("credential helper '{executable}' not found")]
    NotFound { executable: String },

    #[error("permission denied while launching credential helper '{executable}'")]
    PermissionDenied { executable: String },

    #[error("failed to spawn credential helper '{executable}': {message}")]
    Spawn { executable: String, message: String },

    /// Spawned fine, but reading a stream or waiting for exit failed.
    #[error("i/o failure while running credential helper '{executable}': {message}")]
    Io { executable: String, message: String },
}

impl LaunchError {
    pub fn from_spawn(executable: &str, err: io::Error) -> Self {
        let executable = executable.to_owned();
        match err.kind() {
            io::ErrorKind::NotFound => LaunchError::NotFound { executable },
            io::ErrorKind::PermissionDenied => LaunchError::PermissionDenied { executable },
            _ => LaunchError::Spawn { executable, message: err.to_string() },
        }
    }

    pub fn from_io(executable: &str, err: io::Error) -> Self {
        LaunchError::Io { executable: executable.to_owned(), message: err.to_string() }
    }
}

/// Helper stdout did not decode into a credential.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("helper output is not a valid credential document: {0}")]
    Malformed(String),

    #[error("helper output is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("helper output contains an empty access token")]
    EmptyToken,

    #[error("access token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("token expiry '{value}' is not an absolute timestamp: {reason}")]
    InvalidExpiry { value: String, reason: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Launch failure or non-zero exit. Streams are kept verbatim for operators.
    #[error(
        "unable to obtain a token via '{executable}'. exit code: {exit}\n{credentials_var_name}: {credentials}\nOUTPUT: {stdout}\nERROR: {stderr}{cause}",
        exit = describe_exit(.exit_code),
        credentials = describe_var(.credentials_var),
        cause = describe_launch(.launch)
    )]
    HelperFailed {
        executable: String,
        exit_code: Option<i32>,
        credentials_var_name: String,
        credentials_var: Option<String>,
        stdout: String,
        stderr: String,
        launch: Option<LaunchError>,
    },

    #[error("credential helper returned a malformed credential: {0}")]
    MalformedCredential(#[from] ParseError),

    #[error("credential helper '{executable}' did not finish within {seconds}s")]
    Timeout { executable: String, seconds: u64 },

    /// The refresh task went away without an outcome, e.g. on runtime shutdown.
    #[error("token refresh via '{executable}' was interrupted before completing")]
    Interrupted { executable: String },
}

impl ProviderError {
    /// Short label used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            ProviderError::HelperFailed { launch: Some(_), .. } => "launch",
            ProviderError::HelperFailed { .. } => "exit",
            ProviderError::MalformedCredential(_) => "malformed",
            ProviderError::Timeout { .. } => "timeout",
            ProviderError::Interrupted { .. } => "interrupted",
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_owned(),
    }
}

fn describe_var(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("<unset>")
}

fn describe_launch(launch: &Option<LaunchError>) -> String {
    match launch {
        Some(err) => format!("\nCAUSE: {}", err),
        None => String::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn helper_failed_text_keeps_streams_and_exit_code() {
        let err = ProviderError::HelperFailed {
            executable: "gcloud".into(),
            exit_code: Some(1),
            credentials_var_name: "GOOGLE_APPLICATION_CREDENTIALS".into(),
            credentials_var: None,
            stdout: "".into(),
            stderr: "ERROR: (gcloud.config.config-helper) no active account".into(),
            launch: None,
        };
        let text = err.to_string();
        assert!(text.contains("exit code: 1"));
        assert!(text.contains("GOOGLE_APPLICATION_CREDENTIALS: <unset>"));
        assert!(text.contains("no active account"));
        assert_eq!(err.reason(), "exit");
    }

    #[test]
    fn spawn_errors_map_by_kind() {
        let not_found = LaunchError::from_spawn("nope", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(not_found, LaunchError::NotFound { executable: "nope".into() });

        let denied = LaunchError::from_spawn("nope", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(denied, LaunchError::PermissionDenied { executable: "nope".into() });
    }
}
