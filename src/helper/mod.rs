//! External credential helper invocation.

pub mod runner;

pub use runner::{HelperOutput, ProcessRunner, RunHelper};

/// Arguments for `gcloud config config-helper`.
pub const DEFAULT_HELPER_ARGS: [&str; 3] = ["config", "config-helper", "--format=json"];

pub fn default_helper_args() -> Vec<String> {
    DEFAULT_HELPER_ARGS.iter().map(|arg| arg.to_string()).collect()
}
