//! Decoding of credential helper output.

pub mod credential;

pub use credential::{parse_credential, Credential};
