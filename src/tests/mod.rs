#[cfg(test)]
pub mod common;

mod background_refresh;
