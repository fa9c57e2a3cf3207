//! Background work that keeps the cached token warm.

pub mod token_refresh;
