pub mod token;
pub mod token_cache;

pub use token::TokenState;
pub use token_cache::TokenCache;
