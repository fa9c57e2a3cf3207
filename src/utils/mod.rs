pub mod config_loader;
pub mod constants;
pub mod logging;
pub mod time;
