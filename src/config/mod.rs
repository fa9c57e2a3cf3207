//! Service configuration: YAML file, env expansion, defaults, validation.

pub mod helper;
pub mod proc_loader;
pub mod proc_validator;
pub mod settings;

use serde::Deserialize;

use crate::config::helper::HelperConfig;
use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub helper: HelperConfig,
}
