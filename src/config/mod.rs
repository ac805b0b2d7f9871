//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load jurisdiction configuration
//! from YAML files, including the date-scoped legal rule sets that drive
//! every calculation.
//!
//! # Example
//!
//! ```no_run
//! use nomina_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/gt").unwrap();
//! println!("Loaded jurisdiction: {}", config.metadata().name);
//! ```

mod loader;
mod settings;
mod types;

pub use loader::ConfigLoader;
pub use settings::ServerSettings;
pub use types::{
    JurisdictionMetadata, LegalRuleSet, ProvisionRates, Roster, RoundingConfig, RoundingPolicy,
    SocialSecurityRates, TaxBracket,
};
