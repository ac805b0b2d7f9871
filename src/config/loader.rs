//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading jurisdiction
//! metadata and legal rule sets from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::calculation::{ensure_unambiguous, resolve_rules, validate_rule_set};
use crate::error::{EngineError, EngineResult};

use super::types::{JurisdictionMetadata, LegalRuleSet, Roster};

/// Loads and provides access to a jurisdiction's payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/gt/
/// ├── jurisdiction.yaml      # Jurisdiction metadata
/// ├── roster.yaml            # Optional seed roster for the server
/// └── rule_sets/
///     └── 2024-01-01.yaml    # One legal rule set per file
/// ```
///
/// # Example
///
/// ```no_run
/// use nomina_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/gt").unwrap();
/// let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
/// let rules = loader.resolve("GT", date).unwrap();
/// println!("IGSS employee rate: {}", rules.social_security.employee_rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    metadata: JurisdictionMetadata,
    rule_sets: Vec<LegalRuleSet>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Fails if any required file is missing or invalid, if a rule set does
    /// not pass validation, or if two active rule sets of one jurisdiction
    /// start on the same date.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = load_yaml::<JurisdictionMetadata>(&path.join("jurisdiction.yaml"))?;
        let rule_sets = Self::load_rule_sets(&path.join("rule_sets"))?;

        let loader = Self::from_parts(metadata, rule_sets)?;
        info!(
            jurisdiction = %loader.metadata.code,
            rule_sets = loader.rule_sets.len(),
            "Loaded payroll configuration"
        );
        Ok(loader)
    }

    /// Builds a loader from already-deserialized parts, applying the same
    /// validation as [`ConfigLoader::load`].
    pub fn from_parts(
        metadata: JurisdictionMetadata,
        rule_sets: Vec<LegalRuleSet>,
    ) -> EngineResult<Self> {
        if metadata.utc_offset().is_none() {
            return Err(EngineError::ConfigParseError {
                path: "jurisdiction.yaml".to_string(),
                message: format!(
                    "utc_offset_hours {} is outside -23..=23",
                    metadata.utc_offset_hours
                ),
            });
        }
        for rule_set in &rule_sets {
            for warning in validate_rule_set(rule_set)? {
                warn!(
                    jurisdiction = %rule_set.jurisdiction,
                    effective_from = %rule_set.effective_from,
                    code = %warning.code,
                    "{}",
                    warning.message
                );
            }
        }
        ensure_unambiguous(&rule_sets)?;

        let mut sorted = rule_sets;
        sorted.sort_by(|a, b| {
            a.jurisdiction
                .cmp(&b.jurisdiction)
                .then(a.effective_from.cmp(&b.effective_from))
        });

        Ok(Self {
            metadata,
            rule_sets: sorted,
        })
    }

    /// Loads all rule set files from the rule set directory.
    fn load_rule_sets(dir: &Path) -> EngineResult<Vec<LegalRuleSet>> {
        let dir_str = dir.display().to_string();

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rule set files found)", dir_str),
            });
        }

        paths.iter().map(|p| load_yaml::<LegalRuleSet>(p)).collect()
    }

    /// Loads a seed roster (employees and their compensation inputs).
    pub fn load_roster<P: AsRef<Path>>(path: P) -> EngineResult<Roster> {
        load_yaml::<Roster>(path.as_ref())
    }

    /// Returns the jurisdiction metadata.
    pub fn metadata(&self) -> &JurisdictionMetadata {
        &self.metadata
    }

    /// Returns all rule sets, sorted by jurisdiction then start date.
    pub fn rule_sets(&self) -> &[LegalRuleSet] {
        &self.rule_sets
    }

    /// Resolves the rule set that applies to `jurisdiction` on `date`.
    pub fn resolve(&self, jurisdiction: &str, date: NaiveDate) -> EngineResult<LegalRuleSet> {
        resolve_rules(&self.rule_sets, jurisdiction, date).cloned()
    }
}

/// Loads and parses a YAML file.
fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
    let path_str = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
        path: path_str.clone(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
        path: path_str,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::test_support::{dec, sample_rule_set};

    fn config_path() -> &'static str {
        "./config/gt"
    }

    fn metadata() -> JurisdictionMetadata {
        JurisdictionMetadata {
            code: "GT".to_string(),
            name: "Guatemala".to_string(),
            currency: "GTQ".to_string(),
            utc_offset_hours: -6,
        }
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.metadata().code, "GT");
        assert_eq!(loader.metadata().currency, "GTQ");
        assert_eq!(loader.metadata().utc_offset_hours, -6);
        assert!(!loader.rule_sets().is_empty());
    }

    #[test]
    fn test_from_parts_rejects_out_of_range_utc_offset() {
        let mut bad = metadata();
        bad.utc_offset_hours = 30;

        let result = ConfigLoader::from_parts(bad, vec![sample_rule_set()]);

        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_shipped_rule_set_values() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let rules = loader.resolve("GT", date).unwrap();

        assert_eq!(rules.social_security.employee_rate, dec("0.0483"));
        assert_eq!(rules.social_security.employer_rate, dec("0.1067"));
        assert_eq!(rules.statutory_bonus, dec("250.00"));
        assert_eq!(rules.rounding.decimals, 2);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("jurisdiction.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_parts_sorts_by_effective_date() {
        let mut later = sample_rule_set();
        later.effective_from = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let earlier = sample_rule_set();

        let loader = ConfigLoader::from_parts(metadata(), vec![later, earlier]).unwrap();

        assert!(loader.rule_sets()[0].effective_from < loader.rule_sets()[1].effective_from);
    }

    #[test]
    fn test_from_parts_rejects_duplicate_active_rule_sets() {
        let result = ConfigLoader::from_parts(metadata(), vec![sample_rule_set(), sample_rule_set()]);

        assert!(matches!(result, Err(EngineError::AmbiguousRuleSet { .. })));
    }

    #[test]
    fn test_from_parts_rejects_malformed_bracket_table() {
        let mut rules = sample_rule_set();
        rules.tax_brackets[0].marginal_rate = dec("1.5");

        let result = ConfigLoader::from_parts(metadata(), vec![rules]);

        assert!(matches!(result, Err(EngineError::InvalidBracketTable { .. })));
    }

    #[test]
    fn test_resolve_before_any_rule_set_fails() {
        let loader = ConfigLoader::from_parts(metadata(), vec![sample_rule_set()]).unwrap();
        let date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();

        match loader.resolve("GT", date) {
            Err(EngineError::NoApplicableRuleSet { jurisdiction, date: d }) => {
                assert_eq!(jurisdiction, "GT");
                assert_eq!(d, date);
            }
            other => panic!("Expected NoApplicableRuleSet, got {:?}", other),
        }
    }

    #[test]
    fn test_load_roster_from_shipped_config() {
        let roster = ConfigLoader::load_roster("./config/gt/roster.yaml").unwrap();
        assert!(!roster.employees.is_empty());
    }
}
