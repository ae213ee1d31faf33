//! Resolver configuration, read from YAML.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings a [`Resolver`](crate::Resolver) can be built from.
///
/// ```yaml
/// registration_file: config/registration.json
/// factory_module: true
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
  #[serde(default = "default_registration_file")]
  pub registration_file: PathBuf,
  /// Whether the built-in factory module joins the module list.
  #[serde(default = "default_factory_module")]
  pub factory_module: bool,
}

fn default_registration_file() -> PathBuf {
  PathBuf::from("registration.json")
}

fn default_factory_module() -> bool {
  true
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      registration_file: default_registration_file(),
      factory_module: default_factory_module(),
    }
  }
}

impl ResolverConfig {
  pub fn from_yaml_str(yaml: &str) -> Result<Self> {
    serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse(e.to_string()))
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let mut config = Self::from_yaml_str(&contents)?;
    // A relative registration file is taken relative to the config file.
    if config.registration_file.is_relative() {
      if let Some(dir) = path.parent() {
        config.registration_file = dir.join(&config.registration_file);
      }
    }
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn empty_document_uses_defaults() {
    let config = ResolverConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, ResolverConfig::default());
  }

  #[test]
  fn unknown_keys_are_rejected() {
    let err = ResolverConfig::from_yaml_str("registration: x.json").unwrap_err();
    assert!(matches!(err, Error::ConfigParse(_)));
  }

  #[test]
  fn explicit_values() {
    let config =
      ResolverConfig::from_yaml_str("registration_file: /etc/app/bindings.json\nfactory_module: false")
        .unwrap();
    assert_eq!(config.registration_file, PathBuf::from("/etc/app/bindings.json"));
    assert!(!config.factory_module);
  }
}
