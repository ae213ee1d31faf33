//! Registration data: the declarative table binding contracts to implementations.

use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies binding metadata for a contract.
///
/// Implementations may cache whatever backs them; the resolver itself never
/// caches bindings.
pub trait BindingCatalog: Send + Sync {
  /// Returns the binding registered for `contract`.
  ///
  /// Fails with [`Error::RegistrationInvalid`] when no entry matches or the
  /// matching entry is malformed.
  fn lookup(&self, contract: &str) -> Result<Binding>;
}

/// A single registration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
  #[serde(rename = "Interface", default)]
  pub contract: String,
  #[serde(rename = "Class", default)]
  pub implementation: String,
  #[serde(rename = "Multiple", default)]
  pub allow_multiple: bool,
  #[serde(rename = "Factory", default, skip_serializing_if = "Option::is_none")]
  pub factory: Option<String>,
  #[serde(
    rename = "FactoryMethod",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub factory_method: Option<String>,
}

impl Binding {
  pub fn new(contract: impl Into<String>, implementation: impl Into<String>) -> Self {
    Self {
      contract: contract.into(),
      implementation: implementation.into(),
      allow_multiple: false,
      factory: None,
      factory_method: None,
    }
  }

  pub fn multiple(mut self) -> Self {
    self.allow_multiple = true;
    self
  }

  /// Routes construction through `method` on the instance resolved for `factory`.
  pub fn with_factory(mut self, factory: impl Into<String>, method: impl Into<String>) -> Self {
    self.factory = Some(factory.into());
    self.factory_method = Some(method.into());
    self
  }

  pub fn has_factory(&self) -> bool {
    self.factory.is_some()
  }

  /// The `(factory contract, method name)` pair, when one is declared.
  pub fn factory_target(&self) -> Option<(&str, &str)> {
    match (self.factory.as_deref(), self.factory_method.as_deref()) {
      (Some(factory), Some(method)) => Some((factory, method)),
      _ => None,
    }
  }

  pub(crate) fn validate(&self, query: &str) -> Result<()> {
    let invalid = |reason: &str| Error::RegistrationInvalid {
      contract: query.to_owned(),
      reason: reason.to_owned(),
    };

    if self.contract.trim().is_empty() || self.contract != query {
      return Err(invalid("the entry's Interface does not match the requested contract"));
    }
    if self.implementation.trim().is_empty() {
      return Err(invalid("the entry has no Class"));
    }
    match (&self.factory, &self.factory_method) {
      (Some(factory), _) if factory.trim().is_empty() => Err(invalid("Factory is blank")),
      (Some(_), None) => Err(invalid("Factory is set without a FactoryMethod")),
      (Some(_), Some(method)) if method.trim().is_empty() => {
        Err(invalid("FactoryMethod is blank"))
      }
      _ => Ok(()),
    }
  }
}

/// Binary references listed under `Assemblies` in a registration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assemblies {
  #[serde(rename = "Interfaces", default)]
  pub interfaces: Vec<String>,
  #[serde(rename = "Entities", default)]
  pub entities: Vec<String>,
}

/// An in-memory registration table.
///
/// Deserializes from the registration document:
///
/// ```json
/// {
///   "Assemblies": { "Interfaces": ["Contracts"], "Entities": ["Entities"] },
///   "Registration": [
///     { "Interface": "Greeter", "Class": "entities::EnglishGreeter", "Multiple": false }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationTable {
  #[serde(rename = "Assemblies", default)]
  assemblies: Assemblies,
  #[serde(rename = "Registration", default)]
  bindings: Vec<Binding>,
}

impl RegistrationTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_binding(mut self, binding: Binding) -> Self {
    self.bindings.push(binding);
    self
  }

  pub fn push(&mut self, binding: Binding) {
    self.bindings.push(binding);
  }

  pub fn bindings(&self) -> &[Binding] {
    &self.bindings
  }

  pub fn assemblies(&self) -> &Assemblies {
    &self.assemblies
  }

  pub fn from_json_str(json: &str) -> Result<Self> {
    serde_json::from_str(json).map_err(|e| Error::RegistrationParse(e.to_string()))
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    let contents = fs::read_to_string(path.as_ref())?;
    Self::from_json_str(&contents)
  }
}

impl BindingCatalog for RegistrationTable {
  fn lookup(&self, contract: &str) -> Result<Binding> {
    let binding = self
      .bindings
      .iter()
      .find(|binding| binding.contract == contract)
      .ok_or_else(|| Error::RegistrationInvalid {
        contract: contract.to_owned(),
        reason: "no registration entry".to_owned(),
      })?;
    binding.validate(contract)?;
    Ok(binding.clone())
  }
}

/// A registration table backed by a JSON file, parsed on first lookup.
#[derive(Debug)]
pub struct RegistrationFile {
  path: PathBuf,
  table: OnceCell<RegistrationTable>,
}

impl RegistrationFile {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      table: OnceCell::new(),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// The parsed table, loading it if this is the first access.
  pub fn table(&self) -> Result<&RegistrationTable> {
    self.table.get_or_try_init(|| {
      tracing::debug!(path = %self.path.display(), "loading registration file");
      RegistrationTable::from_path(&self.path)
    })
  }
}

impl BindingCatalog for RegistrationFile {
  fn lookup(&self, contract: &str) -> Result<Binding> {
    self.table()?.lookup(contract)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_entry_wins_on_duplicates() {
    let table = RegistrationTable::new()
      .with_binding(Binding::new("Greeter", "First"))
      .with_binding(Binding::new("Greeter", "Second"));

    assert_eq!(table.lookup("Greeter").unwrap().implementation, "First");
  }

  #[test]
  fn lookup_is_exact_match() {
    let table = RegistrationTable::new().with_binding(Binding::new("Greeter", "English"));

    assert!(matches!(
      table.lookup("greeter"),
      Err(Error::RegistrationInvalid { .. })
    ));
  }

  #[test]
  fn blank_class_is_rejected() {
    let table = RegistrationTable::new().with_binding(Binding::new("Greeter", "  "));

    let err = table.lookup("Greeter").unwrap_err();
    assert!(err.to_string().contains("Greeter"));
    assert!(matches!(err, Error::RegistrationInvalid { .. }));
  }

  #[test]
  fn factory_requires_method() {
    let mut binding = Binding::new("Widget", "Gear");
    binding.factory = Some("WidgetFactory".to_owned());
    let table = RegistrationTable::new().with_binding(binding);

    assert!(matches!(
      table.lookup("Widget"),
      Err(Error::RegistrationInvalid { .. })
    ));
  }
}
