//! The object cache: resolved instances kept per (contract, implementation) pair.

use crate::catalog::ImplementationDescriptor;
use crate::error::{Error, Result};
use crate::instance::Instance;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// A cached instance together with what it was resolved for.
#[derive(Clone)]
pub struct InstanceRecord {
  id: u64,
  contract: String,
  implementation: ImplementationDescriptor,
  instance: Instance,
  allow_multiple: bool,
}

impl InstanceRecord {
  pub fn new(
    contract: impl Into<String>,
    implementation: ImplementationDescriptor,
    instance: Instance,
    allow_multiple: bool,
  ) -> Self {
    Self {
      id: NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed),
      contract: contract.into(),
      implementation,
      instance,
      allow_multiple,
    }
  }

  /// Process-unique label, increasing in creation order.
  pub fn id(&self) -> u64 {
    self.id
  }

  pub fn contract(&self) -> &str {
    &self.contract
  }

  pub fn implementation(&self) -> &ImplementationDescriptor {
    &self.implementation
  }

  pub fn instance(&self) -> &Instance {
    &self.instance
  }

  pub fn allow_multiple(&self) -> bool {
    self.allow_multiple
  }

  fn is_for(&self, contract: &str, implementation: &ImplementationDescriptor) -> bool {
    self.contract == contract && self.implementation == *implementation
  }

  fn validate(&self) -> Result<()> {
    if self.contract.trim().is_empty() {
      return Err(Error::InvalidRecord("the record has no contract".to_owned()));
    }
    if self.implementation.name().trim().is_empty() {
      return Err(Error::InvalidRecord(format!(
        "the record for \"{}\" has no implementation",
        self.contract
      )));
    }
    Ok(())
  }
}

impl fmt::Display for InstanceRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "InstanceRecord #{} - Name: {} | Contract: {} | Implementation: {}",
      self.id,
      self.implementation.short_name(),
      self.contract,
      self.implementation.name()
    )
  }
}

impl fmt::Debug for InstanceRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InstanceRecord")
      .field("id", &self.id)
      .field("contract", &self.contract)
      .field("implementation", &self.implementation.name())
      .field("allow_multiple", &self.allow_multiple)
      .finish()
  }
}

/// Insertion-ordered store of [`InstanceRecord`]s.
///
/// Every mutation, and every membership check that gates one, runs under a
/// single mutex. Disposal always happens after the lock is released so that
/// `Dispose` implementations may call back into the resolver.
#[derive(Default)]
pub struct ObjectCache {
  records: Mutex<Vec<InstanceRecord>>,
}

impl ObjectCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends `record`, replacing (and disposing) an existing record for the
  /// same pair unless the record allows multiples.
  pub fn insert(&self, record: InstanceRecord) -> Result<()> {
    record.validate()?;

    let (replaced, kept) = {
      let mut records = self.records.lock();
      let existing = if record.allow_multiple {
        None
      } else {
        records
          .iter()
          .position(|r| r.is_for(&record.contract, &record.implementation))
      };
      let replaced = existing.map(|index| records.remove(index));
      let kept = record.instance.clone();
      records.push(record);
      (replaced, kept)
    };

    // Re-inserting the cached instance itself must not dispose it.
    if let Some(old) = replaced.filter(|old| !Instance::ptr_eq(&old.instance, &kept)) {
      tracing::debug!(
        contract = %old.contract,
        implementation = old.implementation.name(),
        "replacing cached instance"
      );
      old.instance.dispose();
    }
    Ok(())
  }

  /// Inserts `record` unless the pair is already cached, in which case the
  /// cached instance wins and the fresh one is disposed.
  pub(crate) fn get_or_insert(&self, record: InstanceRecord) -> Result<Instance> {
    record.validate()?;

    let (instance, rejected) = {
      let mut records = self.records.lock();
      match records
        .iter()
        .position(|r| r.is_for(&record.contract, &record.implementation))
      {
        Some(index) => (records[index].instance.clone(), Some(record)),
        None => {
          let instance = record.instance.clone();
          records.push(record);
          (instance, None)
        }
      }
    };

    if let Some(rejected) = rejected.filter(|r| !Instance::ptr_eq(&r.instance, &instance)) {
      tracing::trace!(contract = %rejected.contract, "lost construction race, keeping cached instance");
      rejected.instance.dispose();
    }
    Ok(instance)
  }

  /// Inserts `record`, failing with [`Error::MultiplicityViolation`] if it
  /// disallows multiples and its pair is already cached.
  pub(crate) fn insert_new(&self, record: InstanceRecord) -> Result<Instance> {
    record.validate()?;

    let outcome = {
      let mut records = self.records.lock();
      let taken = !record.allow_multiple
        && records
          .iter()
          .any(|r| r.is_for(&record.contract, &record.implementation));
      if taken {
        let live = records
          .iter()
          .any(|r| Instance::ptr_eq(&r.instance, &record.instance));
        Err((record, live))
      } else {
        let instance = record.instance.clone();
        records.push(record);
        Ok(instance)
      }
    };

    outcome.or_else(|(rejected, live)| {
      tracing::warn!(
        contract = %rejected.contract,
        implementation = rejected.implementation.name(),
        "instance already cached and multiples are not allowed"
      );
      if !live {
        rejected.instance.dispose();
      }
      Err(Error::MultiplicityViolation {
        contract: rejected.contract,
        implementation: rejected.implementation.name().to_owned(),
      })
    })
  }

  /// The first cached instance for the pair, if any.
  pub fn find(&self, contract: &str, implementation: &ImplementationDescriptor) -> Option<Instance> {
    self
      .records
      .lock()
      .iter()
      .find(|r| r.is_for(contract, implementation))
      .map(|r| r.instance.clone())
  }

  pub fn exists_contract(&self, contract: &str) -> bool {
    self.records.lock().iter().any(|r| r.contract == contract)
  }

  pub fn exists_implementation(&self, implementation: &ImplementationDescriptor) -> bool {
    self
      .records
      .lock()
      .iter()
      .any(|r| r.implementation == *implementation)
  }

  pub fn exists_both(
    &self,
    contract: &str,
    implementation: &ImplementationDescriptor,
  ) -> Result<bool> {
    if contract.trim().is_empty() {
      return Err(Error::InvalidArgument("contract cannot be blank".to_owned()));
    }
    if implementation.name().trim().is_empty() {
      return Err(Error::InvalidArgument(
        "implementation name cannot be blank".to_owned(),
      ));
    }
    Ok(self.find(contract, implementation).is_some())
  }

  /// Every cached instance for `contract`, in insertion order.
  pub fn instances_of(&self, contract: &str) -> Vec<Instance> {
    self
      .records
      .lock()
      .iter()
      .filter(|r| r.contract == contract)
      .map(|r| r.instance.clone())
      .collect()
  }

  /// Empties the cache, disposing every disposable instance once.
  pub fn clear(&self) {
    let drained = std::mem::take(&mut *self.records.lock());
    if !drained.is_empty() {
      tracing::debug!(records = drained.len(), "clearing object cache");
    }
    for record in drained {
      record.instance.dispose();
    }
  }

  /// One human-readable line per record, in insertion order.
  pub fn snapshot(&self) -> Vec<String> {
    self.records.lock().iter().map(|r| r.to_string()).collect()
  }

  pub fn len(&self) -> usize {
    self.records.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.lock().is_empty()
  }
}

impl fmt::Debug for ObjectCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ObjectCache")
      .field("records", &*self.records.lock())
      .finish()
  }
}
