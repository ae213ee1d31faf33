//! Maps contracts to implementations and builds instances of them.

use crate::catalog::{ImplementationDescriptor, TypeCatalog};
use crate::error::{Error, Result};
use crate::instance::{Args, Instance};
use crate::module::FactoryModule;
use crate::registration::{Binding, BindingCatalog};
use crate::resolver::Resolver;
use std::sync::Arc;

pub(crate) struct Mapper {
  bindings: Arc<dyn BindingCatalog>,
  types: Arc<dyn TypeCatalog>,
}

impl Mapper {
  pub(crate) fn new(bindings: Arc<dyn BindingCatalog>, types: Arc<dyn TypeCatalog>) -> Self {
    Self { bindings, types }
  }

  pub(crate) fn types(&self) -> &dyn TypeCatalog {
    self.types.as_ref()
  }

  pub(crate) fn binding(&self, contract: &str) -> Result<Binding> {
    self.bindings.lookup(contract)
  }

  /// Fails unless `contract` names a contract declared in the type catalog.
  pub(crate) fn ensure_contract(&self, contract: &str) -> Result<()> {
    let declared = !contract.trim().is_empty()
      && self
        .types
        .interface_types()
        .iter()
        .any(|declared| declared.name() == contract);
    if declared {
      Ok(())
    } else {
      Err(Error::ContractNotFound {
        contract: contract.to_owned(),
      })
    }
  }

  pub(crate) fn resolve_implementation(&self, contract: &str) -> Result<ImplementationDescriptor> {
    self.ensure_contract(contract)?;
    let binding = self.binding(contract)?;
    self.implementation_for(&binding)
  }

  pub(crate) fn implementation_for(&self, binding: &Binding) -> Result<ImplementationDescriptor> {
    self
      .types
      .class_types()
      .iter()
      .find(|class| class.name() == binding.implementation)
      .cloned()
      .ok_or_else(|| Error::ImplementationNotFound {
        contract: binding.contract.clone(),
        implementation: binding.implementation.clone(),
      })
  }

  /// Builds an instance of `implementation` for `contract`.
  ///
  /// A binding that declares a factory routes construction through it unless
  /// the caller supplied more than one argument.
  pub(crate) fn construct(
    &self,
    contract: &str,
    binding: &Binding,
    implementation: &ImplementationDescriptor,
    args: &Args,
    resolver: &Resolver,
  ) -> Result<Instance> {
    if binding.has_factory() && args.len() <= 1 {
      return FactoryModule::produce(contract, binding, resolver);
    }
    tracing::trace!(
      contract,
      implementation = implementation.name(),
      args = args.len(),
      "constructing"
    );
    implementation.construct(contract, args)
  }
}
