//! Resolver modules: pluggable overrides of the default construction path.

use crate::catalog::Param;
use crate::error::{Error, Result};
use crate::instance::{Arg, Args, Instance};
use crate::registration::Binding;
use crate::resolver::Resolver;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A handler that may supply or replace the instance produced for a contract.
///
/// `existing` is the candidate produced by the modules that ran before this
/// one. Modules that have nothing to add for the contract should return it
/// unchanged (or `None`, which leaves it in place).
pub trait ResolverModule: Send + Sync {
  fn name(&self) -> &str {
    std::any::type_name::<Self>()
  }

  fn execute(
    &self,
    contract: &str,
    resolver: &Resolver,
    existing: Option<Instance>,
  ) -> Result<Option<Instance>>;
}

/// Custom per-module step: `(candidate, module, contract, resolver) -> candidate`.
pub type ModuleLogic = Arc<
  dyn Fn(Option<Instance>, &dyn ResolverModule, &str, &Resolver) -> Result<Option<Instance>>
    + Send
    + Sync,
>;

/// Reorders or subsets the module list before a run.
pub type ModuleFilter =
  Arc<dyn Fn(Vec<Arc<dyn ResolverModule>>) -> Vec<Arc<dyn ResolverModule>> + Send + Sync>;

/// How a module run folds over the registered modules.
///
/// The default runs every module's [`ResolverModule::execute`] in
/// registration order.
#[derive(Clone, Default)]
pub struct ModuleRun {
  logic: Option<ModuleLogic>,
  filter: Option<ModuleFilter>,
}

impl ModuleRun {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_logic(
    mut self,
    logic: impl Fn(Option<Instance>, &dyn ResolverModule, &str, &Resolver) -> Result<Option<Instance>>
      + Send
      + Sync
      + 'static,
  ) -> Self {
    self.logic = Some(Arc::new(logic));
    self
  }

  pub fn with_filter(
    mut self,
    filter: impl Fn(Vec<Arc<dyn ResolverModule>>) -> Vec<Arc<dyn ResolverModule>>
      + Send
      + Sync
      + 'static,
  ) -> Self {
    self.filter = Some(Arc::new(filter));
    self
  }
}

impl fmt::Debug for ModuleRun {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ModuleRun")
      .field("logic", &self.logic.is_some())
      .field("filter", &self.filter.is_some())
      .finish()
  }
}

/// Ordered, runtime-mutable list of modules.
#[derive(Default)]
pub struct ModulePipeline {
  modules: RwLock<Vec<Arc<dyn ResolverModule>>>,
}

impl ModulePipeline {
  pub fn new() -> Self {
    Self::default()
  }

  /// A pipeline holding the built-in [`FactoryModule`].
  pub fn with_defaults() -> Self {
    let pipeline = Self::new();
    pipeline.register(Arc::new(FactoryModule));
    pipeline
  }

  pub fn register(&self, module: Arc<dyn ResolverModule>) {
    tracing::debug!(module = module.name(), "registering resolver module");
    self.modules.write().push(module);
  }

  /// Removes the first registration of exactly this module.
  pub fn unregister(&self, module: &Arc<dyn ResolverModule>) -> bool {
    let mut modules = self.modules.write();
    match modules.iter().position(|m| same_module(m, module)) {
      Some(index) => {
        modules.remove(index);
        true
      }
      None => false,
    }
  }

  pub fn snapshot(&self) -> Vec<Arc<dyn ResolverModule>> {
    self.modules.read().clone()
  }

  pub fn len(&self) -> usize {
    self.modules.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.modules.read().is_empty()
  }

  /// Folds the (filtered) module list over `candidate`.
  ///
  /// A module result replaces the candidate only when it is `Some`, so the
  /// last module to produce a value wins.
  pub fn run(
    &self,
    contract: &str,
    resolver: &Resolver,
    candidate: Option<Instance>,
    run: &ModuleRun,
  ) -> Result<Instance> {
    let mut modules = self.snapshot();
    if let Some(filter) = &run.filter {
      modules = filter(modules);
    }

    let mut current = candidate;
    for module in &modules {
      let produced = match &run.logic {
        Some(logic) => logic(current.clone(), module.as_ref(), contract, resolver)?,
        None => module.execute(contract, resolver, current.clone())?,
      };
      if produced.is_some() {
        tracing::trace!(contract, module = module.name(), "module produced a candidate");
        current = produced;
      }
    }

    current.ok_or_else(|| Error::ModuleChainExhausted {
      contract: contract.to_owned(),
      modules: modules.len(),
    })
  }
}

impl fmt::Debug for ModulePipeline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let modules = self.modules.read();
    f.debug_list()
      .entries(modules.iter().map(|m| m.name()))
      .finish()
  }
}

fn same_module(a: &Arc<dyn ResolverModule>, b: &Arc<dyn ResolverModule>) -> bool {
  Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Built-in module that builds instances through a registered factory.
///
/// For a contract whose binding declares `Factory` and `FactoryMethod`, the
/// factory contract is resolved (and cached) through the resolver and the
/// named method is invoked on it. Other contracts pass through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct FactoryModule;

impl FactoryModule {
  pub(crate) fn produce(contract: &str, binding: &Binding, resolver: &Resolver) -> Result<Instance> {
    let (factory_contract, method_name) =
      binding
        .factory_target()
        .ok_or_else(|| Error::RegistrationInvalid {
          contract: contract.to_owned(),
          reason: "no factory is registered".to_owned(),
        })?;
    let not_found = |reason: String| Error::FactoryNotFound {
      contract: contract.to_owned(),
      factory: factory_contract.to_owned(),
      reason,
    };

    let factory_binding = resolver.binding(factory_contract)?;
    let declared = resolver
      .types()
      .interface_types()
      .iter()
      .any(|c| c.name() == factory_binding.contract);
    if !declared {
      return Err(not_found(format!(
        "no known contract, searched for \"{}\"",
        factory_binding.implementation
      )));
    }

    let implementation = resolver
      .implementation_of(factory_contract)
      .map_err(|err| match err {
        Error::ImplementationNotFound { implementation, .. } => {
          not_found(format!("no known implementation \"{}\"", implementation))
        }
        other => other,
      })?;
    let method = implementation.method(method_name).ok_or_else(|| {
      not_found(format!(
        "\"{}\" has no method \"{}\"",
        implementation.name(),
        method_name
      ))
    })?;
    let args = match method.params() {
      [] => Args::new(),
      [Param::Resolver] => Args::from(vec![Arg::Resolver(resolver.clone())]),
      params => {
        return Err(Error::UnsupportedFactorySignature {
          contract: contract.to_owned(),
          factory: factory_contract.to_owned(),
          method: method_name.to_owned(),
          arity: params.len(),
        })
      }
    };

    let factory = resolver.resolve(factory_contract)?;
    tracing::debug!(
      contract,
      factory = factory_contract,
      method = method_name,
      "constructing through factory"
    );
    method.invoke(&factory, &args)
  }
}

impl ResolverModule for FactoryModule {
  fn name(&self) -> &str {
    "FactoryModule"
  }

  fn execute(
    &self,
    contract: &str,
    resolver: &Resolver,
    existing: Option<Instance>,
  ) -> Result<Option<Instance>> {
    if existing.is_some() {
      return Ok(existing);
    }
    let binding = resolver.binding(contract)?;
    if !binding.has_factory() {
      return Ok(None);
    }
    Self::produce(contract, &binding, resolver).map(Some)
  }
}
