//! The `Resolver` handle and its builder.

use crate::cache::{InstanceRecord, ObjectCache};
use crate::catalog::{ImplementationDescriptor, TypeCatalog};
use crate::config::ResolverConfig;
use crate::core::ResolutionGuard;
use crate::error::{Error, Result};
use crate::instance::{Arg, Args, Instance};
use crate::mapper::Mapper;
use crate::module::{ModulePipeline, ModuleRun, ResolverModule};
use crate::registration::{Binding, BindingCatalog, RegistrationFile};
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Per-call resolution options.
///
/// Constructor arguments and a module run are alternative strategies; a
/// request carrying both is rejected with
/// [`Error::AmbiguousResolutionRequest`].
#[derive(Clone, Default, Debug)]
pub struct Request {
  args: Option<Args>,
  modules: Option<ModuleRun>,
}

impl Request {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_args(mut self, args: impl Into<Args>) -> Self {
    self.args = Some(args.into());
    self
  }

  pub fn with_modules(mut self, run: ModuleRun) -> Self {
    self.modules = Some(run);
    self
  }

  fn ensure_unambiguous(&self, contract: &str) -> Result<()> {
    if self.args.is_some() && self.modules.is_some() {
      return Err(Error::AmbiguousResolutionRequest {
        contract: contract.to_owned(),
      });
    }
    Ok(())
  }
}

impl From<Args> for Request {
  fn from(args: Args) -> Self {
    Request::new().with_args(args)
  }
}

impl From<ModuleRun> for Request {
  fn from(run: ModuleRun) -> Self {
    Request::new().with_modules(run)
  }
}

/// Every cached instance of one contract, captured when it was requested.
///
/// Cloning is cheap and each clone can be iterated any number of times.
#[derive(Clone, Debug)]
pub struct Instances {
  contract: String,
  items: Arc<[Instance]>,
}

impl Instances {
  pub fn contract(&self) -> &str {
    &self.contract
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
    self.items.iter()
  }
}

impl<'a> IntoIterator for &'a Instances {
  type Item = &'a Instance;
  type IntoIter = std::slice::Iter<'a, Instance>;

  fn into_iter(self) -> Self::IntoIter {
    self.items.iter()
  }
}

struct Shared {
  mapper: Mapper,
  cache: ObjectCache,
  modules: ModulePipeline,
}

impl Drop for Shared {
  fn drop(&mut self) {
    self.cache.clear();
  }
}

/// Resolves contracts to instances.
///
/// A `Resolver` is a cheap handle: clones share the same object cache and
/// module list. Construct one per process (or per test) and pass it to
/// whoever needs it.
///
/// Cached disposables are disposed when the last handle is dropped. An
/// instance that keeps the resolver it was built with (a `(Resolver)`
/// constructor, say) holds a handle itself, so while it is cached the last
/// handle never drops. Call [`Resolver::clear_cache`] on shutdown to break
/// that cycle.
#[derive(Clone)]
pub struct Resolver {
  inner: Arc<Shared>,
}

impl Resolver {
  /// A resolver with the built-in [`FactoryModule`](crate::FactoryModule) registered.
  pub fn new(
    bindings: impl BindingCatalog + 'static,
    types: impl TypeCatalog + 'static,
  ) -> Self {
    Self::from_parts(Arc::new(bindings), Arc::new(types), ModulePipeline::with_defaults())
  }

  pub fn builder() -> ResolverBuilder {
    ResolverBuilder::default()
  }

  fn from_parts(
    bindings: Arc<dyn BindingCatalog>,
    types: Arc<dyn TypeCatalog>,
    modules: ModulePipeline,
  ) -> Self {
    Self {
      inner: Arc::new(Shared {
        mapper: Mapper::new(bindings, types),
        cache: ObjectCache::new(),
        modules,
      }),
    }
  }

  // --- Catalog access ---

  pub fn binding(&self, contract: &str) -> Result<Binding> {
    self.inner.mapper.binding(contract)
  }

  /// The implementation `contract` is currently bound to.
  pub fn implementation_of(&self, contract: &str) -> Result<ImplementationDescriptor> {
    self.inner.mapper.resolve_implementation(contract)
  }

  pub fn types(&self) -> &dyn TypeCatalog {
    self.inner.mapper.types()
  }

  pub fn cache(&self) -> &ObjectCache {
    &self.inner.cache
  }

  pub fn modules(&self) -> &ModulePipeline {
    &self.inner.modules
  }

  // --- Resolve (cached) ---

  /// Returns the cached instance for `contract`, creating and caching it first
  /// if needed.
  pub fn resolve(&self, contract: &str) -> Result<Instance> {
    self.resolve_with(contract, Request::new())
  }

  pub fn resolve_with(&self, contract: &str, request: impl Into<Request>) -> Result<Instance> {
    let request = request.into();
    request.ensure_unambiguous(contract)?;

    let implementation = self.implementation_of(contract)?;
    if let Some(found) = self.inner.cache.find(contract, &implementation) {
      tracing::trace!(contract, "resolved from cache");
      return Ok(found);
    }

    // Built outside any lock; a racing resolve of the same pair may build too,
    // and `get_or_insert` keeps the first record.
    let _guard = ResolutionGuard::enter(contract)?;
    let record = self.build_record(contract, &implementation, request)?;
    tracing::debug!(contract, implementation = implementation.name(), "caching new instance");
    self.inner.cache.get_or_insert(record)
  }

  pub fn resolve_as<I: ?Sized + Any + Send + Sync>(&self, contract: &str) -> Result<Arc<I>> {
    downcast(contract, self.resolve(contract)?)
  }

  // --- Resolve new ---

  /// Always creates a new instance and caches it.
  ///
  /// Fails with [`Error::MultiplicityViolation`] when the binding disallows
  /// multiples and an instance of the pair is already cached.
  pub fn resolve_new(&self, contract: &str) -> Result<Instance> {
    self.resolve_new_with(contract, Request::new())
  }

  pub fn resolve_new_with(&self, contract: &str, request: impl Into<Request>) -> Result<Instance> {
    let request = request.into();
    request.ensure_unambiguous(contract)?;

    let implementation = self.implementation_of(contract)?;
    let binding = self.binding(contract)?;
    if !binding.allow_multiple && self.inner.cache.exists_both(contract, &implementation)? {
      return Err(Error::MultiplicityViolation {
        contract: contract.to_owned(),
        implementation: implementation.name().to_owned(),
      });
    }

    let _guard = ResolutionGuard::enter(contract)?;
    let record = self.build_record(contract, &implementation, request)?;
    self.inner.cache.insert_new(record)
  }

  pub fn resolve_new_as<I: ?Sized + Any + Send + Sync>(&self, contract: &str) -> Result<Arc<I>> {
    downcast(contract, self.resolve_new(contract)?)
  }

  // --- Resolve all ---

  /// Every cached instance of `contract`, in the order they were cached.
  pub fn resolve_all(&self, contract: &str) -> Result<Instances> {
    if contract.trim().is_empty() {
      return Err(Error::ContractNotFound {
        contract: contract.to_owned(),
      });
    }
    let items = self.inner.cache.instances_of(contract);
    if items.is_empty() {
      return Err(Error::NoInstancesFound {
        contract: contract.to_owned(),
      });
    }
    Ok(Instances {
      contract: contract.to_owned(),
      items: items.into(),
    })
  }

  pub fn resolve_all_as<I: ?Sized + Any + Send + Sync>(&self, contract: &str) -> Result<Vec<Arc<I>>> {
    self
      .resolve_all(contract)?
      .iter()
      .map(|instance| downcast(contract, instance.clone()))
      .collect()
  }

  // --- Resolve without caching ---

  /// Creates an instance without reading or writing the cache.
  pub fn resolve_without_caching(&self, contract: &str) -> Result<Instance> {
    self.resolve_without_caching_with(contract, Request::new())
  }

  pub fn resolve_without_caching_with(
    &self,
    contract: &str,
    request: impl Into<Request>,
  ) -> Result<Instance> {
    let request = request.into();
    request.ensure_unambiguous(contract)?;

    let implementation = self.implementation_of(contract)?;
    let _guard = ResolutionGuard::enter(contract)?;
    let (instance, _) = self.build_instance(contract, &implementation, request)?;
    Ok(instance)
  }

  // --- Object cache ---

  /// Empties the cache, disposing each cached disposable once. This is the
  /// teardown step for resolvers whose cached instances hold a handle.
  pub fn clear_cache(&self) {
    self.inner.cache.clear();
  }

  pub fn view_cache(&self) -> Vec<String> {
    self.inner.cache.snapshot()
  }

  // --- Modules ---

  pub fn register_module(&self, module: Arc<dyn ResolverModule>) {
    self.inner.modules.register(module);
  }

  pub fn remove_module(&self, module: &Arc<dyn ResolverModule>) -> bool {
    self.inner.modules.unregister(module)
  }

  // --- PRIVATE HELPERS ---

  fn build_record(
    &self,
    contract: &str,
    implementation: &ImplementationDescriptor,
    request: Request,
  ) -> Result<InstanceRecord> {
    let (instance, binding) = self.build_instance(contract, implementation, request)?;
    Ok(InstanceRecord::new(
      contract,
      implementation.clone(),
      instance,
      binding.allow_multiple,
    ))
  }

  fn build_instance(
    &self,
    contract: &str,
    implementation: &ImplementationDescriptor,
    request: Request,
  ) -> Result<(Instance, Binding)> {
    let binding = self.binding(contract)?;
    let instance = match request.modules {
      Some(run) => self.inner.modules.run(contract, self, None, &run)?,
      None => {
        let args = self.supply_self_if_needed(contract, &binding, implementation, request.args)?;
        self
          .inner
          .mapper
          .construct(contract, &binding, implementation, &args, self)?
      }
    };
    Ok((instance, binding))
  }

  /// Passes the resolver as the sole argument when no arguments were given
  /// and the implementation only offers a `(Resolver)` constructor.
  fn supply_self_if_needed(
    &self,
    contract: &str,
    binding: &Binding,
    implementation: &ImplementationDescriptor,
    args: Option<Args>,
  ) -> Result<Args> {
    let args = args.unwrap_or_default();
    if !args.is_empty() || binding.has_factory() || implementation.has_default_constructor() {
      return Ok(args);
    }
    if implementation.has_resolver_constructor() {
      return Ok(Args::from(vec![Arg::Resolver(self.clone())]));
    }
    Err(Error::MissingConstructorArguments {
      contract: contract.to_owned(),
      implementation: implementation.name().to_owned(),
      supplied: 0,
    })
  }
}

impl fmt::Debug for Resolver {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Resolver")
      .field("cache", &self.inner.cache)
      .field("modules", &self.inner.modules)
      .finish()
  }
}

fn downcast<I: ?Sized + Any + Send + Sync>(contract: &str, instance: Instance) -> Result<Arc<I>> {
  instance.downcast::<I>().ok_or_else(|| Error::TypeMismatch {
    contract: contract.to_owned(),
    expected: type_name::<Arc<I>>(),
  })
}

/// Assembles a [`Resolver`].
pub struct ResolverBuilder {
  bindings: Option<Arc<dyn BindingCatalog>>,
  types: Option<Arc<dyn TypeCatalog>>,
  modules: Vec<Arc<dyn ResolverModule>>,
  factory_module: bool,
}

impl Default for ResolverBuilder {
  fn default() -> Self {
    Self {
      bindings: None,
      types: None,
      modules: Vec::new(),
      factory_module: true,
    }
  }
}

impl ResolverBuilder {
  pub fn bindings(mut self, bindings: impl BindingCatalog + 'static) -> Self {
    self.bindings = Some(Arc::new(bindings));
    self
  }

  pub fn types(mut self, types: impl TypeCatalog + 'static) -> Self {
    self.types = Some(Arc::new(types));
    self
  }

  /// Registers a module after the built-in ones.
  pub fn module(mut self, module: impl ResolverModule + 'static) -> Self {
    self.modules.push(Arc::new(module));
    self
  }

  /// Leaves the built-in [`FactoryModule`](crate::FactoryModule) out of the module list.
  ///
  /// Bindings that declare a factory still construct through it on the
  /// direct path.
  pub fn without_factory_module(mut self) -> Self {
    self.factory_module = false;
    self
  }

  /// Applies a [`ResolverConfig`]: bindings come from its registration file.
  pub fn config(mut self, config: &ResolverConfig) -> Self {
    self.bindings = Some(Arc::new(RegistrationFile::new(config.registration_file.clone())));
    self.factory_module = config.factory_module;
    self
  }

  pub fn build(self) -> Result<Resolver> {
    let bindings = self
      .bindings
      .ok_or_else(|| Error::Build("no binding catalog was configured".to_owned()))?;
    let types = self
      .types
      .ok_or_else(|| Error::Build("no type catalog was configured".to_owned()))?;

    let modules = if self.factory_module {
      ModulePipeline::with_defaults()
    } else {
      ModulePipeline::new()
    };
    for module in self.modules {
      modules.register(module);
    }
    Ok(Resolver::from_parts(bindings, types, modules))
  }
}

impl fmt::Debug for ResolverBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResolverBuilder")
      .field("bindings", &self.bindings.is_some())
      .field("types", &self.types.is_some())
      .field("modules", &self.modules.len())
      .field("factory_module", &self.factory_module)
      .finish()
  }
}
