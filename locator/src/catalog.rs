//! The type catalog: which contracts exist and how implementations are built.
//!
//! Implementations are registered up front as explicit descriptors. Each
//! descriptor names the implementation and lists its constructors and the
//! factory methods other contracts may route construction through.

use crate::error::{Error, Result};
use crate::instance::{Arg, Args, Instance};
use crate::resolver::Resolver;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

type ConstructFn = dyn Fn(&Args) -> Result<Instance> + Send + Sync;
type MethodFn = dyn Fn(&Instance, &Args) -> Result<Instance> + Send + Sync;

/// Supplies the contracts and implementations known to the process.
pub trait TypeCatalog: Send + Sync {
  fn class_types(&self) -> &[ImplementationDescriptor];
  fn interface_types(&self) -> &[ContractDescriptor];
}

/// A declared contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractDescriptor {
  name: String,
}

impl ContractDescriptor {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

/// A declared parameter of a constructor or factory method.
#[derive(Clone, Copy)]
pub enum Param {
  /// The resolver handle.
  Resolver,
  Value {
    type_name: &'static str,
    accepts: fn(&(dyn Any + Send + Sync)) -> bool,
  },
}

fn accepts<T: Any>(value: &(dyn Any + Send + Sync)) -> bool {
  value.is::<T>()
}

impl Param {
  pub fn value<T: Any + Send + Sync>() -> Self {
    Param::Value {
      type_name: type_name::<T>(),
      accepts: accepts::<T>,
    }
  }

  pub(crate) fn matches(&self, arg: &Arg) -> bool {
    match (self, arg) {
      (Param::Resolver, Arg::Resolver(_)) => true,
      (Param::Value { accepts, .. }, Arg::Value(value)) => accepts(&**value),
      _ => false,
    }
  }
}

impl fmt::Debug for Param {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Param::Resolver => write!(f, "Resolver"),
      Param::Value { type_name, .. } => write!(f, "{}", type_name),
    }
  }
}

fn params_accept(params: &[Param], args: &Args) -> bool {
  params.len() == args.len() && params.iter().zip(args.iter()).all(|(p, a)| p.matches(a))
}

#[derive(Clone)]
pub struct Constructor {
  params: Vec<Param>,
  body: Arc<ConstructFn>,
}

impl Constructor {
  pub fn params(&self) -> &[Param] {
    &self.params
  }

  pub fn accepts(&self, args: &Args) -> bool {
    params_accept(&self.params, args)
  }
}

impl fmt::Debug for Constructor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Constructor").field(&self.params).finish()
  }
}

/// A named method on an implementation that produces instances for other contracts.
#[derive(Clone)]
pub struct FactoryMethod {
  params: Vec<Param>,
  body: Arc<MethodFn>,
}

impl FactoryMethod {
  pub fn params(&self) -> &[Param] {
    &self.params
  }

  pub(crate) fn invoke(&self, factory: &Instance, args: &Args) -> Result<Instance> {
    (self.body)(factory, args)
  }
}

impl fmt::Debug for FactoryMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("FactoryMethod").field(&self.params).finish()
  }
}

struct Implementation {
  name: String,
  constructors: Vec<Constructor>,
  methods: Vec<(String, FactoryMethod)>,
}

/// Handle to a concrete, constructible implementation.
///
/// Cheap to clone. Two descriptors are equal when their names are equal.
#[derive(Clone)]
pub struct ImplementationDescriptor {
  inner: Arc<Implementation>,
}

impl ImplementationDescriptor {
  pub fn builder(name: impl Into<String>) -> ImplementationBuilder {
    ImplementationBuilder {
      name: name.into(),
      constructors: Vec::new(),
      methods: Vec::new(),
    }
  }

  /// Fully-qualified name, matched against a binding's implementation.
  pub fn name(&self) -> &str {
    &self.inner.name
  }

  /// The last path segment of the name.
  pub fn short_name(&self) -> &str {
    let name = self.name();
    name
      .rsplit(|c: char| c == ':' || c == '.')
      .next()
      .unwrap_or(name)
  }

  pub fn constructors(&self) -> &[Constructor] {
    &self.inner.constructors
  }

  pub fn method(&self, name: &str) -> Option<&FactoryMethod> {
    self
      .inner
      .methods
      .iter()
      .find(|(method, _)| method == name)
      .map(|(_, method)| method)
  }

  pub fn has_default_constructor(&self) -> bool {
    self.constructors().iter().any(|c| c.params.is_empty())
  }

  pub fn has_resolver_constructor(&self) -> bool {
    self
      .constructors()
      .iter()
      .any(|c| matches!(c.params.as_slice(), [Param::Resolver]))
  }

  /// Runs the first constructor whose parameters accept `args`.
  pub(crate) fn construct(&self, contract: &str, args: &Args) -> Result<Instance> {
    let constructor = self
      .constructors()
      .iter()
      .find(|c| c.accepts(args))
      .ok_or_else(|| Error::MissingConstructorArguments {
        contract: contract.to_owned(),
        implementation: self.name().to_owned(),
        supplied: args.len(),
      })?;
    (constructor.body)(args)
  }
}

impl PartialEq for ImplementationDescriptor {
  fn eq(&self, other: &Self) -> bool {
    self.name() == other.name()
  }
}

impl Eq for ImplementationDescriptor {}

impl fmt::Debug for ImplementationDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ImplementationDescriptor")
      .field("name", &self.inner.name)
      .field("constructors", &self.inner.constructors)
      .field(
        "methods",
        &self.inner.methods.iter().map(|(name, _)| name).collect::<Vec<_>>(),
      )
      .finish()
  }
}

pub struct ImplementationBuilder {
  name: String,
  constructors: Vec<Constructor>,
  methods: Vec<(String, FactoryMethod)>,
}

impl ImplementationBuilder {
  /// Adds a constructor taking no arguments.
  pub fn default_constructor(
    self,
    body: impl Fn() -> Result<Instance> + Send + Sync + 'static,
  ) -> Self {
    self.constructor(Vec::new(), move |_| body())
  }

  /// Adds a constructor whose only argument is the resolver.
  pub fn resolver_constructor(
    self,
    body: impl Fn(&Resolver) -> Result<Instance> + Send + Sync + 'static,
  ) -> Self {
    self.constructor(vec![Param::Resolver], move |args| body(&args.resolver(0)?))
  }

  pub fn constructor(
    mut self,
    params: Vec<Param>,
    body: impl Fn(&Args) -> Result<Instance> + Send + Sync + 'static,
  ) -> Self {
    self.constructors.push(Constructor {
      params,
      body: Arc::new(body),
    });
    self
  }

  /// Adds a named factory method. The first closure argument is the factory instance.
  pub fn method(
    mut self,
    name: impl Into<String>,
    params: Vec<Param>,
    body: impl Fn(&Instance, &Args) -> Result<Instance> + Send + Sync + 'static,
  ) -> Self {
    self.methods.push((
      name.into(),
      FactoryMethod {
        params,
        body: Arc::new(body),
      },
    ));
    self
  }

  pub fn build(self) -> ImplementationDescriptor {
    ImplementationDescriptor {
      inner: Arc::new(Implementation {
        name: self.name,
        constructors: self.constructors,
        methods: self.methods,
      }),
    }
  }
}

/// A type catalog populated explicitly at startup.
#[derive(Clone, Default, Debug)]
pub struct StaticTypeCatalog {
  classes: Vec<ImplementationDescriptor>,
  interfaces: Vec<ContractDescriptor>,
}

impl StaticTypeCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_contract(mut self, name: impl Into<String>) -> Self {
    self.add_contract(name);
    self
  }

  pub fn with_implementation(mut self, implementation: ImplementationDescriptor) -> Self {
    self.add_implementation(implementation);
    self
  }

  pub fn add_contract(&mut self, name: impl Into<String>) {
    self.interfaces.push(ContractDescriptor::new(name));
  }

  pub fn add_implementation(&mut self, implementation: ImplementationDescriptor) {
    self.classes.push(implementation);
  }
}

impl TypeCatalog for StaticTypeCatalog {
  fn class_types(&self) -> &[ImplementationDescriptor] {
    &self.classes
  }

  fn interface_types(&self) -> &[ContractDescriptor] {
    &self.interfaces
  }
}
