//! Resolved values and constructor arguments.

use crate::error::{Error, Result};
use crate::resolver::Resolver;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Explicit release capability for resolved instances.
///
/// The object cache calls `dispose` when it drops a record, either on
/// replacement or on `clear`. Instances that never declare it are simply
/// dropped.
pub trait Dispose: Send + Sync {
  fn dispose(&self);
}

/// An opaque, cheaply cloneable resolved value.
///
/// The value is stored as an `Arc<I>` where `I` is the view chosen at
/// construction, usually a `dyn Trait` for the contract. Clones share the same
/// allocation, so identity can be checked with [`Instance::ptr_eq`].
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
  disposer: Option<Arc<dyn Dispose>>,
}

impl Instance {
  pub fn new<I: ?Sized + Any + Send + Sync>(value: Arc<I>) -> Self {
    Self {
      value: Arc::new(value),
      type_name: type_name::<I>(),
      disposer: None,
    }
  }

  /// Wraps a concrete value that is itself the disposal handle.
  pub fn disposable<T: Dispose + Any>(value: Arc<T>) -> Self {
    Self::new(value.clone()).with_dispose(value)
  }

  /// Declares the handle to dispose when the cache releases this instance.
  pub fn with_dispose<D: Dispose + 'static>(mut self, handle: Arc<D>) -> Self {
    self.disposer = Some(handle);
    self
  }

  /// Returns the stored `Arc<I>` if this instance was created with view `I`.
  pub fn downcast<I: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<I>> {
    self.value.downcast_ref::<Arc<I>>().cloned()
  }

  pub fn is<I: ?Sized + Any + Send + Sync>(&self) -> bool {
    self.value.is::<Arc<I>>()
  }

  /// Name of the view type this instance was created with.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub fn is_disposable(&self) -> bool {
    self.disposer.is_some()
  }

  /// `true` if both handles point at the same resolved value.
  pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
    Arc::ptr_eq(&a.value, &b.value)
  }

  pub(crate) fn dispose(&self) {
    if let Some(disposer) = &self.disposer {
      tracing::trace!(instance = self.type_name, "disposing instance");
      disposer.dispose();
    }
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Instance")
      .field("type", &self.type_name)
      .field("disposable", &self.is_disposable())
      .finish()
  }
}

/// One constructor or factory-method argument.
#[derive(Clone)]
pub enum Arg {
  /// The resolver handle itself.
  Resolver(Resolver),
  Value(Arc<dyn Any + Send + Sync>),
}

impl Arg {
  pub fn value<T: Any + Send + Sync>(value: T) -> Self {
    Arg::Value(Arc::new(value))
  }

  pub fn shared<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    Arg::Value(value)
  }
}

impl From<Resolver> for Arg {
  fn from(resolver: Resolver) -> Self {
    Arg::Resolver(resolver)
  }
}

impl fmt::Debug for Arg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Arg::Resolver(_) => write!(f, "Arg::Resolver"),
      Arg::Value(_) => write!(f, "Arg::Value"),
    }
  }
}

/// Positional constructor arguments.
#[derive(Clone, Default, Debug)]
pub struct Args(Vec<Arg>);

impl Args {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends an argument, builder style.
  pub fn with(mut self, arg: impl Into<Arg>) -> Self {
    self.0.push(arg.into());
    self
  }

  /// Appends a plain value argument, builder style.
  pub fn with_value<T: Any + Send + Sync>(self, value: T) -> Self {
    self.with(Arg::value(value))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&Arg> {
    self.0.get(index)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
    self.0.iter()
  }

  /// The resolver handle at `index`.
  pub fn resolver(&self, index: usize) -> Result<Resolver> {
    match self.0.get(index) {
      Some(Arg::Resolver(resolver)) => Ok(resolver.clone()),
      _ => Err(Error::InvalidArgument(format!(
        "argument {} is not the resolver",
        index
      ))),
    }
  }

  /// The value at `index`, downcast to `T`.
  pub fn value<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
    let mismatch = || {
      Error::InvalidArgument(format!(
        "argument {} is not a {}",
        index,
        type_name::<T>()
      ))
    };
    match self.0.get(index) {
      Some(Arg::Value(value)) => Arc::clone(value).downcast::<T>().map_err(|_| mismatch()),
      _ => Err(mismatch()),
    }
  }
}

impl From<Vec<Arg>> for Args {
  fn from(args: Vec<Arg>) -> Self {
    Self(args)
  }
}

impl FromIterator<Arg> for Args {
  fn from_iter<It: IntoIterator<Item = Arg>>(iter: It) -> Self {
    Self(iter.into_iter().collect())
  }
}
