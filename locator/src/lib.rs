//! # Fibre Locator
//!
//! A registration-driven, thread-safe service locator for Rust.
//!
//! Callers ask for a *contract* by name and get back an instance of whatever
//! implementation the registration table binds it to. Bindings are data, not
//! code, so swapping an implementation is a registration change.
//!
//! ## Core Concepts
//!
//! - **Registration table**: maps each contract to an implementation name, a
//!   singleton policy (`Multiple`) and an optional factory (`Factory` +
//!   `FactoryMethod`). Usually loaded from `registration.json`.
//! - **Type catalog**: the implementations the process knows how to build,
//!   registered explicitly with their constructors and factory methods.
//! - **Resolver**: resolves contracts in four modes: cached (`resolve`),
//!   forced-new (`resolve_new`), uncached (`resolve_without_caching`) and
//!   every cached instance (`resolve_all`).
//! - **Modules**: pluggable handlers that can supply the instance instead of
//!   the default constructor path. A built-in factory module is registered by
//!   default.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_locator::{Binding, ImplementationDescriptor, Instance};
//! use fibre_locator::{RegistrationTable, Resolver, StaticTypeCatalog};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct EnglishGreeter;
//!
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         "Hello, World!".to_string()
//!     }
//! }
//!
//! fn main() -> fibre_locator::Result<()> {
//!     // What the process can build.
//!     let types = StaticTypeCatalog::new()
//!         .with_contract("Greeter")
//!         .with_implementation(
//!             ImplementationDescriptor::builder("app::EnglishGreeter")
//!                 .default_constructor(|| Ok(Instance::new::<dyn Greeter>(Arc::new(EnglishGreeter))))
//!                 .build(),
//!         );
//!
//!     // Which implementation each contract uses.
//!     let bindings = RegistrationTable::from_json_str(
//!         r#"{ "Registration": [ { "Interface": "Greeter", "Class": "app::EnglishGreeter" } ] }"#,
//!     )?;
//!
//!     let resolver = Resolver::new(bindings, types);
//!     let greeter = resolver.resolve_as::<dyn Greeter>("Greeter")?;
//!     assert_eq!(greeter.greet(), "Hello, World!");
//!
//!     // Cached: the same instance comes back.
//!     assert!(Arc::ptr_eq(&greeter, &resolver.resolve_as::<dyn Greeter>("Greeter")?));
//!     Ok(())
//! }
//! ```

mod cache;
mod catalog;
mod config;
mod core;
mod error;
mod instance;
mod macros;
mod mapper;
mod module;
mod registration;
mod resolver;

pub use cache::{InstanceRecord, ObjectCache};
pub use catalog::{
  Constructor, ContractDescriptor, FactoryMethod, ImplementationBuilder, ImplementationDescriptor,
  Param, StaticTypeCatalog, TypeCatalog,
};
pub use config::ResolverConfig;
pub use error::{Error, Result};
pub use instance::{Arg, Args, Dispose, Instance};
pub use module::{FactoryModule, ModuleFilter, ModuleLogic, ModulePipeline, ModuleRun, ResolverModule};
pub use registration::{Assemblies, Binding, BindingCatalog, RegistrationFile, RegistrationTable};
pub use resolver::{Instances, Request, Resolver, ResolverBuilder};
