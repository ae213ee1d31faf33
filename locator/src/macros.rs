//! Public macros for ergonomic typed resolution.

/// Resolves a contract from a resolver and downcasts it.
///
/// The `trait` arms use the trait's own name as the contract identifier,
/// which matches registration tables keyed by interface name. Expands to a
/// `Result<Arc<_>>`.
///
/// # Examples
///
/// ```
/// use fibre_locator::{resolve, Binding, ImplementationDescriptor, Instance};
/// use fibre_locator::{RegistrationTable, Resolver, StaticTypeCatalog};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// let types = StaticTypeCatalog::new()
///   .with_contract("Greeter")
///   .with_implementation(
///     ImplementationDescriptor::builder("EnglishGreeter")
///       .default_constructor(|| Ok(Instance::new::<dyn Greeter>(Arc::new(EnglishGreeter))))
///       .build(),
///   );
/// let bindings = RegistrationTable::new().with_binding(Binding::new("Greeter", "EnglishGreeter"));
/// let resolver = Resolver::new(bindings, types);
///
/// let greeter = resolve!(resolver, trait Greeter).unwrap();
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! resolve {
    // Contract named after the trait: resolve!(resolver, trait Greeter)
    ($resolver:expr, trait $trait_ident:ident) => {
        $resolver.resolve_as::<dyn $trait_ident>(stringify!($trait_ident))
    };

    // Explicit contract: resolve!(resolver, trait Greeter, "PoliteGreeter")
    ($resolver:expr, trait $trait_ident:ident, $contract:expr) => {
        $resolver.resolve_as::<dyn $trait_ident>($contract)
    };

    // Concrete view type: resolve!(resolver, Settings, "Settings")
    ($resolver:expr, $type:ty, $contract:expr) => {
        $resolver.resolve_as::<$type>($contract)
    };
}

/// Like [`resolve!`], but always creates (and caches) a new instance.
#[macro_export]
macro_rules! resolve_new {
    ($resolver:expr, trait $trait_ident:ident) => {
        $resolver.resolve_new_as::<dyn $trait_ident>(stringify!($trait_ident))
    };

    ($resolver:expr, trait $trait_ident:ident, $contract:expr) => {
        $resolver.resolve_new_as::<dyn $trait_ident>($contract)
    };

    ($resolver:expr, $type:ty, $contract:expr) => {
        $resolver.resolve_new_as::<$type>($contract)
    };
}
