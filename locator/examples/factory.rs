use fibre_locator::{
  Binding, ImplementationDescriptor, Instance, ModuleRun, RegistrationTable, Resolver,
  ResolverModule, StaticTypeCatalog,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Connection: Send + Sync {
  fn describe(&self) -> String;
}

struct PooledConnection {
  slot: usize,
}
impl Connection for PooledConnection {
  fn describe(&self) -> String {
    format!("pooled connection #{}", self.slot)
  }
}

struct StubConnection;
impl Connection for StubConnection {
  fn describe(&self) -> String {
    "stub connection".to_string()
  }
}

/// Hands out connections; resolved (and cached) as its own contract.
#[derive(Default)]
struct ConnectionPool {
  handed_out: AtomicUsize,
}

/// Swaps in a stub for every contract it is asked about.
struct StubModule;
impl ResolverModule for StubModule {
  fn name(&self) -> &str {
    "StubModule"
  }

  fn execute(
    &self,
    _contract: &str,
    _resolver: &Resolver,
    _existing: Option<Instance>,
  ) -> fibre_locator::Result<Option<Instance>> {
    Ok(Some(Instance::new::<dyn Connection>(Arc::new(StubConnection))))
  }
}

fn main() -> fibre_locator::Result<()> {
  let types = StaticTypeCatalog::new()
    .with_contract("Connection")
    .with_contract("ConnectionPool")
    .with_implementation(ImplementationDescriptor::builder("demo::PooledConnection").build())
    .with_implementation(
      ImplementationDescriptor::builder("demo::ConnectionPool")
        .default_constructor(|| Ok(Instance::new(Arc::new(ConnectionPool::default()))))
        .method("Open", vec![], |pool, _| {
          let pool = pool.downcast::<ConnectionPool>().ok_or_else(|| {
            fibre_locator::Error::construction("demo::ConnectionPool", "not a pool")
          })?;
          let slot = pool.handed_out.fetch_add(1, Ordering::SeqCst) + 1;
          Ok(Instance::new::<dyn Connection>(Arc::new(PooledConnection { slot })))
        })
        .build(),
    );
  let bindings = RegistrationTable::new()
    .with_binding(
      Binding::new("Connection", "demo::PooledConnection")
        .multiple()
        .with_factory("ConnectionPool", "Open"),
    )
    .with_binding(Binding::new("ConnectionPool", "demo::ConnectionPool"));

  let resolver = Resolver::new(bindings, types);

  // Every forced-new resolve goes through the pool's `Open` method.
  for _ in 0..3 {
    let connection = resolver.resolve_new_as::<dyn Connection>("Connection")?;
    println!("opened {}", connection.describe());
  }

  // A module run lets registered modules decide instead.
  let stub: Arc<dyn ResolverModule> = Arc::new(StubModule);
  resolver.register_module(stub.clone());
  let overridden = resolver.resolve_without_caching_with("Connection", ModuleRun::new())?;
  if let Some(connection) = overridden.downcast::<dyn Connection>() {
    println!("module supplied a {}", connection.describe());
  }
  resolver.remove_module(&stub);

  println!("cached:");
  for line in resolver.view_cache() {
    println!("  {}", line);
  }
  resolver.clear_cache();
  Ok(())
}
