use fibre_locator::{resolve, ImplementationDescriptor, Instance};
use fibre_locator::{RegistrationTable, Resolver, StaticTypeCatalog};
use std::sync::Arc;

// 1. Define the abstraction (the contract)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

// The registration document, normally read from `registration.json`.
const REGISTRATION: &str = r#"{
  "Registration": [
    { "Interface": "Logger", "Class": "demo::ConsoleLogger" },
    { "Interface": "ReportService", "Class": "demo::ReportService" }
  ]
}"#;

fn main() -> fibre_locator::Result<()> {
  // --- What this process can build ---
  let types = StaticTypeCatalog::new()
    .with_contract("Logger")
    .with_contract("ReportService")
    .with_implementation(
      ImplementationDescriptor::builder("demo::ConsoleLogger")
        .default_constructor(|| Ok(Instance::new::<dyn Logger>(Arc::new(ConsoleLogger))))
        .build(),
    )
    .with_implementation(
      // Only a resolver constructor: the resolver passes itself in.
      ImplementationDescriptor::builder("demo::ReportService")
        .resolver_constructor(|resolver| {
          Ok(Instance::new(Arc::new(ReportService {
            logger: resolve!(resolver, trait Logger)?,
          })))
        })
        .build(),
    );

  let resolver = Resolver::new(RegistrationTable::from_json_str(REGISTRATION)?, types);

  // --- Resolution and usage ---
  println!("Resolving the high-level service...");
  let report_service = resolve!(resolver, ReportService, "ReportService")?;

  println!("Using the service...");
  report_service.generate_report();

  for line in resolver.view_cache() {
    println!("{}", line);
  }
  Ok(())
}
