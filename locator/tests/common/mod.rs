#![allow(dead_code)]

use fibre_locator::{
  Binding, Dispose, Error, ImplementationDescriptor, Instance, Param, RegistrationTable, Resolver,
  StaticTypeCatalog,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// --- Contracts ---

pub trait Greeter: Send + Sync {
  fn greet(&self) -> String;
}

pub trait Report: Send + Sync {
  fn line(&self) -> String;
}

pub trait Widget: Send + Sync {
  fn origin(&self) -> String;
}

// --- Implementations ---

pub struct EnglishGreeter;
impl Greeter for EnglishGreeter {
  fn greet(&self) -> String {
    "Hello!".to_string()
  }
}

/// Only constructible with the resolver.
pub struct ReportService {
  greeting: String,
}
impl Report for ReportService {
  fn line(&self) -> String {
    format!("report: {}", self.greeting)
  }
}

/// Numbered per construction; registered with `Multiple`.
pub struct Ticket {
  pub number: usize,
}

#[derive(Default)]
pub struct Connection {
  pub disposed: AtomicUsize,
}
impl Dispose for Connection {
  fn dispose(&self) {
    self.disposed.fetch_add(1, Ordering::SeqCst);
  }
}

/// Requires explicit constructor arguments.
pub struct Label {
  pub text: String,
  pub width: u32,
}

pub struct Gear {
  origin: String,
}
impl Widget for Gear {
  fn origin(&self) -> String {
    self.origin.clone()
  }
}

#[derive(Default)]
pub struct GearWorks {
  pub made: AtomicUsize,
}

impl GearWorks {
  fn make(&self, origin: &str) -> Result<Instance, Error> {
    let n = self.made.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(Instance::new::<dyn Widget>(Arc::new(Gear {
      origin: format!("{} #{}", origin, n),
    })))
  }
}

fn works(factory: &Instance) -> Result<Arc<GearWorks>, Error> {
  factory
    .downcast::<GearWorks>()
    .ok_or_else(|| Error::construction("tests::GearWorks", "factory is not GearWorks"))
}

pub fn catalog() -> StaticTypeCatalog {
  let ticket_numbers = Arc::new(AtomicUsize::new(0));

  StaticTypeCatalog::new()
    .with_contract("Greeter")
    .with_contract("Report")
    .with_contract("Ticket")
    .with_contract("Connection")
    .with_contract("Session")
    .with_contract("Label")
    .with_contract("Widget")
    .with_contract("ResolvedWidget")
    .with_contract("BrokenWidget")
    .with_contract("MissingMethodWidget")
    .with_contract("OrphanWidget")
    .with_contract("WidgetFactory")
    .with_contract("Unbound")
    .with_contract("Unimplemented")
    .with_implementation(
      ImplementationDescriptor::builder("tests::EnglishGreeter")
        .default_constructor(|| Ok(Instance::new::<dyn Greeter>(Arc::new(EnglishGreeter))))
        .build(),
    )
    .with_implementation(
      ImplementationDescriptor::builder("tests::ReportService")
        .resolver_constructor(|resolver| {
          let greeter = resolver.resolve_as::<dyn Greeter>("Greeter")?;
          Ok(Instance::new::<dyn Report>(Arc::new(ReportService {
            greeting: greeter.greet(),
          })))
        })
        .build(),
    )
    .with_implementation(
      ImplementationDescriptor::builder("tests::Ticket")
        .default_constructor(move || {
          let number = ticket_numbers.fetch_add(1, Ordering::SeqCst) + 1;
          Ok(Instance::new(Arc::new(Ticket { number })))
        })
        .build(),
    )
    .with_implementation(
      ImplementationDescriptor::builder("tests::Connection")
        .default_constructor(|| Ok(Instance::disposable(Arc::new(Connection::default()))))
        .build(),
    )
    .with_implementation(
      ImplementationDescriptor::builder("tests::Label")
        .constructor(vec![Param::value::<String>()], |args| {
          Ok(Instance::new(Arc::new(Label {
            text: (*args.value::<String>(0)?).clone(),
            width: 0,
          })))
        })
        .constructor(
          vec![Param::value::<String>(), Param::value::<u32>()],
          |args| {
            Ok(Instance::new(Arc::new(Label {
              text: (*args.value::<String>(0)?).clone(),
              width: *args.value::<u32>(1)?,
            })))
          },
        )
        .build(),
    )
    .with_implementation(
      ImplementationDescriptor::builder("tests::Gear")
        .constructor(
          vec![Param::value::<String>(), Param::value::<u32>()],
          |args| {
            Ok(Instance::new::<dyn Widget>(Arc::new(Gear {
              origin: format!("{}:{}", args.value::<String>(0)?, args.value::<u32>(1)?),
            })))
          },
        )
        .build(),
    )
    .with_implementation(
      ImplementationDescriptor::builder("tests::GearWorks")
        .default_constructor(|| Ok(Instance::new(Arc::new(GearWorks::default()))))
        .method("Make", vec![], |factory, _| works(factory)?.make("factory"))
        .method("MakeWith", vec![Param::Resolver], |factory, args| {
          let greeting = args
            .resolver(0)?
            .resolve_as::<dyn Greeter>("Greeter")?
            .greet();
          works(factory)?.make(&greeting)
        })
        .method(
          "Broken",
          vec![Param::value::<String>(), Param::value::<u32>()],
          |factory, _| works(factory)?.make("broken"),
        )
        .build(),
    )
}

pub fn bindings() -> RegistrationTable {
  RegistrationTable::new()
    .with_binding(Binding::new("Greeter", "tests::EnglishGreeter"))
    .with_binding(Binding::new("Report", "tests::ReportService"))
    .with_binding(Binding::new("Ticket", "tests::Ticket").multiple())
    .with_binding(Binding::new("Connection", "tests::Connection").multiple())
    .with_binding(Binding::new("Session", "tests::Connection"))
    .with_binding(Binding::new("Label", "tests::Label"))
    .with_binding(Binding::new("Widget", "tests::Gear").with_factory("WidgetFactory", "Make"))
    .with_binding(
      Binding::new("ResolvedWidget", "tests::Gear").with_factory("WidgetFactory", "MakeWith"),
    )
    .with_binding(
      Binding::new("BrokenWidget", "tests::Gear").with_factory("WidgetFactory", "Broken"),
    )
    .with_binding(
      Binding::new("MissingMethodWidget", "tests::Gear").with_factory("WidgetFactory", "Nope"),
    )
    .with_binding(Binding::new("OrphanWidget", "tests::Gear").with_factory("Ghost", "Make"))
    .with_binding(Binding::new("Ghost", "tests::GhostWorks"))
    .with_binding(Binding::new("WidgetFactory", "tests::GearWorks"))
    .with_binding(Binding::new("Unimplemented", "tests::Nowhere"))
}

pub fn resolver() -> Resolver {
  Resolver::new(bindings(), catalog())
}
