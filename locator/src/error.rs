use thiserror::Error;

/// The main error type for the `fibre_locator` library.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Registration for \"{contract}\" is not set up correctly: {reason}")]
  RegistrationInvalid { contract: String, reason: String },

  #[error("\"{contract}\" is not a known contract")]
  ContractNotFound { contract: String },

  #[error("Failed to map contract \"{contract}\" to its implementation \"{implementation}\"")]
  ImplementationNotFound {
    contract: String,
    implementation: String,
  },

  #[error("Contract \"{contract}\" uses factory \"{factory}\" but it could not be mapped: {reason}")]
  FactoryNotFound {
    contract: String,
    factory: String,
    reason: String,
  },

  #[error(
    "Factory method \"{method}\" on \"{factory}\" (for \"{contract}\") takes {arity} parameter(s); only () or (Resolver) are supported"
  )]
  UnsupportedFactorySignature {
    contract: String,
    factory: String,
    method: String,
    arity: usize,
  },

  #[error("{modules} module(s) ran for \"{contract}\" but none produced an instance")]
  ModuleChainExhausted { contract: String, modules: usize },

  #[error(
    "\"{contract}\" mapped to \"{implementation}\" does not allow multiple instances and one is already cached"
  )]
  MultiplicityViolation {
    contract: String,
    implementation: String,
  },

  #[error("Resolving \"{contract}\" cannot take both constructor arguments and a module override")]
  AmbiguousResolutionRequest { contract: String },

  #[error(
    "\"{contract}\" mapped to \"{implementation}\" has no constructor accepting the {supplied} supplied argument(s)"
  )]
  MissingConstructorArguments {
    contract: String,
    implementation: String,
    supplied: usize,
  },

  #[error("No cached instances of \"{contract}\" were found")]
  NoInstancesFound { contract: String },

  #[error("Invalid instance record: {0}")]
  InvalidRecord(String),

  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("Circular dependency detected while resolving \"{contract}\"")]
  CircularDependency { contract: String },

  #[error("Instance resolved for \"{contract}\" is not a {expected}")]
  TypeMismatch {
    contract: String,
    expected: &'static str,
  },

  #[error("Constructing \"{implementation}\" failed: {reason}")]
  Construction {
    implementation: String,
    reason: String,
  },

  #[error("Resolver build failed: {0}")]
  Build(String),

  #[error("Failed to read file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),

  #[error("Failed to parse registration document: {0}")]
  RegistrationParse(String),
}

impl Error {
  /// Shorthand for constructor and factory method bodies reporting their own failures.
  pub fn construction(implementation: impl Into<String>, reason: impl ToString) -> Self {
    Error::Construction {
      implementation: implementation.into(),
      reason: reason.to_string(),
    }
  }
}

/// A specialized `Result` type for `fibre_locator` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
