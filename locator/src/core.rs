//! Core, non-public helpers shared by the resolver.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
  // Contracts currently being constructed on this thread. Re-entering one of
  // them means a constructor or factory depends on itself.
  static RESOLVING_STACK: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

/// An RAII guard to detect circular dependencies.
///
/// When created, it adds the contract to the thread-local resolution stack,
/// failing if it is already present. Dropping the guard removes it again.
pub(crate) struct ResolutionGuard {
  contract: String,
}

impl ResolutionGuard {
  pub(crate) fn enter(contract: &str) -> Result<Self> {
    // `insert` returns `false` if the value was already present.
    let fresh = RESOLVING_STACK.with(|stack| stack.borrow_mut().insert(contract.to_owned()));
    if !fresh {
      tracing::warn!(contract, "circular dependency detected");
      return Err(Error::CircularDependency {
        contract: contract.to_owned(),
      });
    }
    Ok(Self {
      contract: contract.to_owned(),
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      stack.borrow_mut().remove(&self.contract);
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reentry_is_rejected_until_the_guard_drops() {
    let guard = ResolutionGuard::enter("Cycle").unwrap();
    assert!(matches!(
      ResolutionGuard::enter("Cycle"),
      Err(Error::CircularDependency { .. })
    ));

    drop(guard);
    assert!(ResolutionGuard::enter("Cycle").is_ok());
  }
}
