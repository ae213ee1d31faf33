//! Tests for the `resolve!` and `resolve_new!` macros.

mod common;

use common::{Greeter, Report, Ticket};
use fibre_locator::{resolve, resolve_new, Error, Instance};
use std::sync::Arc;

#[test]
fn test_resolve_names_the_contract_after_the_trait() {
  let resolver = common::resolver();

  let greeter = resolve!(resolver, trait Greeter).unwrap();

  assert_eq!(greeter.greet(), "Hello!");
  assert!(Arc::ptr_eq(
    &greeter,
    &resolver.resolve_as::<dyn Greeter>("Greeter").unwrap()
  ));
}

#[test]
fn test_resolve_with_an_explicit_contract() {
  let resolver = common::resolver();

  let report = resolve!(resolver, trait Report, "Report").unwrap();

  assert_eq!(report.line(), "report: Hello!");
}

#[test]
fn test_resolve_a_concrete_type() {
  let resolver = common::resolver();

  let ticket = resolve!(resolver, Ticket, "Ticket").unwrap();
  let again = resolve!(&resolver, Ticket, "Ticket").unwrap();

  assert!(Arc::ptr_eq(&ticket, &again));
}

#[test]
fn test_resolve_new_creates_fresh_multiples() {
  let resolver = common::resolver();

  let first = resolve!(resolver, Ticket, "Ticket").unwrap();
  let second = resolve_new!(resolver, Ticket, "Ticket").unwrap();

  assert_eq!((first.number, second.number), (1, 2));
  assert_eq!(resolver.resolve_all("Ticket").unwrap().len(), 2);
}

#[test]
fn test_resolve_new_reports_multiplicity_violations() {
  let resolver = common::resolver();
  resolve!(resolver, trait Greeter).unwrap();

  let result = resolve_new!(resolver, trait Greeter);

  assert!(matches!(result, Err(Error::MultiplicityViolation { .. })));
}

#[test]
fn test_macro_errors_pass_through() {
  let resolver = common::resolver();

  assert!(matches!(
    resolve!(resolver, trait Greeter, "Unbound"),
    Err(Error::RegistrationInvalid { .. })
  ));
  assert!(matches!(
    resolve!(resolver, Instance, "Greeter"),
    Err(Error::TypeMismatch { .. })
  ));
}
