//! Declarative request validation.
//!
//! Endpoints declare per-field [`Rule`]s; the runner evaluates all of them
//! and [`classify`] turns the violations into a single domain error. Handlers
//! opt in by taking a [`Validated<E>`] argument.

pub mod classify;
pub mod custom;
pub mod endpoints;
pub mod extract;
pub mod rules;
pub mod runner;

pub use classify::{FORBIDDEN_MESSAGE, classify};
pub use custom::{FieldValidator, Outcome};
pub use endpoints::{
    ChangePassword, CreateListing, Endpoint, ListingById, Login, Register, RuleBook, UpdateListing,
    UpdateUser,
};
pub use extract::Validated;
pub use rules::{Check, Constraint, DEFAULT_MESSAGE, Location, Rule, RuleSet};
pub use runner::{RequestSnapshot, Violation, ViolationKind};
