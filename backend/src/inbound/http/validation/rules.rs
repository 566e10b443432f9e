//! Declarative field rules.
//!
//! A [`Rule`] names one field of the request, where to find it and the
//! ordered checks it must pass. Rules are assembled into a [`RuleSet`] once at
//! startup and never mutated afterwards.

use std::borrow::Cow;
use std::sync::Arc;

use email_address::EmailAddress;
use serde_json::Value;

use super::custom::FieldValidator;

/// Message reported by checks declared without one.
pub const DEFAULT_MESSAGE: &str = "Invalid value";

/// Where a field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Top-level member of the JSON body.
    Body,
    /// Path parameter captured by the route.
    Param,
}

/// Synchronous constraint on a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// The coerced text is not empty.
    NotEmpty,
    /// The coerced text is an email address.
    Email,
    /// The coerced text has at least this many characters.
    MinLength(usize),
    /// The raw value is a JSON array.
    Array,
}

/// Render a JSON value as the text string constraints inspect.
///
/// Missing and `null` values become the empty string.
pub fn coerce(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(text)) => Cow::Borrowed(text.as_str()),
        Some(Value::Array(items)) => Cow::Owned(
            items
                .iter()
                .map(|item| coerce(Some(item)).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

impl Constraint {
    /// Whether `value` satisfies the constraint.
    pub fn holds(self, value: Option<&Value>) -> bool {
        match self {
            Self::NotEmpty => !coerce(value).is_empty(),
            Self::Email => {
                EmailAddress::parse_with_options(&coerce(value), Default::default()).is_ok()
            }
            Self::MinLength(min) => coerce(value).chars().count() >= min,
            Self::Array => matches!(value, Some(Value::Array(_))),
        }
    }
}

/// One step of a rule's chain.
#[derive(Clone)]
pub enum Check {
    /// Built-in constraint with its failure message.
    Constraint {
        constraint: Constraint,
        message: Option<String>,
    },
    /// Asynchronous validator consulting the stores.
    Custom(Arc<dyn FieldValidator>),
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constraint {
                constraint,
                message,
            } => f
                .debug_struct("Constraint")
                .field("constraint", constraint)
                .field("message", message)
                .finish(),
            Self::Custom(validator) => f.debug_tuple("Custom").field(&validator.name()).finish(),
        }
    }
}

/// Checks applied to one field.
///
/// # Examples
/// ```
/// use listings_backend::inbound::http::validation::{Location, Rule};
///
/// let rule = Rule::body("password")
///     .not_empty()
///     .with_message("password is required")
///     .min_length(8)
///     .with_message("password must be at least 8 characters long");
/// assert_eq!(rule.field(), "password");
/// assert_eq!(rule.location(), Location::Body);
/// assert_eq!(rule.checks().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Rule {
    field: &'static str,
    location: Location,
    checks: Vec<Check>,
}

impl Rule {
    /// Rule on a body member.
    #[must_use]
    pub fn body(field: &'static str) -> Self {
        Self::at(field, Location::Body)
    }

    /// Rule on a path parameter.
    #[must_use]
    pub fn param(field: &'static str) -> Self {
        Self::at(field, Location::Param)
    }

    fn at(field: &'static str, location: Location) -> Self {
        Self {
            field,
            location,
            checks: Vec::new(),
        }
    }

    fn constraint(mut self, constraint: Constraint) -> Self {
        self.checks.push(Check::Constraint {
            constraint,
            message: None,
        });
        self
    }

    /// Require a non-empty value.
    #[must_use]
    pub fn not_empty(self) -> Self {
        self.constraint(Constraint::NotEmpty)
    }

    /// Require an email address.
    #[must_use]
    pub fn is_email(self) -> Self {
        self.constraint(Constraint::Email)
    }

    /// Require at least `min` characters.
    #[must_use]
    pub fn min_length(self, min: usize) -> Self {
        self.constraint(Constraint::MinLength(min))
    }

    /// Require a JSON array.
    #[must_use]
    pub fn array(self) -> Self {
        self.constraint(Constraint::Array)
    }

    /// Append an asynchronous validator.
    #[must_use]
    pub fn custom(mut self, validator: impl FieldValidator + 'static) -> Self {
        self.checks.push(Check::Custom(Arc::new(validator)));
        self
    }

    /// Set the message of the most recent built-in constraint.
    ///
    /// Custom validators report their own messages, so this has no effect
    /// directly after [`Rule::custom`].
    #[must_use]
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        if let Some(Check::Constraint { message, .. }) = self.checks.last_mut() {
            *message = Some(text.into());
        }
        self
    }

    /// Field name.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Field location.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Checks in evaluation order.
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }
}

/// Ordered rules for one endpoint.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Wrap `rules`, keeping their order.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// This set's rules followed by `other`'s.
    #[must_use]
    pub fn then(mut self, other: &RuleSet) -> Self {
        self.rules.extend(other.rules.iter().cloned());
        self
    }

    /// Rules in declared order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
